//! Mock speech providers for testing.
//!
//! This crate provides fake implementations of the `SpeechSynthesizer` trait:
//! - `ScriptedSpeech` - Returns each request's text as bytes and records calls
//! - `FailingSpeech` - Fails every call with a fixed error
//! - `DelayedSpeech` - Wraps another provider with artificial delay
//!
//! For production synthesis, use the `elevenlabs-speech` crate instead.
//!
//! # Example
//!
//! ```rust
//! use mock_speech::{generate_speech, ScriptedSpeech, VoiceSettings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_speech::SpeechError> {
//!     let speech = ScriptedSpeech::new().with_max_chars(20);
//!
//!     let audio = generate_speech(&speech, "voice", "Hola. Adiós.", &VoiceSettings::default()).await?;
//!     assert_eq!(audio, b"<Hola. Adi\xc3\xb3s.>");
//!     Ok(())
//! }
//! ```

mod delayed;
mod failing;
mod scripted;

// Re-export speech-core types for convenience
pub use speech_core::{
    async_trait, generate_speech, CreditBalance, SpeechError, SpeechSynthesizer, Voice,
    VoiceSettings,
};

pub use delayed::DelayedSpeech;
pub use failing::FailingSpeech;
pub use scripted::ScriptedSpeech;

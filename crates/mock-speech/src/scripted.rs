//! Scripted provider - wraps each request's text in angle brackets.

use std::sync::Mutex;

use async_trait::async_trait;
use speech_core::{CreditBalance, SpeechError, SpeechSynthesizer, Voice, VoiceSettings};

/// A provider whose audio is the request text wrapped as `<text>`.
///
/// Concatenated output therefore shows exactly which chunks were sent and in
/// which order. Calls are recorded for inspection.
#[derive(Debug)]
pub struct ScriptedSpeech {
    max_chars: usize,
    credits: CreditBalance,
    voices: Vec<Voice>,
    /// Fail the n-th synthesis call (1-based) with this error.
    fail_on_call: Option<(usize, SpeechError)>,
    calls: Mutex<Vec<String>>,
}

impl Default for ScriptedSpeech {
    fn default() -> Self {
        Self {
            max_chars: 4500,
            credits: CreditBalance::unlimited(),
            voices: default_voices(),
            fail_on_call: None,
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedSpeech {
    /// Create a provider with a 4500 character limit and unlimited credits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-request character limit.
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }

    /// Report this many remaining credits out of `total`.
    pub fn with_credits(mut self, remaining: i64, total: i64) -> Self {
        self.credits = CreditBalance {
            remaining,
            total,
            reset_date: Some("2026-12-01T00:00:00Z".to_string()),
        };
        self
    }

    /// Fail the n-th synthesis call (1-based) with `error`.
    pub fn failing_on_call(mut self, call: usize, error: SpeechError) -> Self {
        self.fail_on_call = Some((call, error));
        self
    }

    /// Texts sent to `synthesize`, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or_default()
    }
}

#[async_trait]
impl SpeechSynthesizer for ScriptedSpeech {
    async fn synthesize(
        &self,
        _voice_id: &str,
        text: &str,
        _settings: &VoiceSettings,
    ) -> Result<Vec<u8>, SpeechError> {
        let call_number = {
            let mut calls = self
                .calls
                .lock()
                .map_err(|_| SpeechError::Unavailable("call log poisoned".to_string()))?;
            calls.push(text.to_string());
            calls.len()
        };

        if let Some((fail_on, error)) = &self.fail_on_call {
            if *fail_on == call_number {
                return Err(error.clone());
            }
        }

        Ok(format!("<{}>", text).into_bytes())
    }

    async fn list_voices(&self) -> Result<Vec<Voice>, SpeechError> {
        Ok(self.voices.clone())
    }

    async fn remaining_credits(&self) -> Result<CreditBalance, SpeechError> {
        Ok(self.credits.clone())
    }

    fn max_chars_per_request(&self) -> usize {
        self.max_chars
    }

    fn name(&self) -> &str {
        "ScriptedSpeech"
    }
}

fn default_voices() -> Vec<Voice> {
    vec![
        Voice {
            voice_id: "es-lucia".to_string(),
            name: "Lucía".to_string(),
            category: Some("premade".to_string()),
            language: Some("es".to_string()),
            accent: Some("castilian".to_string()),
            preview_url: None,
        },
        Voice {
            voice_id: "es-mateo".to_string(),
            name: "Mateo".to_string(),
            category: Some("premade".to_string()),
            language: None,
            accent: Some("mexican".to_string()),
            preview_url: None,
        },
        Voice {
            voice_id: "en-rachel".to_string(),
            name: "Rachel".to_string(),
            category: Some("premade".to_string()),
            language: Some("en".to_string()),
            accent: Some("american".to_string()),
            preview_url: None,
        },
    ]
}

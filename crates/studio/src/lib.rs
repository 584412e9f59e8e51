//! Domain services for ComfyClaude Studio.
//!
//! This crate sits between the HTTP layer and the database and speech
//! provider crates. A [`StudioContext`] carries the shared dependencies and
//! hands out short-lived services:
//!
//! - [`LearningService`] - topic-matched learning modules and unit progress
//! - [`EpisodeManager`] - podcast episode lifecycle, generation and downloads
//! - [`TrendService`] - trend ingestion with freshness heat scores
//! - [`ScreenshotInbox`] - at-most-once screenshot handoff
//!
//! # Architecture
//!
//! ```text
//! generate request
//!          ↓
//! ┌──────────────────────────────────────────────────────────┐
//! │                    EPISODE MANAGER                       │
//! │                                                          │
//! │  1. Claim episode: DRAFT/FAILED/READY → GENERATING       │
//! │         ↓                                                │
//! │  2. Clean script, resolve voice and settings             │
//! │         ↓                                                │
//! │  3. Credit pre-check against the provider balance        │
//! │         ↓                                                │
//! │  4. Chunked synthesis (speech-core)                      │
//! │         ↓                                                │
//! │  5. Atomic file write (AudioStore)                       │
//! │         ↓                                                │
//! │  6. GENERATING → READY, or FAILED on any error           │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use studio::{AudioStore, StudioContext, StudioSettings};
//!
//! let ctx = StudioContext::new(
//!     db,
//!     Arc::new(elevenlabs_speech::ElevenLabsSpeech::from_env()?),
//!     AudioStore::new("public/audio/podcasts", "/audio/podcasts"),
//!     StudioSettings::default(),
//! );
//!
//! let episode = ctx.episodes().generate(&episode_id).await?;
//! ```

pub mod context;
pub mod credits;
pub mod episodes;
pub mod error;
pub mod filename;
pub mod learning;
pub mod principal;
pub mod screenshots;
pub mod storage;
pub mod tagging;
pub mod topic;
pub mod trends;

pub use context::{StudioContext, StudioSettings, DEFAULT_SHOW_NAME};
pub use credits::{estimate, quota_status, remaining_credits, CreditEstimate, QuotaStatus};
pub use episodes::{EpisodeDownload, EpisodeManager, PreviewRequest};
pub use error::{ErrorKind, Result, StudioError};
pub use filename::episode_filename;
pub use learning::{LearningService, ManualModule, StartModule, StartedModule};
pub use principal::Principal;
pub use screenshots::{NewScreenshot, ScreenshotInbox};
pub use storage::AudioStore;
pub use tagging::{tag_audio, EpisodeTags};
pub use trends::{FreshnessWindow, IngestReport, TrendItem, TrendService};

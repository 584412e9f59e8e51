//! Error types for speech synthesis.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while talking to a speech provider.
///
/// Callers branch on the variant: rate limits are worth waiting out, quota
/// exhaustion lasts until the billing period resets, and unavailability may be
/// retried once with backoff. Providers never retry on their own.
#[derive(Debug, Clone, Error)]
pub enum SpeechError {
    /// The provider is throttling requests.
    #[error("rate limited by speech provider")]
    RateLimited {
        /// Hint from the provider on how long to wait.
        retry_after: Option<Duration>,
    },

    /// Credits or subscription exhausted for the current period.
    #[error("speech provider quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Network failure or a 5xx from the provider.
    #[error("speech provider unavailable: {0}")]
    Unavailable(String),

    /// The provider refused the request for any other reason.
    #[error("speech provider rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The request was invalid before it left the process.
    #[error("invalid speech request: {0}")]
    InvalidInput(String),

    /// The provider is misconfigured (missing key, bad URL).
    #[error("speech provider configuration error: {0}")]
    Configuration(String),
}

/// Coarse classification of a [`SpeechError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeechErrorKind {
    RateLimited,
    QuotaExceeded,
    Unavailable,
    Rejected,
    InvalidInput,
    Configuration,
}

impl SpeechError {
    pub fn kind(&self) -> SpeechErrorKind {
        match self {
            SpeechError::RateLimited { .. } => SpeechErrorKind::RateLimited,
            SpeechError::QuotaExceeded(_) => SpeechErrorKind::QuotaExceeded,
            SpeechError::Unavailable(_) => SpeechErrorKind::Unavailable,
            SpeechError::Rejected { .. } => SpeechErrorKind::Rejected,
            SpeechError::InvalidInput(_) => SpeechErrorKind::InvalidInput,
            SpeechError::Configuration(_) => SpeechErrorKind::Configuration,
        }
    }

    /// Provider-supplied wait hint, only present for rate limits.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            SpeechError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Whether a single retry with backoff is reasonable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind(),
            SpeechErrorKind::RateLimited | SpeechErrorKind::Unavailable
        )
    }
}

//! Error types for studio operations.
//!
//! Every externally facing operation returns a [`StudioError`], so callers see
//! one of a fixed set of kinds instead of raw database or provider errors.

use std::time::Duration;

use database::{DatabaseError, ValidationError};
use speech_core::SpeechError;
use thiserror::Error;

/// Errors that can occur in studio operations.
#[derive(Debug, Error)]
pub enum StudioError {
    /// The module, unit, episode or trend does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A required field is missing or malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The record exists but its state forbids the operation.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The speech provider is throttling; wait and retry.
    #[error("rate limited by upstream provider")]
    RateLimited { retry_after: Option<Duration> },

    /// Upstream credits are exhausted; do not retry this period.
    #[error("upstream quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Upstream network failure or 5xx.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Unexpected failure.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Stable identifier for each [`StudioError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    InvalidInput,
    Conflict,
    RateLimited,
    QuotaExceeded,
    UpstreamUnavailable,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Conflict => "conflict",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::QuotaExceeded => "quota_exceeded",
            ErrorKind::UpstreamUnavailable => "upstream_unavailable",
            ErrorKind::Internal => "internal",
        }
    }
}

impl StudioError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StudioError::NotFound(_) => ErrorKind::NotFound,
            StudioError::InvalidInput(_) => ErrorKind::InvalidInput,
            StudioError::Conflict(_) => ErrorKind::Conflict,
            StudioError::RateLimited { .. } => ErrorKind::RateLimited,
            StudioError::QuotaExceeded(_) => ErrorKind::QuotaExceeded,
            StudioError::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            StudioError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            StudioError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

impl From<DatabaseError> for StudioError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { .. } => StudioError::NotFound(err.to_string()),
            DatabaseError::AlreadyExists { .. } | DatabaseError::Conflict { .. } => {
                StudioError::Conflict(err.to_string())
            }
            DatabaseError::InvalidInput(msg) => StudioError::InvalidInput(msg),
            DatabaseError::Sqlx(_) | DatabaseError::Migration(_) => {
                tracing::error!("Database failure: {}", err);
                StudioError::Internal("database failure".to_string())
            }
        }
    }
}

impl From<ValidationError> for StudioError {
    fn from(err: ValidationError) -> Self {
        StudioError::InvalidInput(err.to_string())
    }
}

impl From<SpeechError> for StudioError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::RateLimited { retry_after } => StudioError::RateLimited { retry_after },
            SpeechError::QuotaExceeded(msg) => StudioError::QuotaExceeded(msg),
            SpeechError::Unavailable(msg) => StudioError::UpstreamUnavailable(msg),
            SpeechError::Rejected { status, message } if status == 401 || status == 403 => {
                tracing::error!("Speech provider refused credentials ({}): {}", status, message);
                StudioError::UpstreamUnavailable("speech provider refused credentials".to_string())
            }
            SpeechError::Rejected { status, message } => StudioError::InvalidInput(format!(
                "speech provider rejected request ({}): {}",
                status, message
            )),
            SpeechError::InvalidInput(msg) => StudioError::InvalidInput(msg),
            SpeechError::Configuration(msg) => {
                tracing::error!("Speech provider misconfigured: {}", msg);
                StudioError::Internal("speech provider misconfigured".to_string())
            }
        }
    }
}

impl From<std::io::Error> for StudioError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!("Storage failure: {}", err);
        StudioError::Internal(format!("storage failure: {}", err.kind()))
    }
}

/// Result type for studio operations.
pub type Result<T> = std::result::Result<T, StudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_errors_map_to_kinds() {
        let err: StudioError = DatabaseError::NotFound {
            entity: "PodcastEpisode",
            id: "x".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err: StudioError = DatabaseError::Conflict {
            entity: "PodcastEpisode",
            id: "x".to_string(),
            reason: "generation already in progress".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(err.to_string().contains("already in progress"));

        let err: StudioError =
            DatabaseError::InvalidInput("title cannot be empty".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_speech_errors_keep_rate_limit_and_quota_distinct() {
        let err: StudioError = SpeechError::RateLimited {
            retry_after: Some(Duration::from_secs(20)),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::RateLimited);
        assert_eq!(err.retry_after(), Some(Duration::from_secs(20)));

        let err: StudioError = SpeechError::QuotaExceeded("0 left".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::QuotaExceeded);
        assert_eq!(err.retry_after(), None);

        let err: StudioError = SpeechError::Unavailable("timeout".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);

        let err: StudioError = SpeechError::Rejected {
            status: 401,
            message: "Invalid API key".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::UpstreamUnavailable);
        assert!(!err.to_string().contains("Invalid API key"));

        let err: StudioError = SpeechError::Rejected {
            status: 404,
            message: "voice not found".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}

//! HTTP error responses.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::header::RETRY_AFTER;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use studio::{ErrorKind, StudioError};
use thiserror::Error;

/// Errors returned by handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or unknown bearer token.
    #[error("unauthorized")]
    Unauthorized,

    /// Request body or query failed to parse.
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Studio(#[from] StudioError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Studio(err) => match err.kind() {
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                ErrorKind::QuotaExceeded => StatusCode::PAYMENT_REQUIRED,
                ErrorKind::UpstreamUnavailable => StatusCode::BAD_GATEWAY,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "unauthorized",
            ApiError::BadRequest(_) => ErrorKind::InvalidInput.as_str(),
            ApiError::Studio(err) => err.kind().as_str(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(kind = self.kind(), "Request failed: {}", self);
        } else {
            tracing::warn!(kind = self.kind(), "Request rejected: {}", self);
        }

        let body = serde_json::json!({
            "error": {
                "kind": self.kind(),
                "message": self.to_string(),
            }
        });
        let mut response = (status, Json(body)).into_response();

        if let ApiError::Studio(err) = &self {
            if let Some(retry_after) = err.retry_after() {
                let secs = retry_after.as_secs().max(1);
                if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                    response.headers_mut().insert(RETRY_AFTER, value);
                }
            }
        }
        response
    }
}

/// Result type for handlers.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (StudioError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (StudioError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (StudioError::Conflict("x".into()), StatusCode::CONFLICT),
            (StudioError::QuotaExceeded("x".into()), StatusCode::PAYMENT_REQUIRED),
            (StudioError::UpstreamUnavailable("x".into()), StatusCode::BAD_GATEWAY),
            (StudioError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), status);
            assert!(response.headers().get(RETRY_AFTER).is_none());
        }

        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_rate_limit_sets_retry_after() {
        let err = StudioError::RateLimited {
            retry_after: Some(Duration::from_secs(42)),
        };
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response.headers().get(RETRY_AFTER).and_then(|v| v.to_str().ok()),
            Some("42")
        );

        let response = ApiError::from(StudioError::RateLimited { retry_after: None }).into_response();
        assert!(response.headers().get(RETRY_AFTER).is_none());
    }
}

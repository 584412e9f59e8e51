//! Input validation for titles, topics, URLs and uploaded images.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use url::Url;

use crate::error::DatabaseError;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid URL format.
    InvalidUrl(String),
    /// Image payload is not valid base64.
    InvalidImage(String),
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
    /// Empty value where one is required.
    Empty(String),
    /// A list that must contain at least one entry was empty.
    EmptyList(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            ValidationError::InvalidImage(msg) => write!(f, "Invalid image: {}", msg),
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
            ValidationError::EmptyList(field) => write!(f, "{} must not be empty", field),
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for DatabaseError {
    fn from(err: ValidationError) -> Self {
        DatabaseError::InvalidInput(err.to_string())
    }
}

/// Maximum allowed length for module, unit and episode titles.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum allowed length for a learning topic.
pub const MAX_TOPIC_LENGTH: usize = 500;

/// Maximum allowed length for URLs.
pub const MAX_URL_LENGTH: usize = 2048;

/// Maximum size of a base64 screenshot payload (about 10 MB decoded).
pub const MAX_IMAGE_BASE64_LENGTH: usize = 14 * 1024 * 1024;

/// Validate a required, length-capped text field.
pub fn validate_text(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Empty(field.to_string()));
    }

    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
            actual,
        });
    }

    Ok(())
}

/// Validate a title.
pub fn validate_title(title: &str) -> Result<(), ValidationError> {
    validate_text("title", title, MAX_TITLE_LENGTH)
}

/// Validate a learning topic.
pub fn validate_topic(topic: &str) -> Result<(), ValidationError> {
    validate_text("topic", topic, MAX_TOPIC_LENGTH)
}

/// Validate a batch of unit titles: at least one, each a valid title.
pub fn validate_unit_titles<S: AsRef<str>>(titles: &[S]) -> Result<(), ValidationError> {
    if titles.is_empty() {
        return Err(ValidationError::EmptyList("unit titles".to_string()));
    }

    for title in titles {
        validate_title(title.as_ref())?;
    }

    Ok(())
}

/// Validate an absolute http(s) URL.
///
/// Checks:
/// - Not empty and not too long
/// - Parses as a URL
/// - Scheme is http or https
/// - Has a non-empty host
/// - Contains no whitespace
pub fn validate_url(url: &str) -> Result<(), ValidationError> {
    let url = url.trim();

    if url.is_empty() {
        return Err(ValidationError::Empty("url".to_string()));
    }

    if url.len() > MAX_URL_LENGTH {
        return Err(ValidationError::TooLong {
            field: "url".to_string(),
            max: MAX_URL_LENGTH,
            actual: url.len(),
        });
    }

    // The parser silently drops tabs and newlines; stored URLs must match what was sent.
    if url.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidUrl(
            "must not contain whitespace".to_string(),
        ));
    }

    let parsed = Url::parse(url).map_err(|e| ValidationError::InvalidUrl(e.to_string()))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::InvalidUrl(
            "scheme must be http or https".to_string(),
        ));
    }

    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(ValidationError::InvalidUrl("missing host".to_string())),
    }
}

/// Validate a base64 image payload.
///
/// Accepts bare standard base64 or a `data:image/...;base64,` URL.
pub fn validate_image_base64(data: &str) -> Result<(), ValidationError> {
    let data = data.trim();

    if data.is_empty() {
        return Err(ValidationError::Empty("image".to_string()));
    }

    if data.len() > MAX_IMAGE_BASE64_LENGTH {
        return Err(ValidationError::TooLong {
            field: "image".to_string(),
            max: MAX_IMAGE_BASE64_LENGTH,
            actual: data.len(),
        });
    }

    let payload = match data.strip_prefix("data:") {
        Some(rest) => {
            let (header, payload) = rest.split_once(',').ok_or_else(|| {
                ValidationError::InvalidImage("data URL has no payload".to_string())
            })?;
            if !header.starts_with("image/") || !header.ends_with(";base64") {
                return Err(ValidationError::InvalidImage(
                    "data URL must be a base64 image".to_string(),
                ));
            }
            payload
        }
        None => data,
    };

    let decoded = STANDARD
        .decode(payload)
        .map_err(|e| ValidationError::InvalidImage(e.to_string()))?;
    if decoded.is_empty() {
        return Err(ValidationError::Empty("image".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_title() {
        assert!(validate_title("Aprende ComfyUI").is_ok());
        assert!(validate_title("  padded  ").is_ok());

        assert!(matches!(validate_title(""), Err(ValidationError::Empty(_))));
        assert!(matches!(validate_title("   "), Err(ValidationError::Empty(_))));

        let long_title = "a".repeat(MAX_TITLE_LENGTH + 1);
        assert!(matches!(
            validate_title(&long_title),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_title_counts_chars_not_bytes() {
        // 200 two-byte characters is still within the limit
        let accented = "é".repeat(MAX_TITLE_LENGTH);
        assert!(validate_title(&accented).is_ok());
    }

    #[test]
    fn test_validate_unit_titles() {
        assert!(validate_unit_titles(&["Intro", "Nodos"]).is_ok());

        let empty: [&str; 0] = [];
        assert!(matches!(
            validate_unit_titles(&empty),
            Err(ValidationError::EmptyList(_))
        ));

        assert!(matches!(
            validate_unit_titles(&["Intro", " "]),
            Err(ValidationError::Empty(_))
        ));
    }

    #[test]
    fn test_validate_url_valid() {
        assert!(validate_url("https://example.com").is_ok());
        assert!(validate_url("http://blog.example.com/post?id=1").is_ok());
        assert!(validate_url(" https://example.com/a#b ").is_ok()); // trimmed
    }

    #[test]
    fn test_validate_url_invalid() {
        assert!(matches!(validate_url(""), Err(ValidationError::Empty(_))));

        assert!(matches!(
            validate_url("ftp://example.com"),
            Err(ValidationError::InvalidUrl(_))
        ));

        assert!(matches!(
            validate_url("https://"),
            Err(ValidationError::InvalidUrl(_))
        ));

        assert!(matches!(
            validate_url("https://exa mple.com"),
            Err(ValidationError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_validate_url_rejects_malformed_hosts() {
        for url in [
            "https://[oops",
            "http://exa%mple",
            "https://a^b/x",
            "http://:80/",
            "mailto:someone@example.com",
        ] {
            assert!(
                matches!(validate_url(url), Err(ValidationError::InvalidUrl(_))),
                "accepted {}",
                url
            );
        }
    }

    #[test]
    fn test_validate_image_base64() {
        assert!(validate_image_base64("iVBORw0KGgo=").is_ok());
        assert!(validate_image_base64("data:image/png;base64,iVBORw0KGgo=").is_ok());
        assert!(matches!(
            validate_image_base64(""),
            Err(ValidationError::Empty(_))
        ));
    }

    #[test]
    fn test_validate_image_base64_rejects_non_base64() {
        for data in [
            "not base64 at all !!!",
            "iVBORw0KGgo",
            "data:text/plain;base64,aGVsbG8=",
            "data:image/png,iVBORw0KGgo=",
            "data:image/png;base64,",
        ] {
            assert!(validate_image_base64(data).is_err(), "accepted {}", data);
        }

        assert!(matches!(
            validate_image_base64("not base64 at all !!!"),
            Err(ValidationError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::InvalidUrl("missing host".to_string());
        assert_eq!(err.to_string(), "Invalid URL: missing host");

        let err = ValidationError::TooLong {
            field: "title".to_string(),
            max: 200,
            actual: 300,
        };
        assert_eq!(err.to_string(), "title is too long (300 chars, max 200)");

        let db_err: DatabaseError = ValidationError::Empty("topic".to_string()).into();
        assert!(matches!(db_err, DatabaseError::InvalidInput(msg) if msg == "topic cannot be empty"));
    }
}

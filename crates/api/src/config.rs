//! Configuration loaded from environment variables.

use std::collections::HashMap;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use studio::{StudioSettings, DEFAULT_SHOW_NAME};

/// API server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Bearer token to user id.
    pub tokens: HashMap<String, String>,
    /// Directory generated audio is written to.
    pub audio_dir: PathBuf,
    /// URL path the audio directory is served under.
    pub audio_public_prefix: String,
    pub show_name: String,
    pub default_voice_id: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `COMFY_ADDR` | Server bind address | `127.0.0.1:8790` |
    /// | `DATABASE_URL` | SQLite database URL | `sqlite:comfyclaude.db?mode=rwc` |
    /// | `COMFY_API_TOKENS` | `token=user_id` pairs, comma separated | (required) |
    /// | `AUDIO_DIR` | Audio output directory | `public/audio/podcasts` |
    /// | `AUDIO_PUBLIC_PREFIX` | URL prefix for audio files | `/audio/podcasts` |
    /// | `PODCAST_SHOW_NAME` | Show name in tags | `ComfyClaude Podcast` |
    /// | `PODCAST_DEFAULT_VOICE_ID` | Fallback voice | (none) |
    pub fn from_env() -> Result<Self, ConfigError> {
        let addr = env::var("COMFY_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8790".to_string())
            .parse()
            .map_err(|_| ConfigError::InvalidAddr)?;

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:comfyclaude.db?mode=rwc".to_string());

        let tokens = parse_tokens(
            &env::var("COMFY_API_TOKENS").map_err(|_| ConfigError::MissingTokens)?,
        )?;

        let audio_dir = env::var("AUDIO_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("public/audio/podcasts"));

        let audio_public_prefix = normalize_prefix(
            &env::var("AUDIO_PUBLIC_PREFIX").unwrap_or_else(|_| "/audio/podcasts".to_string()),
        )?;

        let show_name = env::var("PODCAST_SHOW_NAME")
            .ok()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SHOW_NAME.to_string());

        let default_voice_id = env::var("PODCAST_DEFAULT_VOICE_ID")
            .ok()
            .filter(|voice| !voice.trim().is_empty());

        Ok(Self {
            addr,
            database_url,
            tokens,
            audio_dir,
            audio_public_prefix,
            show_name,
            default_voice_id,
        })
    }

    pub fn studio_settings(&self) -> StudioSettings {
        StudioSettings {
            show_name: self.show_name.clone(),
            default_voice_id: self.default_voice_id.clone(),
        }
    }
}

/// Parse `token=user_id` pairs separated by commas.
pub fn parse_tokens(raw: &str) -> Result<HashMap<String, String>, ConfigError> {
    let mut tokens = HashMap::new();
    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((token, user_id)) = pair.split_once('=') else {
            return Err(ConfigError::InvalidToken(redact(pair)));
        };
        let (token, user_id) = (token.trim(), user_id.trim());
        if token.is_empty() || user_id.is_empty() {
            return Err(ConfigError::InvalidToken(redact(pair)));
        }
        tokens.insert(token.to_string(), user_id.to_string());
    }

    if tokens.is_empty() {
        return Err(ConfigError::MissingTokens);
    }
    Ok(tokens)
}

/// Leading slash, no trailing slash, not the root.
fn normalize_prefix(prefix: &str) -> Result<String, ConfigError> {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.is_empty() || trimmed == "/" {
        return Err(ConfigError::InvalidAudioPrefix);
    }
    if trimmed.starts_with('/') {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("/{}", trimmed))
    }
}

fn redact(pair: &str) -> String {
    let visible: String = pair.chars().take(4).collect();
    format!("{}...", visible)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid COMFY_ADDR format")]
    InvalidAddr,

    #[error("COMFY_API_TOKENS environment variable is required")]
    MissingTokens,

    #[error("Invalid COMFY_API_TOKENS entry starting with {0}, expected token=user_id")]
    InvalidToken(String),

    #[error("AUDIO_PUBLIC_PREFIX must be a non-root path")]
    InvalidAudioPrefix,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "COMFY_ADDR",
        "DATABASE_URL",
        "COMFY_API_TOKENS",
        "AUDIO_DIR",
        "AUDIO_PUBLIC_PREFIX",
        "PODCAST_SHOW_NAME",
        "PODCAST_DEFAULT_VOICE_ID",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        env::set_var("COMFY_API_TOKENS", "secret=ana");

        let config = Config::from_env().unwrap();
        assert_eq!(config.addr.to_string(), "127.0.0.1:8790");
        assert_eq!(config.database_url, "sqlite:comfyclaude.db?mode=rwc");
        assert_eq!(config.tokens.get("secret").map(String::as_str), Some("ana"));
        assert_eq!(config.audio_dir, PathBuf::from("public/audio/podcasts"));
        assert_eq!(config.audio_public_prefix, "/audio/podcasts");
        assert_eq!(config.show_name, "ComfyClaude Podcast");
        assert_eq!(config.default_voice_id, None);

        clear_env();
    }

    #[test]
    fn test_overrides() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        env::set_var("COMFY_ADDR", "0.0.0.0:9000");
        env::set_var("COMFY_API_TOKENS", "a=ana, b=luis");
        env::set_var("AUDIO_PUBLIC_PREFIX", "media/");
        env::set_var("PODCAST_SHOW_NAME", "Mi Show");
        env::set_var("PODCAST_DEFAULT_VOICE_ID", "es-lucia");

        let config = Config::from_env().unwrap();
        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.tokens.len(), 2);
        assert_eq!(config.audio_public_prefix, "/media");
        let settings = config.studio_settings();
        assert_eq!(settings.show_name, "Mi Show");
        assert_eq!(settings.default_voice_id.as_deref(), Some("es-lucia"));

        clear_env();
    }

    #[test]
    fn test_missing_or_bad_settings() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        assert!(matches!(Config::from_env(), Err(ConfigError::MissingTokens)));

        env::set_var("COMFY_API_TOKENS", "x=y");
        env::set_var("COMFY_ADDR", "nope");
        assert!(matches!(Config::from_env(), Err(ConfigError::InvalidAddr)));

        env::remove_var("COMFY_ADDR");
        env::set_var("AUDIO_PUBLIC_PREFIX", "/");
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidAudioPrefix)
        ));

        clear_env();
    }

    #[test]
    fn test_parse_tokens() {
        let tokens = parse_tokens("t1=ana,,t2 = luis ").unwrap();
        assert_eq!(tokens.get("t2").map(String::as_str), Some("luis"));

        assert!(matches!(parse_tokens(""), Err(ConfigError::MissingTokens)));
        let err = parse_tokens("supersecret").unwrap_err();
        // The token itself is not echoed back in full
        assert!(!err.to_string().contains("supersecret"));
        assert!(matches!(parse_tokens("=ana"), Err(ConfigError::InvalidToken(_))));
    }
}

//! Configuration for the ElevenLabs provider.

use speech_core::SpeechError;
use std::env;
use std::time::Duration;

/// Default API base URL.
pub const DEFAULT_API_URL: &str = "https://api.elevenlabs.io";

/// Default synthesis model; handles Spanish well.
pub const DEFAULT_MODEL: &str = "eleven_multilingual_v2";

/// Default audio encoding.
pub const DEFAULT_OUTPUT_FORMAT: &str = "mp3_44100_128";

/// Default per-request character limit, below the provider's hard cap.
pub const DEFAULT_MAX_CHARS: usize = 4500;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for [`crate::ElevenLabsSpeech`].
#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    /// ElevenLabs API URL.
    pub api_url: String,

    /// API key sent as `xi-api-key`.
    pub api_key: String,

    /// Model id used for synthesis.
    pub model_id: String,

    /// Output format query parameter, e.g. `mp3_44100_128`.
    pub output_format: String,

    /// Maximum characters per synthesis request.
    pub max_chars_per_request: usize,

    /// Network timeout per request.
    pub timeout: Duration,
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            model_id: DEFAULT_MODEL.to_string(),
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            max_chars_per_request: DEFAULT_MAX_CHARS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ElevenLabsConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `ELEVENLABS_API_KEY` - API key for authentication
    ///
    /// Optional environment variables:
    /// - `ELEVENLABS_API_URL` - API URL (default: https://api.elevenlabs.io)
    /// - `ELEVENLABS_MODEL` - Model id (default: eleven_multilingual_v2)
    /// - `ELEVENLABS_OUTPUT_FORMAT` - Output format (default: mp3_44100_128)
    /// - `ELEVENLABS_MAX_CHARS` - Characters per request (default: 4500)
    /// - `ELEVENLABS_TIMEOUT_SECS` - Request timeout (default: 120)
    pub fn from_env() -> Result<Self, SpeechError> {
        let api_key = env::var("ELEVENLABS_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                SpeechError::Configuration("ELEVENLABS_API_KEY not set".to_string())
            })?;

        let api_url =
            env::var("ELEVENLABS_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let model_id = env::var("ELEVENLABS_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let output_format = env::var("ELEVENLABS_OUTPUT_FORMAT")
            .unwrap_or_else(|_| DEFAULT_OUTPUT_FORMAT.to_string());

        let max_chars_per_request = env::var("ELEVENLABS_MAX_CHARS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|chars: &usize| *chars > 0)
            .unwrap_or(DEFAULT_MAX_CHARS);

        let timeout = env::var("ELEVENLABS_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        Ok(Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            model_id,
            output_format,
            max_chars_per_request,
            timeout,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> ElevenLabsConfigBuilder {
        ElevenLabsConfigBuilder::default()
    }
}

/// Builder for ElevenLabsConfig.
#[derive(Debug, Default)]
pub struct ElevenLabsConfigBuilder {
    config: ElevenLabsConfig,
}

impl ElevenLabsConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the model id.
    pub fn model_id(mut self, model: impl Into<String>) -> Self {
        self.config.model_id = model.into();
        self
    }

    /// Set the output format.
    pub fn output_format(mut self, format: impl Into<String>) -> Self {
        self.config.output_format = format.into();
        self
    }

    /// Set the per-request character limit.
    pub fn max_chars_per_request(mut self, chars: usize) -> Self {
        self.config.max_chars_per_request = chars.max(1);
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ElevenLabsConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ElevenLabsConfig::default();

        assert_eq!(config.api_url, "https://api.elevenlabs.io");
        assert!(config.api_key.is_empty());
        assert_eq!(config.model_id, "eleven_multilingual_v2");
        assert_eq!(config.output_format, "mp3_44100_128");
        assert_eq!(config.max_chars_per_request, 4500);
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_builder_all_options() {
        let config = ElevenLabsConfig::builder()
            .api_key("my-key")
            .api_url("http://localhost:9000/")
            .model_id("eleven_turbo_v2_5")
            .output_format("mp3_22050_32")
            .max_chars_per_request(1000)
            .timeout(Duration::from_secs(5))
            .build();

        assert_eq!(config.api_key, "my-key");
        assert_eq!(config.api_url, "http://localhost:9000");
        assert_eq!(config.model_id, "eleven_turbo_v2_5");
        assert_eq!(config.output_format, "mp3_22050_32");
        assert_eq!(config.max_chars_per_request, 1000);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }

    // Environment-based tests are combined into a single test to avoid
    // race conditions when tests run in parallel (env vars are process-global).
    #[test]
    fn test_from_env_scenarios() {
        use std::sync::Mutex;
        static ENV_LOCK: Mutex<()> = Mutex::new(());
        let _guard = ENV_LOCK.lock().unwrap();

        fn clear_all_elevenlabs_vars() {
            std::env::remove_var("ELEVENLABS_API_KEY");
            std::env::remove_var("ELEVENLABS_API_URL");
            std::env::remove_var("ELEVENLABS_MODEL");
            std::env::remove_var("ELEVENLABS_OUTPUT_FORMAT");
            std::env::remove_var("ELEVENLABS_MAX_CHARS");
            std::env::remove_var("ELEVENLABS_TIMEOUT_SECS");
        }

        // Scenario 1: Missing API key should error
        clear_all_elevenlabs_vars();
        match ElevenLabsConfig::from_env() {
            Err(SpeechError::Configuration(msg)) => assert!(msg.contains("ELEVENLABS_API_KEY")),
            other => panic!("Expected Configuration error, got {:?}", other),
        }

        // Scenario 2: Only API key set, defaults used
        clear_all_elevenlabs_vars();
        std::env::set_var("ELEVENLABS_API_KEY", "test-env-key");

        let config = ElevenLabsConfig::from_env().unwrap();
        assert_eq!(config.api_key, "test-env-key");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.model_id, DEFAULT_MODEL);
        assert_eq!(config.max_chars_per_request, DEFAULT_MAX_CHARS);

        // Scenario 3: All vars set
        clear_all_elevenlabs_vars();
        std::env::set_var("ELEVENLABS_API_KEY", "full-test-key");
        std::env::set_var("ELEVENLABS_API_URL", "https://proxy.example.com/");
        std::env::set_var("ELEVENLABS_MODEL", "eleven_flash_v2_5");
        std::env::set_var("ELEVENLABS_OUTPUT_FORMAT", "mp3_44100_64");
        std::env::set_var("ELEVENLABS_MAX_CHARS", "2500");
        std::env::set_var("ELEVENLABS_TIMEOUT_SECS", "30");

        let config = ElevenLabsConfig::from_env().unwrap();
        assert_eq!(config.api_url, "https://proxy.example.com");
        assert_eq!(config.model_id, "eleven_flash_v2_5");
        assert_eq!(config.output_format, "mp3_44100_64");
        assert_eq!(config.max_chars_per_request, 2500);
        assert_eq!(config.timeout, Duration::from_secs(30));

        // Scenario 4: Unparseable or zero limits fall back to defaults
        clear_all_elevenlabs_vars();
        std::env::set_var("ELEVENLABS_API_KEY", "test-key");
        std::env::set_var("ELEVENLABS_MAX_CHARS", "0");
        std::env::set_var("ELEVENLABS_TIMEOUT_SECS", "soon");

        let config = ElevenLabsConfig::from_env().unwrap();
        assert_eq!(config.max_chars_per_request, DEFAULT_MAX_CHARS);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        // Cleanup
        clear_all_elevenlabs_vars();
    }
}

//! Provider-neutral voice and credit types.

use serde::{Deserialize, Serialize};

/// A voice offered by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub voice_id: String,
    pub name: String,
    /// Provider category such as `premade` or `cloned`.
    pub category: Option<String>,
    /// Language label, when the provider reports one.
    pub language: Option<String>,
    /// Accent label, when the provider reports one.
    pub accent: Option<String>,
    pub preview_url: Option<String>,
}

const SPANISH_LANGUAGE_LABELS: &[&str] = &["es", "spanish", "español", "espanol"];

const SPANISH_ACCENT_HINTS: &[&str] = &[
    "spanish", "español", "castilian", "latin", "mexican", "argentin", "colombian", "chilean",
    "peruvian", "venezuelan", "cuban", "caribbean", "andalusian",
];

impl Voice {
    /// Whether the voice speaks Spanish, by language label or accent.
    pub fn is_spanish(&self) -> bool {
        let language_match = self.language.as_deref().is_some_and(|language| {
            let language = language.trim().to_lowercase();
            SPANISH_LANGUAGE_LABELS.contains(&language.as_str()) || language.starts_with("es-")
        });

        let accent_match = self.accent.as_deref().is_some_and(|accent| {
            let accent = accent.to_lowercase();
            SPANISH_ACCENT_HINTS.iter().any(|hint| accent.contains(hint))
        });

        language_match || accent_match
    }
}

/// Synthesis parameters. Unknown keys in stored settings are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
    pub use_speaker_boost: bool,
    pub speed: Option<f32>,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.75,
            style: 0.0,
            use_speaker_boost: true,
            speed: None,
        }
    }
}

impl VoiceSettings {
    /// Read settings from a stored JSON value, falling back to defaults for
    /// missing fields.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value.clone())
    }
}

/// Credit balance for the current billing period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditBalance {
    pub remaining: i64,
    pub total: i64,
    /// ISO-8601 date the balance resets, if known.
    pub reset_date: Option<String>,
}

impl CreditBalance {
    /// A balance that never runs out.
    pub fn unlimited() -> Self {
        Self {
            remaining: i64::MAX,
            total: i64::MAX,
            reset_date: None,
        }
    }

    pub fn covers(&self, required: i64) -> bool {
        self.remaining >= required
    }
}

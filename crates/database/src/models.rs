//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// Persisted status of a learning module.
///
/// There is no paused state at this layer; pausing is a display concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModuleStatus {
    Active,
    Completed,
}

impl ModuleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleStatus::Active => "ACTIVE",
            ModuleStatus::Completed => "COMPLETED",
        }
    }
}

/// A learning topic container with an aggregate completion percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LearningModule {
    /// UUID.
    pub id: String,
    /// Principal that created the module.
    pub owner_id: String,
    pub title: String,
    /// Free-text topic used for similarity matching.
    pub topic: String,
    pub description: Option<String>,
    pub status: ModuleStatus,
    /// Rounded percentage of completed units (0-100).
    pub progress: i64,
    /// Conversation the module was started from, if any.
    pub conversation_id: Option<String>,
    pub is_manual: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// A single completable step within a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LearningUnit {
    pub id: String,
    pub module_id: String,
    pub title: String,
    /// Insertion sequence within the module.
    pub order: i64,
    pub completed: bool,
    pub created_at: String,
}

/// A module together with its units in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleWithUnits {
    #[serde(flatten)]
    pub module: LearningModule,
    pub units: Vec<LearningUnit>,
}

/// Lifecycle status of a podcast episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EpisodeStatus {
    Draft,
    Generating,
    Ready,
    Failed,
    Published,
}

impl EpisodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EpisodeStatus::Draft => "DRAFT",
            EpisodeStatus::Generating => "GENERATING",
            EpisodeStatus::Ready => "READY",
            EpisodeStatus::Failed => "FAILED",
            EpisodeStatus::Published => "PUBLISHED",
        }
    }

    /// Whether the episode has audio attached.
    pub fn has_audio(&self) -> bool {
        matches!(self, EpisodeStatus::Ready | EpisodeStatus::Published)
    }
}

/// One podcast installment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PodcastEpisode {
    pub id: String,
    pub episode_number: i64,
    pub title: String,
    pub description: Option<String>,
    /// Raw authoring script.
    pub script: String,
    pub voice_id: Option<String>,
    /// Provider-specific synthesis parameters.
    pub voice_settings: Option<Json<serde_json::Value>>,
    pub status: EpisodeStatus,
    pub audio_url: Option<String>,
    /// Seconds.
    pub audio_duration: Option<i64>,
    /// Bytes.
    pub audio_size: Option<i64>,
    pub credits_used: Option<i64>,
    pub trend_ids: Json<Vec<String>>,
    pub published_platforms: Json<Vec<String>>,
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields for a new episode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewEpisode {
    /// Explicit episode number; assigned as max + 1 when absent.
    pub episode_number: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub script: String,
    pub voice_id: Option<String>,
    pub voice_settings: Option<serde_json::Value>,
    pub trend_ids: Vec<String>,
}

/// Editable episode fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub script: Option<String>,
    pub voice_id: Option<String>,
    pub voice_settings: Option<serde_json::Value>,
}

/// Audio attached to an episode once generation succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedAudio {
    pub audio_url: String,
    pub duration_secs: i64,
    pub size_bytes: i64,
    pub credits_used: i64,
}

/// Result of claiming an episode for generation.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationClaim {
    /// The episode, now `GENERATING` with audio fields cleared.
    pub episode: PodcastEpisode,
    /// Audio URL the episode referenced before the claim, if any.
    pub previous_audio_url: Option<String>,
}

/// Show-wide defaults, stored as a single row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PodcastConfig {
    pub podcast_name: String,
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    pub intro_script: Option<String>,
    pub outro_script: Option<String>,
    pub default_voice_id: Option<String>,
    pub default_voice_settings: Option<Json<serde_json::Value>>,
    pub target_duration_minutes: Option<i64>,
    pub publish_frequency: Option<String>,
    pub spotify_show_id: Option<String>,
    pub apple_show_id: Option<String>,
    #[serde(default)]
    pub updated_at: String,
}

/// Fixed set of trend topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrendCategory {
    AiTools,
    ImageGeneration,
    VideoGeneration,
    Automation,
    Monetization,
    General,
}

/// An ingested trend item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Trend {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    /// Unique across all trends.
    pub url: String,
    /// Hostname the item came from.
    pub source: String,
    pub category: TrendCategory,
    /// Fixed at creation; higher is fresher.
    pub heat_score: i64,
    pub keywords: Json<Vec<String>>,
    pub fetched_at: String,
}

/// Fields for a trend insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTrend {
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub source: String,
    pub category: TrendCategory,
    pub heat_score: i64,
    pub keywords: Vec<String>,
}

/// A captured browser screenshot waiting to be consumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Screenshot {
    pub id: String,
    pub owner_id: String,
    pub image_base64: String,
    pub source_url: Option<String>,
    pub created_at: String,
}

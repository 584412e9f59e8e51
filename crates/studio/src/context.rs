//! Shared dependencies for studio services.

use std::sync::Arc;

use database::Database;
use speech_core::SpeechSynthesizer;

use crate::episodes::EpisodeManager;
use crate::learning::LearningService;
use crate::screenshots::ScreenshotInbox;
use crate::storage::AudioStore;
use crate::trends::TrendService;

/// Show name used until a podcast config is saved.
pub const DEFAULT_SHOW_NAME: &str = "ComfyClaude Podcast";

/// Process-wide podcast defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudioSettings {
    pub show_name: String,
    /// Voice used when neither the episode nor the saved config names one.
    pub default_voice_id: Option<String>,
}

impl Default for StudioSettings {
    fn default() -> Self {
        Self {
            show_name: DEFAULT_SHOW_NAME.to_string(),
            default_voice_id: None,
        }
    }
}

/// Everything a request needs: the database, the speech provider, audio
/// storage and settings. Cheap to clone.
#[derive(Clone)]
pub struct StudioContext {
    db: Database,
    speech: Arc<dyn SpeechSynthesizer>,
    audio: AudioStore,
    settings: StudioSettings,
}

impl StudioContext {
    pub fn new(
        db: Database,
        speech: Arc<dyn SpeechSynthesizer>,
        audio: AudioStore,
        settings: StudioSettings,
    ) -> Self {
        Self {
            db,
            speech,
            audio,
            settings,
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn speech(&self) -> &dyn SpeechSynthesizer {
        self.speech.as_ref()
    }

    pub fn audio(&self) -> &AudioStore {
        &self.audio
    }

    pub fn settings(&self) -> &StudioSettings {
        &self.settings
    }

    pub fn learning(&self) -> LearningService<'_> {
        LearningService::new(&self.db)
    }

    pub fn episodes(&self) -> EpisodeManager<'_> {
        EpisodeManager::new(self)
    }

    pub fn trends(&self) -> TrendService<'_> {
        TrendService::new(&self.db)
    }

    pub fn screenshots(&self) -> ScreenshotInbox<'_> {
        ScreenshotInbox::new(&self.db)
    }
}

impl std::fmt::Debug for StudioContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudioContext")
            .field("speech", &self.speech.name())
            .field("audio", &self.audio)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

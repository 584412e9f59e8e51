//! Podcast episode lifecycle.
//!
//! Generation runs inside the request:
//! 1. Claim the episode (`GENERATING`) with an atomic check-and-set
//! 2. Clean the script and resolve voice and settings
//! 3. Check the provider's credit balance
//! 4. Synthesize in chunks, write the file, attach it (`READY`)
//!
//! Any failure after the claim leaves the episode `FAILED` with no audio and
//! its script intact, and removes files the attempt wrote.

use chrono::{DateTime, Utc};
use database::{
    podcast_config, podcast_episode, EpisodeChanges, EpisodeStatus, GeneratedAudio, NewEpisode,
    PodcastConfig, PodcastEpisode,
};
use serde::{Deserialize, Serialize};
use speech_core::text::{char_len, duration_for_chars};
use speech_core::{
    clean_script, generate_preview, generate_speech, spanish_voices, Voice, VoiceSettings,
};
use tracing::{error, info, warn};

use crate::context::StudioContext;
use crate::error::{Result, StudioError};
use crate::filename::episode_filename;
use crate::tagging::{measure_duration_secs, tag_audio, EpisodeTags};

/// Request for a voice preview.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreviewRequest {
    pub text: String,
    /// Falls back to the configured default voice.
    pub voice_id: Option<String>,
    pub voice_settings: Option<serde_json::Value>,
}

/// A tagged audio file ready to hand to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeDownload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Episode operations over a [`StudioContext`].
pub struct EpisodeManager<'a> {
    ctx: &'a StudioContext,
}

impl<'a> EpisodeManager<'a> {
    pub fn new(ctx: &'a StudioContext) -> Self {
        Self { ctx }
    }

    /// Create a `DRAFT` episode, filling voice and description from the
    /// podcast config when the request leaves them out.
    pub async fn create(&self, request: NewEpisode) -> Result<PodcastEpisode> {
        let mut episode = request;
        if let Some(config) = podcast_config::get_config(self.ctx.db().pool()).await? {
            if episode.voice_id.is_none() {
                episode.voice_id = config.default_voice_id;
            }
            if episode.voice_settings.is_none() {
                episode.voice_settings = config.default_voice_settings.map(|json| json.0);
            }
            if episode.description.is_none() {
                episode.description = config.short_description;
            }
        }
        if episode.voice_id.is_none() {
            episode.voice_id = self.ctx.settings().default_voice_id.clone();
        }

        let created = podcast_episode::create_episode(self.ctx.db().pool(), &episode).await?;
        info!(
            episode_id = %created.id,
            episode_number = created.episode_number,
            "Created episode"
        );
        Ok(created)
    }

    pub async fn get(&self, id: &str) -> Result<PodcastEpisode> {
        Ok(podcast_episode::get_episode(self.ctx.db().pool(), id).await?)
    }

    pub async fn list(&self, status: Option<EpisodeStatus>) -> Result<Vec<PodcastEpisode>> {
        Ok(podcast_episode::list_episodes(self.ctx.db().pool(), status).await?)
    }

    /// Edit an episode. Rejected with `Conflict` while it is generating.
    pub async fn update(&self, id: &str, changes: &EpisodeChanges) -> Result<PodcastEpisode> {
        Ok(podcast_episode::update_episode(self.ctx.db().pool(), id, changes).await?)
    }

    /// Generate audio for an episode and move it to `READY`.
    pub async fn generate(&self, id: &str) -> Result<PodcastEpisode> {
        let pool = self.ctx.db().pool();
        let claim = podcast_episode::begin_generation(pool, id).await?;
        let previous = claim
            .previous_audio_url
            .as_deref()
            .and_then(|url| self.ctx.audio().filename_from_url(url))
            .map(str::to_string);

        info!(
            episode_id = %id,
            episode_number = claim.episode.episode_number,
            "Generating episode audio"
        );

        let (filename, audio) = match self.render(&claim.episode).await {
            Ok(rendered) => rendered,
            Err(e) => {
                self.abandon(id, previous.as_deref(), None).await;
                return Err(e);
            }
        };

        let ready = match podcast_episode::complete_generation(pool, id, &audio).await {
            Ok(episode) => episode,
            Err(e) => {
                self.abandon(id, previous.as_deref(), Some(&filename)).await;
                return Err(e.into());
            }
        };

        if let Some(old) = previous.filter(|old| *old != filename) {
            if let Err(e) = self.ctx.audio().remove(&old).await {
                warn!(episode_id = %id, "Could not remove replaced audio {}: {}", old, e);
            }
        }

        info!(
            episode_id = %id,
            duration_secs = audio.duration_secs,
            credits = audio.credits_used,
            "Episode ready"
        );
        Ok(ready)
    }

    /// Synthesize and store audio for a claimed episode.
    async fn render(&self, episode: &PodcastEpisode) -> Result<(String, GeneratedAudio)> {
        let script = clean_script(&episode.script);
        if script.is_empty() {
            return Err(StudioError::InvalidInput("episode script is empty".to_string()));
        }

        let config = podcast_config::get_config(self.ctx.db().pool()).await?;
        let voice_id = self.resolve_voice(episode.voice_id.as_deref(), config.as_ref())?;
        let settings = resolve_settings(
            episode.voice_settings.as_ref().map(|json| &json.0),
            config.as_ref(),
        )?;

        let credits = char_len(&script) as i64;
        match self.ctx.speech().remaining_credits().await {
            Ok(balance) if !balance.covers(credits) => {
                return Err(StudioError::QuotaExceeded(format!(
                    "{} credits needed, {} remaining",
                    credits, balance.remaining
                )));
            }
            Ok(_) => {}
            Err(e) => warn!(episode_id = %episode.id, "Credit check failed, continuing: {}", e),
        }

        let bytes = generate_speech(self.ctx.speech(), &voice_id, &script, &settings).await?;
        let duration_secs =
            measure_duration_secs(&bytes).unwrap_or_else(|| duration_for_chars(credits));

        let filename = episode_filename(episode.episode_number, &episode.title);
        self.ctx.audio().write(&filename, &bytes).await?;

        let audio = GeneratedAudio {
            audio_url: self.ctx.audio().url_for(&filename),
            duration_secs,
            size_bytes: bytes.len() as i64,
            credits_used: credits,
        };
        Ok((filename, audio))
    }

    /// Mark a generation attempt failed and remove files it touched.
    async fn abandon(&self, id: &str, previous: Option<&str>, written: Option<&str>) {
        for filename in [written, previous].into_iter().flatten() {
            if let Err(e) = self.ctx.audio().remove(filename).await {
                warn!(episode_id = %id, "Could not remove audio {}: {}", filename, e);
            }
        }

        if let Err(e) = podcast_episode::fail_generation(self.ctx.db().pool(), id).await {
            error!(episode_id = %id, "Could not mark episode failed: {}", e);
        } else {
            warn!(episode_id = %id, "Episode generation failed");
        }
    }

    /// Publish a `READY` episode to the given platforms.
    pub async fn publish(&self, id: &str, platforms: &[String]) -> Result<PodcastEpisode> {
        let platforms = normalize_platforms(platforms);
        let episode =
            podcast_episode::publish_episode(self.ctx.db().pool(), id, &platforms).await?;
        info!(episode_id = %id, platforms = ?episode.published_platforms.0, "Published episode");
        Ok(episode)
    }

    /// Delete an episode and its audio file.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let episode = podcast_episode::delete_episode(self.ctx.db().pool(), id).await?;
        if let Some(url) = episode.audio_url.as_deref() {
            if let Err(e) = self.ctx.audio().remove_url(url).await {
                warn!(episode_id = %id, "Episode deleted but audio remains: {}", e);
            }
        }
        info!(episode_id = %id, "Deleted episode");
        Ok(())
    }

    /// Read an episode's audio and tag it with the episode metadata.
    pub async fn download(&self, id: &str) -> Result<EpisodeDownload> {
        let episode = self.get(id).await?;
        if !episode.status.has_audio() {
            return Err(StudioError::Conflict(format!(
                "episode {} has no audio (is {})",
                id,
                episode.status.as_str()
            )));
        }

        let filename = episode
            .audio_url
            .as_deref()
            .and_then(|url| self.ctx.audio().filename_from_url(url))
            .map(str::to_string)
            .ok_or_else(|| StudioError::NotFound(format!("audio for episode {}", id)))?;
        let audio = self.ctx.audio().read(&filename).await?;

        let config = self.config().await?;
        let recorded_at = episode
            .published_at
            .as_deref()
            .and_then(parse_timestamp)
            .or_else(|| parse_timestamp(&episode.created_at))
            .unwrap_or_else(Utc::now);

        let tags = EpisodeTags {
            title: episode.title.clone(),
            episode_number: episode.episode_number,
            description: episode.description.clone(),
            show_name: config.podcast_name,
            duration_secs: episode.audio_duration,
            recorded_at,
        };
        let bytes = tag_audio(&audio, &tags)?;

        Ok(EpisodeDownload { filename, bytes })
    }

    /// The saved podcast config, or defaults from settings.
    pub async fn config(&self) -> Result<PodcastConfig> {
        let stored = podcast_config::get_config(self.ctx.db().pool()).await?;
        Ok(stored.unwrap_or_else(|| {
            let settings = self.ctx.settings();
            PodcastConfig {
                podcast_name: settings.show_name.clone(),
                short_description: None,
                long_description: None,
                intro_script: None,
                outro_script: None,
                default_voice_id: settings.default_voice_id.clone(),
                default_voice_settings: None,
                target_duration_minutes: None,
                publish_frequency: None,
                spotify_show_id: None,
                apple_show_id: None,
                updated_at: String::new(),
            }
        }))
    }

    pub async fn update_config(&self, config: &PodcastConfig) -> Result<PodcastConfig> {
        if let Some(settings) = config.default_voice_settings.as_ref() {
            VoiceSettings::from_json(&settings.0)
                .map_err(|e| StudioError::InvalidInput(format!("invalid voice settings: {}", e)))?;
        }
        Ok(podcast_config::upsert_config(self.ctx.db().pool(), config).await?)
    }

    /// Voices that speak Spanish.
    pub async fn voices(&self) -> Result<Vec<Voice>> {
        Ok(spanish_voices(self.ctx.speech()).await?)
    }

    /// Synthesize a short preview of `text`.
    pub async fn preview(&self, request: &PreviewRequest) -> Result<Vec<u8>> {
        let config = podcast_config::get_config(self.ctx.db().pool()).await?;
        let voice_id = self.resolve_voice(request.voice_id.as_deref(), config.as_ref())?;
        let settings = resolve_settings(request.voice_settings.as_ref(), config.as_ref())?;

        Ok(generate_preview(self.ctx.speech(), &request.text, &voice_id, &settings).await?)
    }

    /// Requested voice, then the saved default, then the process default.
    fn resolve_voice(
        &self,
        requested: Option<&str>,
        config: Option<&PodcastConfig>,
    ) -> Result<String> {
        requested
            .or_else(|| config.and_then(|c| c.default_voice_id.as_deref()))
            .or(self.ctx.settings().default_voice_id.as_deref())
            .map(str::trim)
            .filter(|voice| !voice.is_empty())
            .map(str::to_string)
            .ok_or_else(|| StudioError::InvalidInput("no voice selected".to_string()))
    }
}

fn resolve_settings(
    requested: Option<&serde_json::Value>,
    config: Option<&PodcastConfig>,
) -> Result<VoiceSettings> {
    let stored = requested.or_else(|| {
        config
            .and_then(|c| c.default_voice_settings.as_ref())
            .map(|json| &json.0)
    });

    match stored {
        Some(value) if !value.is_null() => VoiceSettings::from_json(value)
            .map_err(|e| StudioError::InvalidInput(format!("invalid voice settings: {}", e))),
        _ => Ok(VoiceSettings::default()),
    }
}

/// Trimmed, non-empty, first occurrence wins.
fn normalize_platforms(platforms: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::new();
    for platform in platforms {
        let platform = platform.trim();
        if !platform.is_empty() && !normalized.iter().any(|p| p == platform) {
            normalized.push(platform.to_string());
        }
    }
    normalized
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|ts| ts.with_timezone(&Utc))
}

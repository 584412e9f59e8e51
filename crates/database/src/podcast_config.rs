//! Podcast configuration singleton.
//!
//! The table holds at most one row (id 1). Episodes fall back to it for their
//! voice and description defaults.

use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::PodcastConfig;
use crate::validation::validate_title;

/// Get the podcast configuration, if one has been saved.
pub async fn get_config(pool: &SqlitePool) -> Result<Option<PodcastConfig>> {
    let config = sqlx::query_as::<_, PodcastConfig>(
        r#"
        SELECT podcast_name, short_description, long_description, intro_script, outro_script,
               default_voice_id, default_voice_settings, target_duration_minutes,
               publish_frequency, spotify_show_id, apple_show_id, updated_at
        FROM podcast_config
        WHERE id = 1
        "#,
    )
    .fetch_optional(pool)
    .await?;

    Ok(config)
}

/// Insert or replace the podcast configuration.
pub async fn upsert_config(pool: &SqlitePool, config: &PodcastConfig) -> Result<PodcastConfig> {
    validate_title(&config.podcast_name)?;

    sqlx::query(
        r#"
        INSERT INTO podcast_config (
            id, podcast_name, short_description, long_description, intro_script, outro_script,
            default_voice_id, default_voice_settings, target_duration_minutes,
            publish_frequency, spotify_show_id, apple_show_id
        )
        VALUES (1, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (id) DO UPDATE SET
            podcast_name = excluded.podcast_name,
            short_description = excluded.short_description,
            long_description = excluded.long_description,
            intro_script = excluded.intro_script,
            outro_script = excluded.outro_script,
            default_voice_id = excluded.default_voice_id,
            default_voice_settings = excluded.default_voice_settings,
            target_duration_minutes = excluded.target_duration_minutes,
            publish_frequency = excluded.publish_frequency,
            spotify_show_id = excluded.spotify_show_id,
            apple_show_id = excluded.apple_show_id,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        "#,
    )
    .bind(config.podcast_name.trim())
    .bind(&config.short_description)
    .bind(&config.long_description)
    .bind(&config.intro_script)
    .bind(&config.outro_script)
    .bind(&config.default_voice_id)
    .bind(config.default_voice_settings.as_ref().map(|settings| Json(&settings.0)))
    .bind(config.target_duration_minutes)
    .bind(&config.publish_frequency)
    .bind(&config.spotify_show_id)
    .bind(&config.apple_show_id)
    .execute(pool)
    .await?;

    tracing::info!(podcast_name = %config.podcast_name, "Saved podcast config");

    get_config(pool)
        .await?
        .ok_or_else(|| crate::DatabaseError::not_found("PodcastConfig", "1"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;

    fn config(name: &str) -> PodcastConfig {
        PodcastConfig {
            podcast_name: name.to_string(),
            short_description: Some("IA en español".to_string()),
            long_description: None,
            intro_script: Some("Bienvenidos.".to_string()),
            outro_script: None,
            default_voice_id: Some("voice-es".to_string()),
            default_voice_settings: Some(Json(serde_json::json!({ "stability": 0.5 }))),
            target_duration_minutes: Some(10),
            publish_frequency: Some("weekly".to_string()),
            spotify_show_id: None,
            apple_show_id: None,
            updated_at: String::new(),
        }
    }

    #[tokio::test]
    async fn test_config_starts_empty() {
        let db = test_db().await;
        assert!(get_config(db.pool()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_keeps_single_row() {
        let db = test_db().await;
        let pool = db.pool();

        let saved = upsert_config(pool, &config("ComfyClaude")).await.unwrap();
        assert_eq!(saved.podcast_name, "ComfyClaude");
        assert_eq!(saved.default_voice_id.as_deref(), Some("voice-es"));

        let saved = upsert_config(pool, &config("Renombrado")).await.unwrap();
        assert_eq!(saved.podcast_name, "Renombrado");

        let rows = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM podcast_config")
            .fetch_one(pool)
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }
}

//! Podcast episode storage and lifecycle transitions.
//!
//! Status changes are conditional UPDATEs (`WHERE status IN (...)`), so the
//! check and the write happen atomically. That is what keeps two generate
//! requests for the same episode from both entering `GENERATING`.

use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::error::{is_unique_violation, map_unique, DatabaseError, Result};
use crate::models::{
    EpisodeChanges, EpisodeStatus, GeneratedAudio, GenerationClaim, NewEpisode, PodcastEpisode,
};
use crate::new_id;
use crate::validation::validate_title;

const ENTITY: &str = "PodcastEpisode";

const EPISODE_COLUMNS: &str = "id, episode_number, title, description, script, voice_id, \
     voice_settings, status, audio_url, audio_duration, audio_size, credits_used, trend_ids, \
     published_platforms, published_at, created_at, updated_at";

/// Attempts at `max + 1` numbering before giving up.
const MAX_NUMBER_ATTEMPTS: usize = 5;

/// Create an episode in `DRAFT`.
///
/// Without an explicit number the episode gets `max(existing) + 1`, computed
/// inside the INSERT and backed by the UNIQUE constraint; a collision is
/// retried. An explicit number that is already taken fails with
/// `AlreadyExists`.
pub async fn create_episode(pool: &SqlitePool, episode: &NewEpisode) -> Result<PodcastEpisode> {
    validate_title(&episode.title)?;

    if let Some(number) = episode.episode_number {
        if number < 1 {
            return Err(DatabaseError::InvalidInput(
                "episode number must be positive".to_string(),
            ));
        }
        let id = new_id();
        insert_episode(pool, &id, Some(number), episode)
            .await
            .map_err(|e| map_unique(e, ENTITY, &format!("episode #{}", number)))?;
        return get_episode(pool, &id).await;
    }

    for attempt in 1..=MAX_NUMBER_ATTEMPTS {
        let id = new_id();
        match insert_episode(pool, &id, None, episode).await {
            Ok(()) => return get_episode(pool, &id).await,
            Err(e) if is_unique_violation(&e) => {
                tracing::warn!(attempt, "Episode number collision, retrying");
            }
            Err(e) => return Err(DatabaseError::Sqlx(e)),
        }
    }

    Err(DatabaseError::conflict(
        ENTITY,
        "new",
        "could not assign a unique episode number",
    ))
}

async fn insert_episode(
    pool: &SqlitePool,
    id: &str,
    number: Option<i64>,
    episode: &NewEpisode,
) -> std::result::Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO podcast_episodes
            (id, episode_number, title, description, script, voice_id, voice_settings, trend_ids)
        VALUES (
            ?,
            COALESCE(?, (SELECT COALESCE(MAX(episode_number), 0) + 1 FROM podcast_episodes)),
            ?, ?, ?, ?, ?, ?
        )
        "#,
    )
    .bind(id)
    .bind(number)
    .bind(episode.title.trim())
    .bind(&episode.description)
    .bind(&episode.script)
    .bind(&episode.voice_id)
    .bind(episode.voice_settings.as_ref().map(Json))
    .bind(Json(&episode.trend_ids))
    .execute(pool)
    .await?;

    Ok(())
}

/// Get an episode by ID.
pub async fn get_episode(pool: &SqlitePool, id: &str) -> Result<PodcastEpisode> {
    let sql = format!("SELECT {EPISODE_COLUMNS} FROM podcast_episodes WHERE id = ?");

    sqlx::query_as::<_, PodcastEpisode>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found(ENTITY, id))
}

/// List episodes, newest number first, optionally filtered by status.
pub async fn list_episodes(
    pool: &SqlitePool,
    status: Option<EpisodeStatus>,
) -> Result<Vec<PodcastEpisode>> {
    let sql = format!(
        r#"
        SELECT {EPISODE_COLUMNS}
        FROM podcast_episodes
        WHERE (? IS NULL OR status = ?)
        ORDER BY episode_number DESC
        "#
    );
    let status = status.map(|s| s.as_str());

    let episodes = sqlx::query_as::<_, PodcastEpisode>(&sql)
        .bind(status)
        .bind(status)
        .fetch_all(pool)
        .await?;

    Ok(episodes)
}

/// Edit an episode's descriptive fields. Rejected while generating.
pub async fn update_episode(
    pool: &SqlitePool,
    id: &str,
    changes: &EpisodeChanges,
) -> Result<PodcastEpisode> {
    if let Some(title) = &changes.title {
        validate_title(title)?;
    }

    let sql = format!(
        r#"
        UPDATE podcast_episodes
        SET title = COALESCE(?, title),
            description = COALESCE(?, description),
            script = COALESCE(?, script),
            voice_id = COALESCE(?, voice_id),
            voice_settings = COALESCE(?, voice_settings),
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ? AND status != 'GENERATING'
        RETURNING {EPISODE_COLUMNS}
        "#
    );

    let updated = sqlx::query_as::<_, PodcastEpisode>(&sql)
        .bind(changes.title.as_deref().map(str::trim))
        .bind(&changes.description)
        .bind(&changes.script)
        .bind(&changes.voice_id)
        .bind(changes.voice_settings.as_ref().map(Json))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match updated {
        Some(episode) => Ok(episode),
        None => {
            let current = get_episode(pool, id).await?;
            Err(DatabaseError::conflict(
                ENTITY,
                id,
                format!("cannot edit while {}", current.status.as_str()),
            ))
        }
    }
}

/// Atomically move an episode into `GENERATING`.
///
/// Allowed from `DRAFT`, `FAILED` and `READY`. A second request while the
/// first is still generating gets a `Conflict`, as does a published episode.
/// Audio fields are cleared in the same transaction; the URL they pointed at
/// is handed back so the caller can dispose of the old file.
pub async fn begin_generation(pool: &SqlitePool, id: &str) -> Result<GenerationClaim> {
    let mut tx = pool.begin().await?;

    let claimed = sqlx::query_scalar::<_, Option<String>>(
        r#"
        UPDATE podcast_episodes
        SET status = 'GENERATING',
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ? AND status IN ('DRAFT', 'FAILED', 'READY')
        RETURNING audio_url
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(previous_audio_url) = claimed else {
        tx.rollback().await?;
        let current = get_episode(pool, id).await?;
        let reason = match current.status {
            EpisodeStatus::Generating => "generation already in progress",
            EpisodeStatus::Published => "published episodes cannot be regenerated",
            _ => "episode cannot be generated in its current state",
        };
        return Err(DatabaseError::conflict(ENTITY, id, reason));
    };

    let sql = format!(
        r#"
        UPDATE podcast_episodes
        SET audio_url = NULL,
            audio_duration = NULL,
            audio_size = NULL,
            credits_used = NULL
        WHERE id = ?
        RETURNING {EPISODE_COLUMNS}
        "#
    );
    let episode = sqlx::query_as::<_, PodcastEpisode>(&sql)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(GenerationClaim {
        episode,
        previous_audio_url,
    })
}

/// Move a `GENERATING` episode to `READY` with its audio attached.
pub async fn complete_generation(
    pool: &SqlitePool,
    id: &str,
    audio: &GeneratedAudio,
) -> Result<PodcastEpisode> {
    let sql = format!(
        r#"
        UPDATE podcast_episodes
        SET status = 'READY',
            audio_url = ?,
            audio_duration = ?,
            audio_size = ?,
            credits_used = ?,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ? AND status = 'GENERATING'
        RETURNING {EPISODE_COLUMNS}
        "#
    );

    sqlx::query_as::<_, PodcastEpisode>(&sql)
        .bind(&audio.audio_url)
        .bind(audio.duration_secs)
        .bind(audio.size_bytes)
        .bind(audio.credits_used)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::conflict(ENTITY, id, "episode is not generating"))
}

/// Move a `GENERATING` episode to `FAILED`, clearing any audio reference.
///
/// The script is left untouched so the same input can be retried.
pub async fn fail_generation(pool: &SqlitePool, id: &str) -> Result<PodcastEpisode> {
    let sql = format!(
        r#"
        UPDATE podcast_episodes
        SET status = 'FAILED',
            audio_url = NULL,
            audio_duration = NULL,
            audio_size = NULL,
            credits_used = NULL,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ? AND status = 'GENERATING'
        RETURNING {EPISODE_COLUMNS}
        "#
    );

    sqlx::query_as::<_, PodcastEpisode>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::conflict(ENTITY, id, "episode is not generating"))
}

/// Publish a `READY` episode.
///
/// `published_at` is stamped on the first publish only; publishing again
/// merges the platform list.
pub async fn publish_episode(
    pool: &SqlitePool,
    id: &str,
    platforms: &[String],
) -> Result<PodcastEpisode> {
    let sql = format!(
        r#"
        UPDATE podcast_episodes
        SET status = 'PUBLISHED',
            published_at = COALESCE(published_at, strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            published_platforms = (
                SELECT json_group_array(value) FROM (
                    SELECT value FROM json_each(podcast_episodes.published_platforms)
                    UNION
                    SELECT value FROM json_each(?)
                )
            ),
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        WHERE id = ? AND status IN ('READY', 'PUBLISHED')
        RETURNING {EPISODE_COLUMNS}
        "#
    );

    let published = sqlx::query_as::<_, PodcastEpisode>(&sql)
        .bind(Json(platforms))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    match published {
        Some(episode) => Ok(episode),
        None => {
            let current = get_episode(pool, id).await?;
            Err(DatabaseError::conflict(
                ENTITY,
                id,
                format!("only READY episodes can be published (is {})", current.status.as_str()),
            ))
        }
    }
}

/// Delete an episode, returning the removed record so its audio can be cleaned up.
pub async fn delete_episode(pool: &SqlitePool, id: &str) -> Result<PodcastEpisode> {
    let sql = format!("DELETE FROM podcast_episodes WHERE id = ? RETURNING {EPISODE_COLUMNS}");

    sqlx::query_as::<_, PodcastEpisode>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found(ENTITY, id))
}

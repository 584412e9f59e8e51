//! Screenshot inbox for captures posted by the browser extension.
//!
//! Captures are queued per owner and handed out oldest first. Taking an item
//! deletes it in the same statement, so each capture is delivered at most once
//! even when several clients poll at the same time.

use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::Screenshot;
use crate::new_id;
use crate::validation::{validate_image_base64, validate_url};

/// Queue a capture for an owner.
pub async fn enqueue(
    pool: &SqlitePool,
    owner_id: &str,
    image_base64: &str,
    source_url: Option<&str>,
) -> Result<Screenshot> {
    validate_image_base64(image_base64)?;
    let source_url = source_url.map(str::trim).filter(|url| !url.is_empty());
    if let Some(url) = source_url {
        validate_url(url)?;
    }

    let screenshot = sqlx::query_as::<_, Screenshot>(
        r#"
        INSERT INTO screenshots (id, owner_id, image_base64, source_url)
        VALUES (?, ?, ?, ?)
        RETURNING id, owner_id, image_base64, source_url, created_at
        "#,
    )
    .bind(new_id())
    .bind(owner_id)
    .bind(image_base64)
    .bind(source_url)
    .fetch_one(pool)
    .await?;

    tracing::debug!(screenshot_id = %screenshot.id, owner = %owner_id, "Queued screenshot");
    Ok(screenshot)
}

/// Remove and return the owner's oldest capture, if any.
pub async fn take_next(pool: &SqlitePool, owner_id: &str) -> Result<Option<Screenshot>> {
    let screenshot = sqlx::query_as::<_, Screenshot>(
        r#"
        DELETE FROM screenshots
        WHERE id = (
            SELECT id FROM screenshots
            WHERE owner_id = ?
            ORDER BY created_at, rowid
            LIMIT 1
        )
        RETURNING id, owner_id, image_base64, source_url, created_at
        "#,
    )
    .bind(owner_id)
    .fetch_optional(pool)
    .await?;

    Ok(screenshot)
}

/// Number of captures waiting for an owner.
pub async fn pending_count(pool: &SqlitePool, owner_id: &str) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM screenshots WHERE owner_id = ?
        "#,
    )
    .bind(owner_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}

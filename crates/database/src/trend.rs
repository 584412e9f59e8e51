//! Trend storage with URL deduplication.

use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{NewTrend, Trend, TrendCategory};
use crate::new_id;
use crate::validation::{validate_title, validate_url};

const TREND_COLUMNS: &str =
    "id, title, description, url, source, category, heat_score, keywords, fetched_at";

/// Insert a trend unless its URL is already stored.
///
/// Returns `Some(trend)` for a new row and `None` when the URL existed. An
/// existing row is never modified, so its heat score stays what it was.
pub async fn insert_if_absent(pool: &SqlitePool, trend: &NewTrend) -> Result<Option<Trend>> {
    validate_title(&trend.title)?;
    validate_url(&trend.url)?;

    let sql = format!(
        r#"
        INSERT INTO trends (id, title, description, url, source, category, heat_score, keywords)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT (url) DO NOTHING
        RETURNING {TREND_COLUMNS}
        "#
    );

    let inserted = sqlx::query_as::<_, Trend>(&sql)
        .bind(new_id())
        .bind(trend.title.trim())
        .bind(&trend.description)
        .bind(trend.url.trim())
        .bind(&trend.source)
        .bind(trend.category)
        .bind(trend.heat_score)
        .bind(Json(&trend.keywords))
        .fetch_optional(pool)
        .await?;

    Ok(inserted)
}

/// Get a trend by ID.
pub async fn get_trend(pool: &SqlitePool, id: &str) -> Result<Trend> {
    let sql = format!("SELECT {TREND_COLUMNS} FROM trends WHERE id = ?");

    sqlx::query_as::<_, Trend>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Trend", id))
}

/// List trends, hottest and freshest first.
pub async fn list_trends(
    pool: &SqlitePool,
    category: Option<TrendCategory>,
    limit: i64,
) -> Result<Vec<Trend>> {
    let sql = format!(
        r#"
        SELECT {TREND_COLUMNS}
        FROM trends
        WHERE (?1 IS NULL OR category = ?1)
        ORDER BY heat_score DESC, fetched_at DESC
        LIMIT ?2
        "#
    );

    let trends = sqlx::query_as::<_, Trend>(&sql)
        .bind(category)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(trends)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_db;

    fn trend(url: &str, heat: i64) -> NewTrend {
        NewTrend {
            title: "Nuevo modelo de video".to_string(),
            description: Some("Resumen".to_string()),
            url: url.to_string(),
            source: "example.com".to_string(),
            category: TrendCategory::VideoGeneration,
            heat_score: heat,
            keywords: vec!["video".to_string(), "ia".to_string()],
        }
    }

    #[tokio::test]
    async fn test_duplicate_url_is_skipped_and_score_unchanged() {
        let db = test_db().await;
        let pool = db.pool();

        let first = insert_if_absent(pool, &trend("https://example.com/a", 100))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.heat_score, 100);
        assert_eq!(first.keywords.0, vec!["video", "ia"]);

        let second = insert_if_absent(pool, &trend("https://example.com/a", 25))
            .await
            .unwrap();
        assert!(second.is_none());

        let stored = list_trends(pool, None, 100).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, first.id);
        assert_eq!(stored[0].heat_score, 100);
    }

    #[tokio::test]
    async fn test_invalid_trend_is_rejected() {
        let db = test_db().await;
        let result = insert_if_absent(db.pool(), &trend("not a url", 50)).await;
        assert!(matches!(result, Err(DatabaseError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_list_trends_orders_by_heat() {
        let db = test_db().await;
        let pool = db.pool();
        insert_if_absent(pool, &trend("https://example.com/cold", 25))
            .await
            .unwrap();
        insert_if_absent(pool, &trend("https://example.com/hot", 100))
            .await
            .unwrap();
        let mut other = trend("https://example.com/tools", 75);
        other.category = TrendCategory::AiTools;
        insert_if_absent(pool, &other).await.unwrap();

        let all = list_trends(pool, None, 10).await.unwrap();
        let scores: Vec<i64> = all.iter().map(|t| t.heat_score).collect();
        assert_eq!(scores, vec![100, 75, 25]);

        let video = list_trends(pool, Some(TrendCategory::VideoGeneration), 10)
            .await
            .unwrap();
        assert_eq!(video.len(), 2);

        let limited = list_trends(pool, None, 1).await.unwrap();
        assert_eq!(limited[0].url, "https://example.com/hot");
    }
}

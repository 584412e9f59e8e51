//! Trend ingestion and heat scoring.
//!
//! Heat comes only from how recent the search window was that surfaced an
//! item; it is fixed at insert time. Items are keyed by URL, so re-ingesting
//! an overlapping batch adds nothing and changes nothing.

use database::validation::validate_url;
use database::{trend, Database, DatabaseError, NewTrend, Trend, TrendCategory};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{Result, StudioError};

/// Upper bound on trends returned by one listing.
pub const MAX_LIST_LIMIT: i64 = 100;

/// Search window an item was found in. Tighter windows score higher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FreshnessWindow {
    Day,
    #[default]
    Week,
    Month,
    Year,
}

impl FreshnessWindow {
    pub fn heat_score(&self) -> i64 {
        match self {
            FreshnessWindow::Day => 100,
            FreshnessWindow::Week => 75,
            FreshnessWindow::Month => 50,
            FreshnessWindow::Year => 25,
        }
    }
}

/// A fetched item offered for ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendItem {
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    #[serde(default = "default_category")]
    pub category: TrendCategory,
    #[serde(default)]
    pub freshness: FreshnessWindow,
    #[serde(default)]
    pub keywords: Vec<String>,
}

fn default_category() -> TrendCategory {
    TrendCategory::General
}

/// Counts from one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub inserted: usize,
    /// URL already stored.
    pub skipped: usize,
    /// Malformed title or URL.
    pub rejected: usize,
}

/// Trend operations.
pub struct TrendService<'a> {
    db: &'a Database,
}

impl<'a> TrendService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert new items; existing URLs and malformed items are counted, not fatal.
    pub async fn ingest(&self, items: &[TrendItem]) -> Result<IngestReport> {
        let mut report = IngestReport::default();

        for item in items {
            let Some(new_trend) = prepare(item) else {
                report.rejected += 1;
                continue;
            };

            match trend::insert_if_absent(self.db.pool(), &new_trend).await {
                Ok(Some(inserted)) => {
                    debug!(trend_id = %inserted.id, url = %inserted.url, "Ingested trend");
                    report.inserted += 1;
                }
                Ok(None) => report.skipped += 1,
                Err(DatabaseError::InvalidInput(reason)) => {
                    warn!(url = %item.url, "Rejected trend: {}", reason);
                    report.rejected += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!(
            inserted = report.inserted,
            skipped = report.skipped,
            rejected = report.rejected,
            "Trend ingestion finished"
        );
        Ok(report)
    }

    /// Hottest trends first, optionally within one category.
    pub async fn list(&self, category: Option<TrendCategory>, limit: i64) -> Result<Vec<Trend>> {
        if limit < 1 {
            return Err(StudioError::InvalidInput(
                "limit must be at least 1".to_string(),
            ));
        }
        Ok(trend::list_trends(self.db.pool(), category, limit.min(MAX_LIST_LIMIT)).await?)
    }

    pub async fn get(&self, id: &str) -> Result<Trend> {
        Ok(trend::get_trend(self.db.pool(), id).await?)
    }
}

fn prepare(item: &TrendItem) -> Option<NewTrend> {
    let url = item.url.trim();
    if let Err(e) = validate_url(url) {
        warn!(url = %item.url, "Rejected trend: {}", e);
        return None;
    }
    let source = source_host(url)?;

    Some(NewTrend {
        title: item.title.trim().to_string(),
        description: item
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
        url: url.to_string(),
        source,
        category: item.category,
        heat_score: item.freshness.heat_score(),
        keywords: normalize_keywords(&item.keywords),
    })
}

/// Hostname without a leading `www.`.
pub fn source_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_lowercase())
}

fn normalize_keywords(keywords: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::new();
    for keyword in keywords {
        let keyword = keyword.trim().to_lowercase();
        if !keyword.is_empty() && !normalized.contains(&keyword) {
            normalized.push(keyword);
        }
    }
    normalized
}

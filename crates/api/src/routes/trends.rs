//! Trend routes.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::Json;
use database::{Trend, TrendCategory};
use serde::Deserialize;
use studio::{IngestReport, TrendItem};

use crate::auth::Authenticated;
use crate::error::Result;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct TrendQuery {
    pub category: Option<TrendCategory>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub items: Vec<TrendItem>,
}

pub async fn list_trends(
    State(state): State<AppState>,
    _auth: Authenticated,
    query: std::result::Result<Query<TrendQuery>, QueryRejection>,
) -> Result<Json<Vec<Trend>>> {
    let Query(query) = query?;
    let trends = state
        .ctx
        .trends()
        .list(query.category, query.limit.unwrap_or(DEFAULT_LIMIT))
        .await?;
    Ok(Json(trends))
}

/// Ingest already-fetched items. Known URLs are skipped untouched.
pub async fn ingest_trends(
    State(state): State<AppState>,
    _auth: Authenticated,
    payload: std::result::Result<Json<IngestRequest>, JsonRejection>,
) -> Result<Json<IngestReport>> {
    let Json(request) = payload?;
    Ok(Json(state.ctx.trends().ingest(&request.items).await?))
}

//! Screenshot inbox routes for the browser extension.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use studio::NewScreenshot;

use crate::auth::Authenticated;
use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Queued {
    pub id: String,
    pub created_at: String,
}

pub async fn enqueue(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    payload: std::result::Result<Json<NewScreenshot>, JsonRejection>,
) -> Result<(StatusCode, Json<Queued>)> {
    let Json(capture) = payload?;
    let queued = state.ctx.screenshots().enqueue(&principal, &capture).await?;
    Ok((
        StatusCode::CREATED,
        Json(Queued {
            id: queued.id,
            created_at: queued.created_at,
        }),
    ))
}

/// Oldest pending screenshot, or 204 when the inbox is empty.
pub async fn take_next(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
) -> Result<Response> {
    match state.ctx.screenshots().take_next(&principal).await? {
        Some(screenshot) => Ok(Json(screenshot).into_response()),
        None => Ok(StatusCode::NO_CONTENT.into_response()),
    }
}

//! Podcast routes: episodes, config, voices and credits.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::{EpisodeChanges, EpisodeStatus, NewEpisode, PodcastConfig, PodcastEpisode};
use serde::{Deserialize, Serialize};
use speech_core::{CreditBalance, Voice};
use studio::{
    estimate, quota_status, remaining_credits, CreditEstimate, PreviewRequest, QuotaStatus,
};
use tracing::info;

use crate::auth::Authenticated;
use crate::error::Result;
use crate::state::AppState;

const AUDIO_MPEG: &str = "audio/mpeg";

#[derive(Debug, Deserialize)]
pub struct EpisodeQuery {
    pub status: Option<EpisodeStatus>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PublishRequest {
    #[serde(default)]
    pub platforms: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct EstimateRequest {
    pub text: String,
    /// Also compare against the provider's remaining credits.
    #[serde(default)]
    pub check_quota: bool,
}

#[derive(Debug, Serialize)]
pub struct EstimateResponse {
    #[serde(flatten)]
    pub estimate: CreditEstimate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quota: Option<QuotaStatus>,
}

pub async fn list_episodes(
    State(state): State<AppState>,
    _auth: Authenticated,
    query: std::result::Result<Query<EpisodeQuery>, QueryRejection>,
) -> Result<Json<Vec<PodcastEpisode>>> {
    let Query(query) = query?;
    Ok(Json(state.ctx.episodes().list(query.status).await?))
}

pub async fn create_episode(
    State(state): State<AppState>,
    _auth: Authenticated,
    payload: std::result::Result<Json<NewEpisode>, JsonRejection>,
) -> Result<(StatusCode, Json<PodcastEpisode>)> {
    let Json(request) = payload?;
    let episode = state.ctx.episodes().create(request).await?;
    Ok((StatusCode::CREATED, Json(episode)))
}

pub async fn get_episode(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<PodcastEpisode>> {
    Ok(Json(state.ctx.episodes().get(&id).await?))
}

pub async fn update_episode(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id): Path<String>,
    payload: std::result::Result<Json<EpisodeChanges>, JsonRejection>,
) -> Result<Json<PodcastEpisode>> {
    let Json(changes) = payload?;
    Ok(Json(state.ctx.episodes().update(&id, &changes).await?))
}

pub async fn delete_episode(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.ctx.episodes().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Generate audio. Runs to completion inside the request.
pub async fn generate_episode(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
) -> Result<Json<PodcastEpisode>> {
    info!(episode_id = %id, requested_by = %principal.user_id(), "Generate requested");
    Ok(Json(state.ctx.episodes().generate(&id).await?))
}

pub async fn publish_episode(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id): Path<String>,
    payload: Option<Json<PublishRequest>>,
) -> Result<Json<PodcastEpisode>> {
    let request = payload.map(|Json(request)| request).unwrap_or_default();
    Ok(Json(
        state.ctx.episodes().publish(&id, &request.platforms).await?,
    ))
}

/// Tagged MP3 as an attachment.
pub async fn download_episode(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Response> {
    let download = state.ctx.episodes().download(&id).await?;
    let disposition = format!("attachment; filename=\"{}\"", download.filename);

    Ok((
        [
            (CONTENT_TYPE, AUDIO_MPEG.to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        download.bytes,
    )
        .into_response())
}

pub async fn get_config(
    State(state): State<AppState>,
    _auth: Authenticated,
) -> Result<Json<PodcastConfig>> {
    Ok(Json(state.ctx.episodes().config().await?))
}

pub async fn put_config(
    State(state): State<AppState>,
    _auth: Authenticated,
    payload: std::result::Result<Json<PodcastConfig>, JsonRejection>,
) -> Result<Json<PodcastConfig>> {
    let Json(config) = payload?;
    Ok(Json(state.ctx.episodes().update_config(&config).await?))
}

/// Spanish voices offered by the provider.
pub async fn list_voices(
    State(state): State<AppState>,
    _auth: Authenticated,
) -> Result<Json<Vec<Voice>>> {
    Ok(Json(state.ctx.episodes().voices().await?))
}

pub async fn preview_voice(
    State(state): State<AppState>,
    _auth: Authenticated,
    payload: std::result::Result<Json<PreviewRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) = payload?;
    let audio = state.ctx.episodes().preview(&request).await?;
    Ok(([(CONTENT_TYPE, AUDIO_MPEG)], audio).into_response())
}

pub async fn get_credits(
    State(state): State<AppState>,
    _auth: Authenticated,
) -> Result<Json<CreditBalance>> {
    Ok(Json(remaining_credits(state.ctx.speech()).await?))
}

pub async fn estimate_cost(
    State(state): State<AppState>,
    _auth: Authenticated,
    payload: std::result::Result<Json<EstimateRequest>, JsonRejection>,
) -> Result<Json<EstimateResponse>> {
    let Json(request) = payload?;
    let quota = if request.check_quota {
        Some(quota_status(state.ctx.speech(), &request.text).await?)
    } else {
        None
    };

    Ok(Json(EstimateResponse {
        estimate: estimate(&request.text),
        quota,
    }))
}

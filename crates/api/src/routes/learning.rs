//! Learning module routes.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use database::{LearningModule, LearningUnit, ModuleStatus, ModuleWithUnits};
use serde::Deserialize;
use studio::{ManualModule, StartModule, StartedModule};

use crate::auth::Authenticated;
use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ModuleQuery {
    pub status: Option<ModuleStatus>,
}

#[derive(Debug, Deserialize)]
pub struct AddUnitsRequest {
    pub titles: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct UnitCompletionRequest {
    pub completed: bool,
}

pub async fn list_modules(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    query: std::result::Result<Query<ModuleQuery>, QueryRejection>,
) -> Result<Json<Vec<LearningModule>>> {
    let Query(query) = query?;
    let modules = state
        .ctx
        .learning()
        .list_modules(&principal, query.status)
        .await?;
    Ok(Json(modules))
}

/// Start a module, reusing an active one with a similar topic.
///
/// 201 when a module was created, 200 when an existing one was reused.
pub async fn start_module(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    payload: std::result::Result<Json<StartModule>, JsonRejection>,
) -> Result<(StatusCode, Json<StartedModule>)> {
    let Json(request) = payload?;
    let started = state.ctx.learning().start_module(&principal, &request).await?;
    let status = if started.reused {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(started)))
}

pub async fn create_manual_module(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    payload: std::result::Result<Json<ManualModule>, JsonRejection>,
) -> Result<(StatusCode, Json<ModuleWithUnits>)> {
    let Json(request) = payload?;
    let module = state
        .ctx
        .learning()
        .create_manual_module(&principal, &request)
        .await?;
    Ok((StatusCode::CREATED, Json(module)))
}

pub async fn get_module(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
) -> Result<Json<ModuleWithUnits>> {
    let module = state.ctx.learning().get_module(&principal, &id).await?;
    Ok(Json(module))
}

pub async fn delete_module(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.ctx.learning().delete_module(&principal, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_units(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
    payload: std::result::Result<Json<AddUnitsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<LearningUnit>>)> {
    let Json(request) = payload?;
    let units = state
        .ctx
        .learning()
        .add_units(&principal, &id, &request.titles)
        .await?;
    Ok((StatusCode::CREATED, Json(units)))
}

/// Mark a unit complete or incomplete; returns the module with new progress.
pub async fn set_unit_completion(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(id): Path<String>,
    payload: std::result::Result<Json<UnitCompletionRequest>, JsonRejection>,
) -> Result<Json<ModuleWithUnits>> {
    let Json(request) = payload?;
    let module = state
        .ctx
        .learning()
        .set_unit_completion(&principal, &id, request.completed)
        .await?;
    Ok(Json(module))
}

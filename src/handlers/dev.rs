use std::sync::Arc;

use axum::{Json, extract::State};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::errors::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateRequest {
    #[serde(default)]
    pub command: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RollbackRequest {
    #[serde(default)]
    pub filename: Option<String>,
}

/// Apply a model-generated patch to the artifact
///
/// Authenticated by the `x-api-key` middleware on the `/dev` router. The
/// handler backs up the current artifact, asks the completion API for a
/// rewritten version, verifies it, overwrites the artifact, records an
/// audit line, and fires the deploy hook. Any failure after the overwrite
/// still surfaces as a 500 even though the artifact has already changed.
pub async fn update_code(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UpdateRequest>,
) -> AppResult<Json<Value>> {
    let command = body
        .command
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing command input.".to_string()))?;

    info!(command_len = command.len(), "artifact update requested");

    let outcome = state.updater.apply_update(command).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Code updated and redeployed.",
        "backup": outcome.backup,
    })))
}

/// Restore a named backup and re-trigger deployment
pub async fn rollback(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RollbackRequest>,
) -> AppResult<Json<Value>> {
    let filename = body
        .filename
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing backup filename.".to_string()))?;

    info!(%filename, "artifact rollback requested");

    state.updater.rollback(filename).await?;

    Ok(Json(json!({
        "success": true,
        "message": "Rollback applied and redeployed.",
        "restored_from": filename,
    })))
}

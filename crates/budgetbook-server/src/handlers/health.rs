//! Health check handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::{AppError, AppState};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub sqlite_version: String,
}

/// GET /api/health - Confirm the database is reachable
pub async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, AppError> {
    let sqlite_version = state.db.sqlite_version()?;
    Ok(Json(HealthResponse {
        status: "ok",
        sqlite_version,
    }))
}

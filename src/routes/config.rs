// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential configuration routes.

use crate::error::{AppError, Result};
use crate::models::CredentialRecord;
use crate::routes::MessageResponse;
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/config/credentials",
            post(save_credentials)
                .get(get_credentials)
                .delete(clear_credentials),
        )
        .route("/api/config/status", get(get_status))
}

/// Configuration status.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/generated/")
)]
pub struct StatusResponse {
    pub is_configured: bool,
    /// RFC3339, `null` when not configured
    pub last_updated: Option<String>,
}

/// Replace the stored credentials.
async fn save_credentials(
    State(state): State<Arc<AppState>>,
    Json(credentials): Json<CredentialRecord>,
) -> Result<Json<MessageResponse>> {
    credentials
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    state.credentials.save(&credentials)?;
    Ok(MessageResponse::new("Credentials saved successfully"))
}

async fn get_credentials(State(state): State<Arc<AppState>>) -> Result<Json<CredentialRecord>> {
    let credentials = state
        .credentials
        .get()
        .ok_or_else(|| AppError::NotFound("No credentials found".to_string()))?;
    Ok(Json(credentials))
}

async fn get_status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    // One read so both fields describe the same file contents.
    let stored = state.credentials.lookup().into_stored();

    Json(StatusResponse {
        is_configured: stored.is_some(),
        last_updated: stored.map(|s| format_utc_rfc3339(s.last_updated)),
    })
}

async fn clear_credentials(State(state): State<Arc<AppState>>) -> Result<Json<MessageResponse>> {
    state.credentials.clear()?;
    Ok(MessageResponse::new("Credentials cleared successfully"))
}

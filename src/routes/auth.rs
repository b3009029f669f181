// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! LinkedIn OAuth routes.

use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::CredentialRecord;
use crate::routes::MessageResponse;
use crate::services::oauth_state::{sign_state, verify_state};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/login", get(login))
        .route("/api/auth/callback", get(callback))
}

/// Client credentials to authenticate with: the stored record, or the
/// environment bootstrap when nothing has been stored yet.
fn client_credentials(state: &AppState) -> Option<CredentialRecord> {
    state
        .credentials
        .get()
        .or_else(|| state.config.bootstrap_credentials())
}

/// Start OAuth flow - redirect to LinkedIn authorization.
async fn login(State(state): State<Arc<AppState>>) -> Result<Redirect> {
    let client_id = state
        .credentials
        .get()
        .map(|c| c.client_id)
        .or_else(|| state.config.linkedin_client_id.clone())
        .ok_or_else(|| {
            AppError::BadRequest("LinkedIn client credentials not configured".to_string())
        })?;

    let oauth_state = sign_state(&state.oauth_state_key, Utc::now())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;

    let auth_url = state.linkedin.authorization_url(
        &client_id,
        &state.config.linkedin_redirect_uri,
        &state.config.linkedin_scopes,
        &oauth_state,
    );

    tracing::info!(client_id = %client_id, "Starting OAuth flow, redirecting to LinkedIn");
    Ok(Redirect::temporary(&auth_url))
}

#[derive(Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// OAuth callback - exchange the code and store the access token.
async fn callback(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CallbackParams>,
) -> Result<Json<MessageResponse>> {
    if let Some(error) = params.error {
        tracing::warn!(error = %error, "OAuth error from LinkedIn");
        let message = match params.error_description {
            Some(description) => format!("{}: {}", error, description),
            None => error,
        };
        return Err(AppError::Authentication(message));
    }

    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("No authorization code provided".to_string()))?;

    let oauth_state = params
        .state
        .ok_or_else(|| AppError::Authentication("Missing OAuth state".to_string()))?;
    verify_state(&state.oauth_state_key, &oauth_state, Utc::now()).map_err(|e| {
        tracing::warn!(error = %e, "Rejected OAuth callback");
        AppError::Authentication(e.to_string())
    })?;

    let mut credentials = client_credentials(&state).ok_or_else(|| {
        AppError::BadRequest("LinkedIn client credentials not configured".to_string())
    })?;

    tracing::info!("Exchanging authorization code for access token");
    let token = state
        .linkedin
        .exchange_code(
            &credentials.client_id,
            &credentials.client_secret,
            &code,
            &state.config.linkedin_redirect_uri,
        )
        .await?;

    credentials.access_token = Some(token.access_token);
    state.credentials.save(&credentials)?;

    tracing::info!(
        expires_in = ?token.expires_in,
        "OAuth successful, access token stored"
    );
    Ok(MessageResponse::new("Successfully authenticated with LinkedIn"))
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credentials gate for routes that may call LinkedIn.

use crate::error::AppError;
use crate::storage::CredentialState;
use crate::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Middleware that rejects requests with 401 unless usable credentials are
/// stored, and hands the decrypted record to the handler as an extension.
///
/// Corrupted credentials are rejected exactly like missing ones.
pub async fn require_credentials(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let credentials = match state.credentials.lookup() {
        CredentialState::Present(stored) => stored.credentials,
        CredentialState::Missing => {
            tracing::debug!("Rejecting request: credentials not configured");
            return Err(AppError::Unauthorized);
        }
        CredentialState::Corrupted(_) => {
            tracing::warn!("Rejecting request: stored credentials unreadable");
            return Err(AppError::Unauthorized);
        }
    };

    request.extensions_mut().insert(credentials);
    Ok(next.run(request).await)
}

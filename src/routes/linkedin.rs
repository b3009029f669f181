// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! LinkedIn data routes, served through the cache.
//!
//! `require_credentials` is applied in routes/mod.rs, so every handler here
//! receives the decrypted credentials as an extension.

use crate::error::Result;
use crate::models::{CredentialRecord, Post, Profile};
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/linkedin/profile", get(get_profile))
        .route("/api/linkedin/posts", get(get_posts))
        .route("/api/linkedin/articles", get(get_articles))
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(credentials): Extension<CredentialRecord>,
) -> Result<Json<Profile>> {
    Ok(Json(state.fetcher.get_profile(&credentials).await?))
}

async fn get_posts(
    State(state): State<Arc<AppState>>,
    Extension(credentials): Extension<CredentialRecord>,
) -> Result<Json<Vec<Post>>> {
    Ok(Json(state.fetcher.get_posts(&credentials).await?))
}

async fn get_articles(
    State(state): State<Arc<AppState>>,
    Extension(credentials): Extension<CredentialRecord>,
) -> Result<Json<Vec<Post>>> {
    Ok(Json(state.fetcher.get_articles(&credentials).await?))
}

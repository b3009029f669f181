// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! LinkedIn Data API Server
//!
//! Serves a member's LinkedIn profile, posts and articles from a local cache
//! backed by an encrypted credential store.

use linkedin_data_api::{config::Config, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        config_dir = %config.config_dir.display(),
        data_dir = %config.data_dir.display(),
        cache_window_hours = config.cache_window_hours,
        "Starting LinkedIn Data API"
    );

    // Key material and stores; failure here is fatal
    let state = AppState::initialize(config.clone()).map_err(|e| {
        tracing::error!(error = %e, "Failed to initialize storage");
        e
    })?;
    tracing::info!(
        configured = state.credentials.get().is_some(),
        "Credential store ready"
    );

    // Build router
    let app = linkedin_data_api::routes::create_router(Arc::new(state));

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive("linkedin_data_api=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}

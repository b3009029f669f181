// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! LinkedIn Data API: serve a member's LinkedIn profile and activity
//!
//! This crate provides the backend API that stores LinkedIn app credentials
//! encrypted at rest, runs the OAuth login, and serves profile/posts/articles
//! from a file cache that is refreshed at most once per cache window.

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod storage;
pub mod time_utils;

use config::Config;
use services::{DataFetcher, LinkedInClient};
use storage::{CacheStore, CredentialStore, KeyManager};

/// HKDF info for the OAuth `state` signing key.
const OAUTH_STATE_KEY_INFO: &[u8] = b"oauth-state";

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub credentials: CredentialStore,
    pub cache: CacheStore,
    pub fetcher: DataFetcher,
    pub linkedin: LinkedInClient,
    /// HMAC key for the OAuth `state` parameter
    pub oauth_state_key: [u8; 32],
}

impl AppState {
    /// Load (or create) the encryption key and open the stores under the
    /// configured directories.
    pub fn initialize(config: Config) -> anyhow::Result<Self> {
        let key = KeyManager::new(&config.config_dir).get_or_create_key()?;
        let oauth_state_key = key.derive_subkey(OAUTH_STATE_KEY_INFO)?;

        let credentials = CredentialStore::open(&config.config_dir, &key)?;
        let cache = CacheStore::open(&config.data_dir)?;
        let linkedin = LinkedInClient::new(
            config.linkedin_api_base_url.clone(),
            config.linkedin_oauth_base_url.clone(),
        )?;
        let fetcher = DataFetcher::new(cache.clone(), linkedin.clone(), config.cache_window());

        Ok(Self {
            config,
            credentials,
            cache,
            fetcher,
            linkedin,
            oauth_state_key,
        })
    }
}

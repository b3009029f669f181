// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cache-aware data fetching.
//!
//! For every request the fetcher decides per [`DataKind`] whether the cached
//! document is still inside the cache window. Fresh documents are returned as
//! is; stale or missing ones are refetched from LinkedIn and written through
//! to the cache. The cache is only written after a complete, successful
//! fetch, so an upstream failure (or an aborted request) leaves the previous
//! document untouched.

use crate::error::AppError;
use crate::models::{CredentialRecord, Post, Profile};
use crate::services::linkedin::LinkedInClient;
use crate::storage::{CacheStore, DataKind};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Cache state of one data kind at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
}

impl Freshness {
    /// `Fresh` iff the document exists and `now - last_updated < window`.
    ///
    /// Timestamps in the future (clock moved backwards) count as stale.
    pub fn evaluate(
        last_updated: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Self {
        match last_updated {
            Some(ts) if ts <= now && now - ts < window => Freshness::Fresh,
            _ => Freshness::Stale,
        }
    }
}

/// Serves LinkedIn data from the cache, refreshing it when stale.
#[derive(Clone)]
pub struct DataFetcher {
    cache: CacheStore,
    client: LinkedInClient,
    window: Duration,
    /// Per-kind locks so concurrent stale requests trigger a single refresh
    refresh_locks: Arc<DashMap<DataKind, Arc<Mutex<()>>>>,
}

impl DataFetcher {
    pub fn new(cache: CacheStore, client: LinkedInClient, window: Duration) -> Self {
        Self {
            cache,
            client,
            window,
            refresh_locks: Arc::new(DashMap::new()),
        }
    }

    /// Current freshness of `kind`.
    pub fn freshness(&self, kind: DataKind) -> Freshness {
        Freshness::evaluate(self.cache.last_updated(kind), Utc::now(), self.window)
    }

    pub async fn get_profile(&self, credentials: &CredentialRecord) -> Result<Profile, AppError> {
        let client = &self.client;
        self.get_or_refresh(DataKind::Profile, credentials, move |token| async move {
            client.get_profile(&token).await
        })
        .await
    }

    pub async fn get_posts(&self, credentials: &CredentialRecord) -> Result<Vec<Post>, AppError> {
        let client = &self.client;
        self.get_or_refresh(DataKind::Posts, credentials, move |token| async move {
            client.get_posts(&token).await
        })
        .await
    }

    pub async fn get_articles(
        &self,
        credentials: &CredentialRecord,
    ) -> Result<Vec<Post>, AppError> {
        let client = &self.client;
        self.get_or_refresh(DataKind::Articles, credentials, move |token| async move {
            client.get_articles(&token).await
        })
        .await
    }

    /// Return the cached payload for `kind` if fresh, otherwise run `fetch`
    /// with the access token and cache its result.
    async fn get_or_refresh<T, F, Fut>(
        &self,
        kind: DataKind,
        credentials: &CredentialRecord,
        fetch: F,
    ) -> Result<T, AppError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        if let Some(data) = self.fresh_cached(kind) {
            tracing::debug!(kind = %kind, "Cache hit");
            return Ok(data);
        }

        let lock = self
            .refresh_locks
            .entry(kind)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Another request may have refreshed while we waited.
        if let Some(data) = self.fresh_cached(kind) {
            tracing::debug!(kind = %kind, "Cache refreshed by concurrent request");
            return Ok(data);
        }

        let token = credentials
            .bearer_token()
            .ok_or(AppError::MissingAccessToken)?
            .to_string();

        tracing::info!(kind = %kind, "Cache stale, fetching from LinkedIn");
        let data = fetch(token).await.map_err(|e| {
            tracing::warn!(kind = %kind, error = %e, "Refresh failed, cache left untouched");
            e
        })?;
        let fetched_at = Utc::now();

        self.cache.save_at(kind, &data, fetched_at)?;
        tracing::info!(kind = %kind, "Cache refreshed");
        Ok(data)
    }

    fn fresh_cached<T: DeserializeOwned>(&self, kind: DataKind) -> Option<T> {
        let record = self.cache.read::<T>(kind)?;
        match Freshness::evaluate(Some(record.last_updated), Utc::now(), self.window) {
            Freshness::Fresh => Some(record.data),
            Freshness::Stale => None,
        }
    }
}

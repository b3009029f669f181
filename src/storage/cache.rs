// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! On-disk cache of fetched LinkedIn data.
//!
//! Each [`DataKind`] has its own pretty-printed JSON document holding the
//! payload together with the time it was fetched:
//!
//! ```json
//! { "last_updated": "2026-01-01T12:00:00Z", "data": { ... } }
//! ```

use super::fs::{read_optional, write_atomic};
use super::StorageError;
use chrono::{DateTime, Utc};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The kinds of data cached, one document each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    Profile,
    Posts,
    Articles,
}

impl DataKind {
    pub const ALL: [DataKind; 3] = [DataKind::Profile, DataKind::Posts, DataKind::Articles];

    pub fn as_str(self) -> &'static str {
        match self {
            DataKind::Profile => "profile",
            DataKind::Posts => "posts",
            DataKind::Articles => "articles",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            DataKind::Profile => "profile.json",
            DataKind::Posts => "posts.json",
            DataKind::Articles => "articles.json",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    last_updated: DateTime<Utc>,
    data: &'a T,
}

#[derive(Deserialize)]
struct Envelope<T> {
    last_updated: DateTime<Utc>,
    data: T,
}

/// A cached payload and the moment it was fetched from upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedRecord<T> {
    pub data: T,
    pub last_updated: DateTime<Utc>,
}

struct CacheFile {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CacheFile {
    fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// File-backed cache with one document per [`DataKind`].
#[derive(Clone)]
pub struct CacheStore {
    files: Arc<HashMap<DataKind, CacheFile>>,
}

impl CacheStore {
    /// Open the cache rooted at `data_dir`, creating the directory if needed.
    pub fn open(data_dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(data_dir).map_err(|e| StorageError::io(data_dir, e))?;

        let files = DataKind::ALL
            .into_iter()
            .map(|kind| {
                let file = CacheFile {
                    path: data_dir.join(kind.file_name()),
                    lock: Mutex::new(()),
                };
                (kind, file)
            })
            .collect();

        Ok(Self {
            files: Arc::new(files),
        })
    }

    /// Path of the document for `kind`.
    pub fn path(&self, kind: DataKind) -> &Path {
        &self.file(kind).path
    }

    /// Store `payload` stamped with the current time.
    pub fn save<T: Serialize>(
        &self,
        kind: DataKind,
        payload: &T,
    ) -> Result<DateTime<Utc>, StorageError> {
        let now = Utc::now();
        self.save_at(kind, payload, now)?;
        Ok(now)
    }

    /// Store `payload` stamped with `fetched_at`, overwriting the previous document.
    pub fn save_at<T: Serialize>(
        &self,
        kind: DataKind,
        payload: &T,
        fetched_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let document = serde_json::to_vec_pretty(&EnvelopeRef {
            last_updated: fetched_at,
            data: payload,
        })?;

        let file = self.file(kind);
        let _guard = file.lock();
        write_atomic(&file.path, &document, false)?;

        tracing::debug!(kind = %kind, last_updated = %fetched_at, "Cache document written");
        Ok(())
    }

    /// Payload and timestamp, or `None` if the document is missing or unparsable.
    pub fn read<T: DeserializeOwned>(&self, kind: DataKind) -> Option<CachedRecord<T>> {
        let file = self.file(kind);
        let raw = {
            let _guard = file.lock();
            read_optional(&file.path)
        };

        let raw = match raw {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(kind = %kind, error = %e, "Cache document unreadable");
                return None;
            }
        };

        match serde_json::from_slice::<Envelope<T>>(&raw) {
            Ok(envelope) => Some(CachedRecord {
                data: envelope.data,
                last_updated: envelope.last_updated,
            }),
            Err(e) => {
                tracing::warn!(kind = %kind, error = %e, "Cache document unparsable, ignoring");
                None
            }
        }
    }

    /// Cached payload without its timestamp.
    pub fn get<T: DeserializeOwned>(&self, kind: DataKind) -> Option<T> {
        self.read(kind).map(|record| record.data)
    }

    pub fn last_updated(&self, kind: DataKind) -> Option<DateTime<Utc>> {
        self.read::<IgnoredAny>(kind).map(|record| record.last_updated)
    }

    fn file(&self, kind: DataKind) -> &CacheFile {
        // Every kind is inserted in `open`.
        &self.files[&kind]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Post, PostType};
    use chrono::Duration;
    use tempfile::TempDir;

    fn sample_posts() -> Vec<Post> {
        vec![Post {
            id: "urn:li:share:1".to_string(),
            text: "Hello".to_string(),
            created_time: DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            likes_count: Some(3),
            comments_count: None,
            shares_count: Some(0),
            url: None,
            post_type: PostType::Post,
        }]
    }

    #[test]
    fn test_save_then_get_and_last_updated() {
        let dir = TempDir::new().unwrap();
        let cache = CacheStore::open(dir.path()).unwrap();

        let before = Utc::now();
        cache.save(DataKind::Posts, &sample_posts()).unwrap();

        let last_updated = cache.last_updated(DataKind::Posts).unwrap();
        assert!(last_updated >= before);
        assert!(Utc::now() - last_updated < Duration::seconds(5));
        assert_eq!(cache.get::<Vec<Post>>(DataKind::Posts), Some(sample_posts()));
    }

    #[test]
    fn test_save_at_keeps_fetch_time() {
        let dir = TempDir::new().unwrap();
        let cache = CacheStore::open(dir.path()).unwrap();
        let fetched_at = Utc::now() - Duration::hours(3);

        cache
            .save_at(DataKind::Articles, &Vec::<Post>::new(), fetched_at)
            .unwrap();

        let record = cache.read::<Vec<Post>>(DataKind::Articles).unwrap();
        assert_eq!(record.last_updated, fetched_at);
        assert!(record.data.is_empty());
    }

    #[test]
    fn test_kinds_are_independent_files() {
        let dir = TempDir::new().unwrap();
        let cache = CacheStore::open(dir.path()).unwrap();
        cache.save(DataKind::Posts, &sample_posts()).unwrap();

        assert!(cache.path(DataKind::Posts).ends_with("posts.json"));
        assert!(!cache.path(DataKind::Profile).exists());
        assert!(cache.get::<serde_json::Value>(DataKind::Articles).is_none());
        assert!(cache.last_updated(DataKind::Profile).is_none());
    }

    #[test]
    fn test_unparsable_document_reads_as_absent() {
        let dir = TempDir::new().unwrap();
        let cache = CacheStore::open(dir.path()).unwrap();
        fs::write(cache.path(DataKind::Profile), "{ not json").unwrap();

        assert!(cache.get::<serde_json::Value>(DataKind::Profile).is_none());
        assert!(cache.last_updated(DataKind::Profile).is_none());
    }

    #[test]
    fn test_document_is_human_readable() {
        let dir = TempDir::new().unwrap();
        let cache = CacheStore::open(dir.path()).unwrap();
        cache.save(DataKind::Posts, &sample_posts()).unwrap();

        let text = fs::read_to_string(cache.path(DataKind::Posts)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(value["last_updated"].is_string());
        assert_eq!(value["data"][0]["type"], "post");
        assert!(text.contains('\n'));
    }
}

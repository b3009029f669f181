// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local file storage: encryption key, encrypted credentials and cached data.
//!
//! Layout (each file independent of the others):
//! - `{config_dir}/.key` - encryption key
//! - `{config_dir}/linkedin_config.enc` - encrypted credentials
//! - `{data_dir}/{profile,posts,articles}.json` - cached LinkedIn data

pub mod cache;
pub mod credentials;
pub mod fs;
pub mod keys;

pub use cache::{CacheStore, CachedRecord, DataKind};
pub use credentials::{CredentialState, CredentialStore};
pub use keys::{EncryptionKey, KeyManager};

use std::path::{Path, PathBuf};

/// Errors from the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Key material is present but unusable. Fatal: the process cannot continue.
    #[error("Invalid encryption key: {0}")]
    InvalidKey(String),

    #[error("Encryption failed")]
    Encrypt,
}

impl StorageError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Encrypted-at-rest credential store.
//!
//! The whole credential record is serialized as JSON, sealed with
//! AES-256-GCM and written as base64 to a single ciphertext file:
//!
//! ```text
//! base64( nonce[12] || ciphertext || tag[16] )
//! ```
//!
//! Reads never fail loudly on bad ciphertext. A tampered file, a file written
//! with a different key, and a missing file all end up as "not configured" for
//! callers; [`CredentialStore::lookup`] keeps the distinction for logging.

use super::fs::{read_optional, remove_if_exists, write_atomic};
use super::keys::EncryptionKey;
use super::StorageError;
use crate::models::{CredentialRecord, StoredCredentials};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Ciphertext file name inside the configuration directory.
pub const CREDENTIALS_FILE_NAME: &str = "linkedin_config.enc";

/// Binds ciphertext to this file's purpose.
const CREDENTIALS_AAD: &[u8] = b"linkedin-data-api:credentials:v1";

/// Outcome of reading the ciphertext file.
#[derive(Debug, Clone)]
pub enum CredentialState {
    /// No ciphertext file.
    Missing,
    /// File exists but could not be read, decrypted or parsed.
    Corrupted(String),
    Present(StoredCredentials),
}

impl CredentialState {
    pub fn into_stored(self) -> Option<StoredCredentials> {
        match self {
            CredentialState::Present(stored) => Some(stored),
            CredentialState::Missing | CredentialState::Corrupted(_) => None,
        }
    }
}

/// Owns the ciphertext file and the key that seals it.
#[derive(Clone)]
pub struct CredentialStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    path: PathBuf,
    key: LessSafeKey,
    rng: SystemRandom,
    /// Serializes access to the ciphertext file within this process.
    lock: Mutex<()>,
}

impl CredentialStore {
    pub fn open(config_dir: &Path, key: &EncryptionKey) -> Result<Self, StorageError> {
        let unbound = UnboundKey::new(&AES_256_GCM, key.as_bytes())
            .map_err(|_| StorageError::InvalidKey("not a valid AES-256 key".to_string()))?;

        Ok(Self {
            inner: Arc::new(StoreInner {
                path: config_dir.join(CREDENTIALS_FILE_NAME),
                key: LessSafeKey::new(unbound),
                rng: SystemRandom::new(),
                lock: Mutex::new(()),
            }),
        })
    }

    /// Path of the ciphertext file.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Encrypt and persist `record`, replacing whatever was stored before.
    ///
    /// Returns the `last_updated` stamp written with the record.
    pub fn save(&self, record: &CredentialRecord) -> Result<DateTime<Utc>, StorageError> {
        let stored = StoredCredentials {
            credentials: record.clone(),
            last_updated: Utc::now(),
        };
        let sealed = self.seal(serde_json::to_vec(&stored)?)?;

        let _guard = self.lock();
        write_atomic(&self.inner.path, BASE64.encode(sealed).as_bytes(), true)?;

        tracing::info!(path = %self.inner.path.display(), "Credentials saved");
        Ok(stored.last_updated)
    }

    /// Read and decrypt the ciphertext file.
    pub fn lookup(&self) -> CredentialState {
        let raw = {
            let _guard = self.lock();
            read_optional(&self.inner.path)
        };

        let raw = match raw {
            Ok(Some(raw)) => raw,
            Ok(None) => return CredentialState::Missing,
            Err(e) => {
                tracing::warn!(
                    path = %self.inner.path.display(),
                    error = %e,
                    "Credentials file unreadable"
                );
                return CredentialState::Corrupted(format!("unreadable: {}", e));
            }
        };

        match self.decrypt(&raw) {
            Ok(stored) => CredentialState::Present(stored),
            Err(reason) => {
                tracing::warn!(
                    path = %self.inner.path.display(),
                    reason = %reason,
                    "Stored credentials could not be decrypted; reconfiguration required"
                );
                CredentialState::Corrupted(reason)
            }
        }
    }

    /// Stored credentials, or `None` when missing or unreadable.
    pub fn get(&self) -> Option<CredentialRecord> {
        self.lookup().into_stored().map(|s| s.credentials)
    }

    /// When the credentials were last saved, with the same failure handling as [`get`](Self::get).
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.lookup().into_stored().map(|s| s.last_updated)
    }

    /// Remove the ciphertext file. Succeeds if it is already gone.
    pub fn clear(&self) -> Result<(), StorageError> {
        let _guard = self.lock();
        if remove_if_exists(&self.inner.path)? {
            tracing::info!(path = %self.inner.path.display(), "Credentials cleared");
        }
        Ok(())
    }

    fn seal(&self, mut in_out: Vec<u8>) -> Result<Vec<u8>, StorageError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        self.inner
            .rng
            .fill(&mut nonce_bytes)
            .map_err(|_| StorageError::Encrypt)?;

        self.inner
            .key
            .seal_in_place_append_tag(
                Nonce::assume_unique_for_key(nonce_bytes),
                Aad::from(CREDENTIALS_AAD),
                &mut in_out,
            )
            .map_err(|_| StorageError::Encrypt)?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + in_out.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&in_out);
        Ok(sealed)
    }

    fn decrypt(&self, raw: &[u8]) -> Result<StoredCredentials, String> {
        let text = std::str::from_utf8(raw).map_err(|_| "not valid UTF-8".to_string())?;
        let sealed = BASE64
            .decode(text.trim())
            .map_err(|e| format!("base64 decode failed: {}", e))?;

        if sealed.len() < NONCE_LEN + AES_256_GCM.tag_len() {
            return Err(format!("ciphertext too short ({} bytes)", sealed.len()));
        }
        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);
        let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
            .map_err(|_| "invalid nonce".to_string())?;

        let mut in_out = ciphertext.to_vec();
        let plaintext = self
            .inner
            .key
            .open_in_place(nonce, Aad::from(CREDENTIALS_AAD), &mut in_out)
            .map_err(|_| "authentication failed (tampered file or wrong key)".to_string())?;

        serde_json::from_slice(plaintext).map_err(|e| format!("invalid credential JSON: {}", e))
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.inner
            .lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

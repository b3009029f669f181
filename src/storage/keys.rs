// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Encryption key management.
//!
//! A single AES-256 key is generated on first start and written to
//! `{config_dir}/.key`. The key is never rotated.
//!
//! Losing the key file is unrecoverable: every credential encrypted with it
//! can no longer be read, and the user has to enter the credentials again.

use super::credentials::CREDENTIALS_FILE_NAME;
use super::fs::write_atomic;
use super::StorageError;
use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use hkdf::Hkdf;
use ring::rand::{SecureRandom, SystemRandom};
use sha2::Sha256;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Key file name inside the configuration directory.
pub const KEY_FILE_NAME: &str = ".key";

/// Symmetric key used to seal the credentials file.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey([u8; KEY_LEN]);

impl EncryptionKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Derive an independent sub-key for another purpose (HKDF-SHA256).
    pub fn derive_subkey(&self, info: &[u8]) -> Result<[u8; KEY_LEN], StorageError> {
        let hk = Hkdf::<Sha256>::new(None, &self.0);
        let mut okm = [0u8; KEY_LEN];
        hk.expand(info, &mut okm)
            .map_err(|e| StorageError::InvalidKey(format!("key derivation failed: {}", e)))?;
        Ok(okm)
    }

    fn generate(rng: &SystemRandom) -> Result<Self, StorageError> {
        let mut bytes = [0u8; KEY_LEN];
        rng.fill(&mut bytes)
            .map_err(|_| StorageError::InvalidKey("system RNG unavailable".to_string()))?;
        Ok(Self(bytes))
    }

    fn decode(encoded: &str) -> Result<Self, StorageError> {
        let bytes = URL_SAFE
            .decode(encoded.trim())
            .map_err(|e| StorageError::InvalidKey(format!("key file is not base64: {}", e)))?;
        let bytes: [u8; KEY_LEN] = bytes.try_into().map_err(|v: Vec<u8>| {
            StorageError::InvalidKey(format!("expected {} key bytes, found {}", KEY_LEN, v.len()))
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey(<redacted>)")
    }
}

/// Loads the encryption key, creating it on first use.
#[derive(Debug, Clone)]
pub struct KeyManager {
    path: PathBuf,
    /// Ciphertext sealed with this key; unreadable once the key is replaced
    credentials_path: PathBuf,
}

impl KeyManager {
    pub fn new(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join(KEY_FILE_NAME),
            credentials_path: config_dir.join(CREDENTIALS_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the persisted key, generating and writing a new one if the key
    /// file does not exist yet.
    ///
    /// Any error here is a configuration error: the service cannot run
    /// without its key.
    pub fn get_or_create_key(&self) -> Result<EncryptionKey, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(encoded) => {
                let key = EncryptionKey::decode(&encoded)?;
                tracing::debug!(path = %self.path.display(), "Loaded encryption key");
                Ok(key)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => self.create_key(),
            Err(e) => Err(StorageError::io(&self.path, e)),
        }
    }

    fn create_key(&self) -> Result<EncryptionKey, StorageError> {
        let key = EncryptionKey::generate(&SystemRandom::new())?;
        write_atomic(&self.path, URL_SAFE.encode(key.as_bytes()).as_bytes(), true)?;

        tracing::warn!(
            path = %self.path.display(),
            "Generated new encryption key; if this file is lost, stored credentials cannot be recovered"
        );
        if let Some(orphaned) = self.orphaned_credentials() {
            tracing::error!(
                key_path = %self.path.display(),
                credentials_path = %orphaned.display(),
                "Encryption key was lost; existing credentials file can no longer be decrypted and must be reconfigured"
            );
        }
        Ok(key)
    }

    /// Credentials file left over from a previous key, if any.
    ///
    /// Only meaningful right after a new key has been generated.
    fn orphaned_credentials(&self) -> Option<&Path> {
        self.credentials_path
            .exists()
            .then_some(self.credentials_path.as_path())
    }
}

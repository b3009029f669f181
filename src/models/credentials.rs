// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! LinkedIn application credentials.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// OAuth client credentials plus the access token obtained for the user.
///
/// Saving a record always replaces the previous one in full.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/generated/")
)]
pub struct CredentialRecord {
    #[validate(length(min = 1, message = "client_id must not be empty"))]
    pub client_id: String,
    #[validate(length(min = 1, message = "client_secret must not be empty"))]
    pub client_secret: String,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl CredentialRecord {
    /// The bearer token, if OAuth login has completed and left a non-empty token.
    pub fn bearer_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Plaintext layout sealed inside the ciphertext file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredentials {
    pub credentials: CredentialRecord,
    pub last_updated: DateTime<Utc>,
}

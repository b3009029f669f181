// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signed OAuth `state` parameter.
//!
//! Format before base64url encoding: `nonce_hex|issued_at_hex|signature_hex`,
//! where the signature is HMAC-SHA256 over `nonce_hex|issued_at_hex`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use ring::rand::{SecureRandom, SystemRandom};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// How long a login attempt may take.
pub const STATE_MAX_AGE_SECS: i64 = 10 * 60;

/// Tolerated clock skew for states issued "in the future".
const CLOCK_SKEW_SECS: i64 = 60;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("malformed OAuth state")]
    Malformed,
    #[error("OAuth state signature mismatch")]
    BadSignature,
    #[error("OAuth state expired")]
    Expired,
    #[error("could not generate OAuth state")]
    Rng,
}

/// Create a fresh signed state.
pub fn sign_state(key: &[u8], issued_at: DateTime<Utc>) -> Result<String, StateError> {
    let mut nonce = [0u8; 16];
    SystemRandom::new()
        .fill(&mut nonce)
        .map_err(|_| StateError::Rng)?;

    let payload = format!("{}|{:x}", hex::encode(nonce), issued_at.timestamp());
    let signature = hex::encode(mac_for(key, &payload)?.finalize().into_bytes());

    Ok(URL_SAFE_NO_PAD.encode(format!("{}|{}", payload, signature)))
}

/// Check signature and age of a state returned by the callback.
pub fn verify_state(key: &[u8], state: &str, now: DateTime<Utc>) -> Result<(), StateError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(state)
        .map_err(|_| StateError::Malformed)?;
    let decoded = String::from_utf8(bytes).map_err(|_| StateError::Malformed)?;

    let parts: Vec<&str> = decoded.splitn(3, '|').collect();
    let [nonce_hex, issued_hex, signature_hex] = parts.as_slice() else {
        return Err(StateError::Malformed);
    };

    let signature = hex::decode(signature_hex).map_err(|_| StateError::Malformed)?;
    let payload = format!("{}|{}", nonce_hex, issued_hex);
    mac_for(key, &payload)?
        .verify_slice(&signature)
        .map_err(|_| {
            tracing::error!("OAuth state signature mismatch! Potential tampering.");
            StateError::BadSignature
        })?;

    let issued_at = i64::from_str_radix(issued_hex, 16).map_err(|_| StateError::Malformed)?;
    let age = now.timestamp() - issued_at;
    if !(-CLOCK_SKEW_SECS..=STATE_MAX_AGE_SECS).contains(&age) {
        return Err(StateError::Expired);
    }

    Ok(())
}

fn mac_for(key: &[u8], payload: &str) -> Result<HmacSha256, StateError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|_| StateError::Malformed)?;
    mac.update(payload.as_bytes());
    Ok(mac)
}

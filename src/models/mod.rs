// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod credentials;
pub mod post;
pub mod profile;

pub use credentials::{CredentialRecord, StoredCredentials};
pub use post::{Post, PostType};
pub use profile::{Education, Experience, Profile, Website};

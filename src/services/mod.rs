// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod fetcher;
pub mod linkedin;
pub mod oauth_state;

pub use fetcher::{DataFetcher, Freshness};
pub use linkedin::LinkedInClient;

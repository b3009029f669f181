// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Post and article records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Kind of published content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/generated/")
)]
pub enum PostType {
    Post,
    Article,
}

/// A post or article authored by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "frontend/src/generated/")
)]
pub struct Post {
    pub id: String,
    pub text: String,
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub created_time: DateTime<Utc>,
    pub likes_count: Option<u64>,
    pub comments_count: Option<u64>,
    pub shares_count: Option<u64>,
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub post_type: PostType,
}

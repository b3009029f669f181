// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential persistence across restarts.
//!
//! These tests verify that:
//! 1. Saved credentials survive a restart when the key file is kept
//! 2. Losing the key file makes old credentials unreadable (treated as absent)
//! 3. Nothing sensitive is written to disk in plaintext

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::{get, post_json, send};

#[tokio::test]
async fn test_credentials_survive_restart() {
    let app = common::create_test_app();
    let (status, _) = send(
        &app.router,
        post_json(
            "/api/config/credentials",
            json!({ "client_id": "abc", "client_secret": "xyz", "access_token": "tok" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, before) = send(&app.router, get("/api/config/status")).await;

    let app = app.restart();

    let (status, body) = send(&app.router, get("/api/config/credentials")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "client_id": "abc", "client_secret": "xyz", "access_token": "tok" })
    );

    let (_, after) = send(&app.router, get("/api/config/status")).await;
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_key_loss_makes_credentials_absent() {
    let app = common::create_test_app();
    send(
        &app.router,
        post_json(
            "/api/config/credentials",
            json!({ "client_id": "abc", "client_secret": "xyz" }),
        ),
    )
    .await;

    std::fs::remove_file(app.config.config_dir.join(".key")).unwrap();
    let app = app.restart();

    // A new key was generated; the old ciphertext is unreadable
    assert!(app.config.config_dir.join(".key").exists());
    let (status, _) = send(&app.router, get("/api/config/credentials")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, body) = send(&app.router, get("/api/config/status")).await;
    assert_eq!(body["is_configured"], false);
    let (status, _) = send(&app.router, get("/api/linkedin/profile")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Saving again recovers
    let (status, _) = send(
        &app.router,
        post_json(
            "/api/config/credentials",
            json!({ "client_id": "new", "client_secret": "pair" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app.router, get("/api/config/credentials")).await;
    assert_eq!(body["client_id"], "new");
}

#[tokio::test]
async fn test_no_plaintext_on_disk() {
    let app = common::create_test_app();
    send(
        &app.router,
        post_json(
            "/api/config/credentials",
            json!({
                "client_id": "visible-client-id",
                "client_secret": "visible-client-secret",
                "access_token": "visible-access-token"
            }),
        ),
    )
    .await;

    for entry in std::fs::read_dir(&app.config.config_dir).unwrap() {
        let contents = std::fs::read(entry.unwrap().path()).unwrap();
        let text = String::from_utf8_lossy(&contents);
        assert!(!text.contains("visible-"), "plaintext secret on disk");
    }
}

#[cfg(unix)]
#[tokio::test]
async fn test_secret_files_are_private() {
    use std::os::unix::fs::PermissionsExt;

    let app = common::create_test_app();
    send(
        &app.router,
        post_json(
            "/api/config/credentials",
            json!({ "client_id": "abc", "client_secret": "xyz" }),
        ),
    )
    .await;

    for path in [
        app.config.config_dir.join(".key"),
        app.state.credentials.path().to_path_buf(),
    ] {
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600, "{}", path.display());
    }
}

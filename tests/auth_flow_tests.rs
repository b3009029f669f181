// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth login and callback tests.
//!
//! The token endpoint is mocked with mockito; the `state` parameter is
//! produced with the app's own signing key.

use axum::http::{header, StatusCode};
use chrono::{Duration, Utc};
use linkedin_data_api::models::CredentialRecord;
use linkedin_data_api::services::oauth_state::sign_state;
use mockito::Matcher;
use tower::ServiceExt;

mod common;
use common::{get, send, TestApp};

fn store_credentials(app: &TestApp, client_id: &str, token: Option<&str>) {
    app.state
        .credentials
        .save(&CredentialRecord {
            client_id: client_id.to_string(),
            client_secret: "stored-secret".to_string(),
            access_token: token.map(String::from),
        })
        .unwrap();
}

fn valid_state(app: &TestApp) -> String {
    sign_state(&app.state.oauth_state_key, Utc::now()).unwrap()
}

async fn login_location(app: &TestApp) -> (StatusCode, Option<String>) {
    let response = app
        .router
        .clone()
        .oneshot(get("/api/auth/login"))
        .await
        .unwrap();
    let location = response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string());
    (response.status(), location)
}

#[tokio::test]
async fn test_login_without_client_credentials() {
    let app = common::create_test_app();

    let (status, body) = send(&app.router, get("/api/auth/login")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_login_redirects_with_stored_client_id() {
    let app = common::create_test_app_with(|config| {
        config.linkedin_client_id = Some("env-client".to_string());
        config.linkedin_client_secret = Some("env-secret".to_string());
    });
    store_credentials(&app, "stored-client", None);

    let (status, location) = login_location(&app).await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);

    let location = location.unwrap();
    assert!(location.starts_with("http://127.0.0.1:9/oauth/v2/authorization?response_type=code&"));
    assert!(location.contains("client_id=stored-client"));
    assert!(location.contains("scope=r_liteprofile%20r_emailaddress"));
    assert!(location.contains("&state="));
}

#[tokio::test]
async fn test_login_falls_back_to_env_client_id() {
    let app = common::create_test_app_with(|config| {
        config.linkedin_client_id = Some("env-client".to_string());
    });

    let (status, location) = login_location(&app).await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert!(location.unwrap().contains("client_id=env-client"));
}

#[tokio::test]
async fn test_callback_upstream_error() {
    let app = common::create_test_app();

    let (status, body) = send(
        &app.router,
        get("/api/auth/callback?error=user_cancelled_login&error_description=The%20user%20cancelled"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "authentication_failed");
    assert_eq!(body["details"], "user_cancelled_login: The user cancelled");
}

#[tokio::test]
async fn test_callback_missing_code() {
    let app = common::create_test_app();
    let state = valid_state(&app);

    for uri in [
        format!("/api/auth/callback?state={}", state),
        format!("/api/auth/callback?code=&state={}", state),
    ] {
        let (status, body) = send(&app.router, get(&uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"], "No authorization code provided");
    }
}

#[tokio::test]
async fn test_callback_rejects_missing_or_bad_state() {
    let app = common::create_test_app();
    store_credentials(&app, "client", None);
    let expired = sign_state(&app.state.oauth_state_key, Utc::now() - Duration::hours(1)).unwrap();
    let foreign = sign_state(b"some other key", Utc::now()).unwrap();

    for uri in [
        "/api/auth/callback?code=abc".to_string(),
        "/api/auth/callback?code=abc&state=garbage".to_string(),
        format!("/api/auth/callback?code=abc&state={}", expired),
        format!("/api/auth/callback?code=abc&state={}", foreign),
    ] {
        let (status, body) = send(&app.router, get(&uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"], "authentication_failed");
    }

    // Nothing changed
    assert!(app.state.credentials.get().unwrap().access_token.is_none());
}

#[tokio::test]
async fn test_callback_exchanges_code_and_stores_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/oauth/v2/accessToken")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
            Matcher::UrlEncoded("code".into(), "good-code".into()),
            Matcher::UrlEncoded("client_id".into(), "client".into()),
            Matcher::UrlEncoded("client_secret".into(), "stored-secret".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"fresh-token","expires_in":5184000}"#)
        .create_async()
        .await;

    let app = common::create_test_app_with(|config| {
        config.linkedin_oauth_base_url = format!("{}/oauth/v2", server.url());
    });
    store_credentials(&app, "client", Some("old-token"));

    let uri = format!("/api/auth/callback?code=good-code&state={}", valid_state(&app));
    let (status, body) = send(&app.router, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Successfully authenticated with LinkedIn");
    mock.assert_async().await;

    let stored = app.state.credentials.get().unwrap();
    assert_eq!(stored.client_id, "client");
    assert_eq!(stored.client_secret, "stored-secret");
    assert_eq!(stored.access_token.as_deref(), Some("fresh-token"));
}

#[tokio::test]
async fn test_callback_saves_bootstrap_credentials() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/oauth/v2/accessToken")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"boot-token"}"#)
        .create_async()
        .await;

    let app = common::create_test_app_with(|config| {
        config.linkedin_oauth_base_url = format!("{}/oauth/v2", server.url());
        config.linkedin_client_id = Some("env-client".to_string());
        config.linkedin_client_secret = Some("env-secret".to_string());
    });

    let uri = format!("/api/auth/callback?code=c&state={}", valid_state(&app));
    let (status, _) = send(&app.router, get(&uri)).await;
    assert_eq!(status, StatusCode::OK);

    let stored = app.state.credentials.get().unwrap();
    assert_eq!(stored.client_id, "env-client");
    assert_eq!(stored.client_secret, "env-secret");
    assert_eq!(stored.access_token.as_deref(), Some("boot-token"));
}

#[tokio::test]
async fn test_callback_exchange_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/oauth/v2/accessToken")
        .with_status(401)
        .with_body(r#"{"error":"invalid_grant"}"#)
        .create_async()
        .await;

    let app = common::create_test_app_with(|config| {
        config.linkedin_oauth_base_url = format!("{}/oauth/v2", server.url());
    });
    store_credentials(&app, "client", Some("old-token"));

    let uri = format!("/api/auth/callback?code=bad&state={}", valid_state(&app));
    let (status, body) = send(&app.router, get(&uri)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "linkedin_error");

    let stored = app.state.credentials.get().unwrap();
    assert_eq!(stored.access_token.as_deref(), Some("old-token"));
}

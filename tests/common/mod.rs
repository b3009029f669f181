// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{Request, StatusCode};
use linkedin_data_api::config::Config;
use linkedin_data_api::routes::create_router;
use linkedin_data_api::AppState;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// A test app rooted in its own temp directory.
///
/// Keep the `TempDir` alive for as long as the app is used.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub config: Config,
    pub dir: TempDir,
}

#[allow(dead_code)]
impl TestApp {
    /// Simulate a process restart: rebuild the state from the same directories.
    pub fn restart(self) -> TestApp {
        let state = Arc::new(AppState::initialize(self.config.clone()).expect("restart"));
        TestApp {
            router: create_router(state.clone()),
            state,
            config: self.config,
            dir: self.dir,
        }
    }
}

/// Create a test app with unreachable LinkedIn endpoints.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    create_test_app_with(|_| {})
}

/// Create a test app, letting the caller adjust the config first.
#[allow(dead_code)]
pub fn create_test_app_with(customize: impl FnOnce(&mut Config)) -> TestApp {
    let dir = TempDir::new().expect("temp dir");
    let mut config = Config::test_default();
    config.config_dir = dir.path().join("config");
    config.data_dir = dir.path().join("data");
    customize(&mut config);

    let state = Arc::new(AppState::initialize(config.clone()).expect("initialize state"));
    TestApp {
        router: create_router(state.clone()),
        state,
        config,
        dir,
    }
}

/// Serve `router` on an ephemeral local port and return its base URL.
#[allow(dead_code)]
pub async fn spawn_upstream(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind upstream");
    let addr = listener.local_addr().expect("upstream addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    format!("http://{}", addr)
}

/// Send a request and decode the JSON body (`Null` for an empty body).
#[allow(dead_code)]
pub async fn send(router: &axum::Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[allow(dead_code)]
pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[allow(dead_code)]
pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[allow(dead_code)]
pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

//! Shared helpers for integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Request, Response};
use axum::Router;
use tower::ServiceExt;

use hello_server::{create_router, AppConfig, AppState};

pub const TEST_API_KEY: &str = "test-api-key";

pub fn test_config() -> AppConfig {
    AppConfig::from_toml(&format!(
        "[http]\nhost = \"127.0.0.1\"\nport = 0\nshutdown_grace_seconds = 1\n\n[secrets]\nauth_key = \"{}\"\n",
        TEST_API_KEY
    ))
    .unwrap()
    .with_overrides(|_| None)
    .unwrap()
}

pub fn test_app() -> Router {
    create_router(AppState::new(test_config()))
}

pub fn json_post(uri: &str, api_key: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn send(req: Request<Body>) -> Response<Body> {
    test_app().oneshot(req).await.unwrap()
}

pub async fn body_json(resp: Response<Body>) -> serde_json::Value {
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

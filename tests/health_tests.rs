//! Integration tests for the `/health` probes.

mod common;

use axum::http::{header::CACHE_CONTROL, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use hello_server::routes::health::MemoryUsage;
use hello_server::{create_router, AppState};

use common::{body_json, get, json_post, send, test_config};

#[tokio::test]
async fn test_livez_returns_ok() {
    let resp = send(get("/health/livez")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(CACHE_CONTROL).unwrap(), "no-store");

    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn test_readyz_reports_status() {
    let resp = send(get("/health/readyz")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json = body_json(resp).await;
    assert_eq!(json["status"], "ok");
    assert!(json["timestamp"].is_string());
    assert!(json["uptime"].as_f64().unwrap() >= 0.0);
    assert!(json["memory"].is_object());
    assert!(json["memory"].get("rss").is_some());
}

#[tokio::test]
async fn test_health_unserved_method_is_not_found() {
    for uri in ["/health/livez", "/health/readyz"] {
        let resp = send(json_post(uri, None, "{}")).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "uri: {}", uri);
        assert_eq!(body_json(resp).await, json!({"error": "not-found"}));
    }
}

#[tokio::test]
async fn test_readyz_unavailable_when_sampling_fails() {
    fn failing_sampler() -> std::io::Result<MemoryUsage> {
        Err(std::io::Error::other("proc unreadable"))
    }

    let state = AppState::new(test_config()).with_memory_sampler(failing_sampler);
    let resp = create_router(state)
        .oneshot(get("/health/readyz"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body_json(resp).await,
        json!({"status": "error", "message": "Service unavailable"})
    );
}

//! End-to-end tests that run the real listener.

mod common;

use std::time::Duration;

use hello_server::http::{Lifecycle, ShutdownReason, StartError};

use common::{test_app, TEST_API_KEY};

#[tokio::test]
async fn test_serves_then_shuts_down_cleanly() {
    let mut lifecycle = Lifecycle::new(Duration::from_secs(1));
    let addr = lifecycle.init(test_app(), "127.0.0.1:0").await.unwrap();

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("http://{}/api/v0/echo", addr))
        .header("x-api-key", TEST_API_KEY)
        .json(&serde_json::json!({"message": "Hello, world!"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Hello, world!");
    drop(client);

    let code = lifecycle.shutdown(ShutdownReason::Signal("SIGTERM")).await;
    assert_eq!(code, 0);

    let err = reqwest::get(format!("http://{}/health/livez", addr)).await;
    assert!(err.is_err(), "listener still accepting after shutdown");
}

#[tokio::test]
async fn test_fault_shutdown_exits_with_one() {
    let mut lifecycle = Lifecycle::new(Duration::from_secs(1));
    lifecycle.init(test_app(), "127.0.0.1:0").await.unwrap();

    let code = lifecycle
        .shutdown(ShutdownReason::Fault("uncaught failure".to_string()))
        .await;
    assert_eq!(code, 1);
}

#[tokio::test]
async fn test_listener_stopping_on_its_own_is_a_fault() {
    let mut lifecycle = Lifecycle::new(Duration::from_secs(1));
    lifecycle.init(test_app(), "127.0.0.1:0").await.unwrap();

    // Stop the listener behind the lifecycle's back
    lifecycle.handle().shutdown();

    let reason = tokio::time::timeout(Duration::from_secs(5), lifecycle.wait_for_fault())
        .await
        .expect("listener did not stop");
    assert!(matches!(reason, ShutdownReason::Fault(_)), "unexpected reason: {}", reason);

    assert_eq!(lifecycle.shutdown(reason).await, 1);
}

#[tokio::test]
async fn test_healthy_listener_reports_no_fault() {
    let mut lifecycle = Lifecycle::new(Duration::from_secs(1));
    lifecycle.init(test_app(), "127.0.0.1:0").await.unwrap();

    let waited = tokio::time::timeout(Duration::from_millis(200), lifecycle.wait_for_fault()).await;
    assert!(waited.is_err());

    assert_eq!(lifecycle.shutdown(ShutdownReason::Signal("SIGTERM")).await, 0);
}

#[tokio::test]
async fn test_bind_conflict_fails_to_start() {
    let mut first = Lifecycle::new(Duration::from_secs(1));
    let addr = first.init(test_app(), "127.0.0.1:0").await.unwrap();

    let mut second = Lifecycle::new(Duration::from_secs(1));
    let err = second.init(test_app(), &addr.to_string()).await.unwrap_err();
    assert!(matches!(err, StartError::Bind(_)), "unexpected error: {}", err);

    first.shutdown(ShutdownReason::Signal("SIGINT")).await;
}

#[tokio::test]
async fn test_invalid_address_is_rejected() {
    let mut lifecycle = Lifecycle::new(Duration::from_secs(1));
    let err = lifecycle.init(test_app(), "not-an-address").await.unwrap_err();
    assert!(matches!(err, StartError::Address { .. }));
}

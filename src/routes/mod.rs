//! HTTP routing for the service.
//!
//! Routes are grouped under path prefixes:
//! - `/health`: liveness and readiness probes, never cached
//! - `/api/v0`: JSON API, with the echo endpoint behind the API key gate
//!
//! Unmatched paths and known paths hit with an unserved method answer a
//! normalized `not-found`; a panicking handler answers a normalized 500.
//! Request tracing is enabled via middleware that generates a unique
//! request ID for each incoming request.

pub mod api;
pub mod health;

use std::any::Any;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::{catch_panic::CatchPanicLayer, set_header::SetResponseHeaderLayer};

use crate::config::CACHE_CONTROL_NO_STORE;
use crate::error::{normalize, BoxError, CaughtError, ServerError};
use crate::middleware::{api_key_layer, request_id_layer};
use crate::state::AppState;

/// Fallback for paths no route matches, and for known paths hit with a
/// method they do not serve.
async fn not_found() -> ServerError {
    ServerError::not_found()
}

/// Turn a handler panic into an internal error response.
///
/// String payloads are kept as the cause so they reach the server log.
fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let cause: Option<BoxError> = if let Some(s) = payload.downcast_ref::<&str>() {
        Some((*s).into())
    } else {
        payload.downcast_ref::<String>().map(|s| s.clone().into())
    };

    normalize(CaughtError::Unknown(cause)).into_response()
}

/// Creates the Axum router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Health probes - always fresh
    let health_routes = Router::new()
        .route("/livez", get(health::livez))
        .route("/readyz", get(health::readyz))
        .method_not_allowed_fallback(not_found)
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_NO_STORE),
        ));

    // Authenticated API routes
    let authed_routes = Router::new()
        .route("/echo", post(api::echo))
        .method_not_allowed_fallback(not_found)
        .route_layer(middleware::from_fn_with_state(state.clone(), api_key_layer));

    let v0_routes = Router::new()
        .route("/render", post(api::render))
        .method_not_allowed_fallback(not_found)
        .merge(authed_routes);

    let body_limit = state.config.http.body_limit_bytes;

    Router::new()
        .nest("/health", health_routes)
        .nest("/api/v0", v0_routes)
        .fallback(not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        // Panics become normalized 500s instead of dropped connections
        .layer(CatchPanicLayer::custom(handle_panic))
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    async fn boom() -> &'static str {
        panic!("database password is hunter2")
    }

    #[tokio::test]
    async fn test_panic_becomes_internal_error() {
        let app = Router::new()
            .route("/boom", get(boom))
            .layer(CatchPanicLayer::custom(handle_panic));

        let resp = app
            .oneshot(Request::builder().uri("/boom").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], br#"{"error":"internal-server-error"}"#);
    }
}

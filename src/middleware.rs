//! Request middleware.
//!
//! - `request_id_layer`: generates a UUID v4 for each incoming request and
//!   creates a tracing span that wraps the entire request lifecycle, so all
//!   logs emitted during processing carry the `request_id` field. The id is
//!   echoed back in the `x-request-id` response header.
//! - `api_key_layer`: pre-shared key gate that short-circuits with
//!   `unauthenticated` before the handler runs.

use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::API_KEY_HEADER;
use crate::error::ServerError;
use crate::state::AppState;

/// Response header carrying the request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that generates a request ID and creates a request span.
///
/// This should be the outermost middleware layer so the span wraps
/// all request processing, including other middleware and handlers.
pub async fn request_id_layer(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
        duration_ms = tracing::field::Empty,
    );

    let start = Instant::now();

    async move {
        let mut response = next.run(request).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        tracing::Span::current().record("duration_ms", duration_ms);
        tracing::info!(
            status = response.status().as_u16(),
            duration_ms,
            "Request completed"
        );

        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert(REQUEST_ID_HEADER, value);
        }

        response
    }
    .instrument(span)
    .await
}

/// Middleware that requires a valid pre-shared key in the `x-api-key` header.
///
/// Missing, non-UTF-8, or mismatched keys are rejected as `unauthenticated`.
/// On success the request passes through untouched.
pub async fn api_key_layer(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let authorized = match request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        Some(key) => state.verify_api_key(key),
        None => {
            tracing::debug!("Rejected request without API key");
            return ServerError::unauthenticated().into_response();
        }
    };

    if !authorized {
        tracing::debug!("Rejected request with invalid API key");
        return ServerError::unauthenticated().into_response();
    }

    next.run(request).await
}

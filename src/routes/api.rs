//! Handlers for the versioned JSON API under `/api/v0`.
//!
//! Routes:
//! - POST /api/v0/render - strict empty body, answers with a fixed greeting
//! - POST /api/v0/echo - requires `x-api-key`, returns the submitted message

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ServerError;
use crate::extract::StrictJson;

/// Request body for `/render`. No fields are accepted.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderRequest {}

/// Request body for `/echo`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EchoRequest {
    pub message: String,
}

/// Response body shared by both endpoints.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Render handler ("hello").
pub async fn render(
    StrictJson(_request): StrictJson<RenderRequest>,
) -> Result<Json<MessageResponse>, ServerError> {
    Ok(Json(MessageResponse {
        message: "hello".to_string(),
    }))
}

/// Echo handler. Authentication is enforced by the router's API key layer.
pub async fn echo(
    StrictJson(request): StrictJson<EchoRequest>,
) -> Result<Json<MessageResponse>, ServerError> {
    tracing::debug!(len = request.message.len(), "Echoing message");
    Ok(Json(MessageResponse {
        message: request.message,
    }))
}

//! hello-server: a minimal JSON-over-HTTP service.
//!
//! Exposes liveness and readiness probes under `/health` and a small API
//! under `/api/v0`. Every failure is normalized into a fixed error taxonomy
//! before it reaches the client; see [`error`].

pub mod config;
pub mod error;
pub mod extract;
pub mod http;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::AppConfig;
pub use error::{normalize, sanitize_message, CaughtError, ErrorCategory, ServerError};
pub use routes::create_router;
pub use state::AppState;

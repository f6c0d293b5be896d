//! Error taxonomy and normalization for client-facing responses.
//!
//! Every failure a handler produces is funneled through [`ServerError`], which
//! carries one of a closed set of [`ErrorCategory`] values bound to a fixed HTTP
//! status, plus a sanitized slug that is safe to show to clients. The original
//! error is kept as a `cause` for server-side logs only.
//!
//! Failures are first captured as a [`CaughtError`] at the boundary where they
//! are caught, and [`normalize`] turns any of them into a [`ServerError`].

use std::error::Error as StdError;
use std::fmt;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Boxed error type used for causes of unknown origin.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Closed set of error kinds, each bound to exactly one HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    BadRequest,
    Unauthenticated,
    Unauthorized,
    NotFound,
    Conflict,
    ValidationError,
    InternalError,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 7] = [
        ErrorCategory::BadRequest,
        ErrorCategory::Unauthenticated,
        ErrorCategory::Unauthorized,
        ErrorCategory::NotFound,
        ErrorCategory::Conflict,
        ErrorCategory::ValidationError,
        ErrorCategory::InternalError,
    ];

    /// HTTP status this category is always reported with.
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCategory::BadRequest => StatusCode::BAD_REQUEST,
            ErrorCategory::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorCategory::Unauthorized => StatusCode::FORBIDDEN,
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            ErrorCategory::Conflict => StatusCode::CONFLICT,
            ErrorCategory::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCategory::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Canonical client slug, already in sanitized form.
    pub fn canonical_message(self) -> &'static str {
        match self {
            ErrorCategory::BadRequest => "bad-request",
            ErrorCategory::Unauthenticated => "unauthenticated",
            ErrorCategory::Unauthorized => "unauthorized",
            ErrorCategory::NotFound => "not-found",
            ErrorCategory::Conflict => "conflict",
            ErrorCategory::ValidationError => "validation-error",
            ErrorCategory::InternalError => "internal-server-error",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_message())
    }
}

/// Reduce arbitrary text to a client-safe slug.
///
/// The result is lowercase, contains only `[a-z0-9_-]`, and has each gap of
/// whitespace between kept characters replaced by a single hyphen. Characters
/// that are dropped do not open a new gap. Never fails.
pub fn sanitize_message(message: &str) -> String {
    let mut slug = String::with_capacity(message.len());
    let mut pending_hyphen = false;

    for c in message.trim().chars() {
        if c.is_whitespace() {
            pending_hyphen = true;
            continue;
        }
        for lower in c.to_lowercase() {
            if lower.is_ascii_lowercase() || lower.is_ascii_digit() || lower == '_' || lower == '-' {
                if pending_hyphen && !slug.is_empty() {
                    slug.push('-');
                }
                pending_hyphen = false;
                slug.push(lower);
            }
        }
    }

    slug
}

/// A request body that did not match its declared schema.
#[derive(Debug, thiserror::Error)]
#[error("schema validation failed: {message}")]
pub struct ValidationFailure {
    message: String,
}

impl ValidationFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<JsonRejection> for ValidationFailure {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(rejection.body_text())
    }
}

impl From<serde_json::Error> for ValidationFailure {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// A normalized, client-safe error.
#[derive(Debug)]
pub struct ServerError {
    category: ErrorCategory,
    client_message: String,
    cause: Option<BoxError>,
}

impl ServerError {
    /// Error of the given category with its canonical message.
    pub fn new(category: ErrorCategory) -> Self {
        Self {
            category,
            client_message: category.canonical_message().to_string(),
            cause: None,
        }
    }

    /// Error whose client message is an explicit override.
    ///
    /// The override is sanitized. If nothing survives sanitization the
    /// canonical message is used instead.
    pub fn with_message(category: ErrorCategory, message: &str) -> Self {
        let sanitized = sanitize_message(message);
        let client_message = if sanitized.is_empty() {
            category.canonical_message().to_string()
        } else {
            sanitized
        };

        Self {
            category,
            client_message,
            cause: None,
        }
    }

    /// Attach the internal error that led here. Only ever logged.
    pub fn caused_by(mut self, cause: impl Into<BoxError>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn bad_request() -> Self {
        Self::new(ErrorCategory::BadRequest)
    }

    pub fn unauthenticated() -> Self {
        Self::new(ErrorCategory::Unauthenticated)
    }

    pub fn not_found() -> Self {
        Self::new(ErrorCategory::NotFound)
    }

    pub fn internal() -> Self {
        Self::new(ErrorCategory::InternalError)
    }

    pub fn category(&self) -> ErrorCategory {
        self.category
    }

    pub fn status(&self) -> StatusCode {
        self.category.status()
    }

    pub fn client_message(&self) -> &str {
        &self.client_message
    }

    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// Project into a status code and JSON body.
    ///
    /// Internal errors are logged here with their full cause chain; the body
    /// only ever carries the sanitized client message.
    pub fn to_response(&self) -> (StatusCode, Json<ErrorBody>) {
        if self.category == ErrorCategory::InternalError {
            match &self.cause {
                Some(cause) => tracing::error!(
                    error = %cause,
                    chain = %CauseChain(cause.as_ref()),
                    "Internal server error"
                ),
                None => tracing::error!("Internal server error"),
            }
        }

        (
            self.status(),
            Json(ErrorBody {
                error: self.client_message.clone(),
            }),
        )
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.client_message, self.status().as_u16())
    }
}

impl StdError for ServerError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause
            .as_deref()
            .map(|cause| cause as &(dyn StdError + 'static))
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        self.to_response().into_response()
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Formats an error followed by its `source()` chain.
struct CauseChain<'a>(&'a (dyn StdError + Send + Sync + 'static));

impl fmt::Display for CauseChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)?;
        let mut source = self.0.source();
        while let Some(err) = source {
            write!(f, ": caused by: {}", err)?;
            source = err.source();
        }
        Ok(())
    }
}

/// Any failure as first caught at a handler or middleware boundary.
#[derive(Debug)]
pub enum CaughtError {
    /// Already categorized by the code that raised it.
    Normalized(ServerError),
    /// Input did not match a declared schema.
    Validation(ValidationFailure),
    /// Anything else. `None` when the failure was not an error value,
    /// e.g. a panic payload.
    Unknown(Option<BoxError>),
}

impl From<ServerError> for CaughtError {
    fn from(err: ServerError) -> Self {
        CaughtError::Normalized(err)
    }
}

impl From<ValidationFailure> for CaughtError {
    fn from(err: ValidationFailure) -> Self {
        CaughtError::Validation(err)
    }
}

impl From<JsonRejection> for CaughtError {
    fn from(rejection: JsonRejection) -> Self {
        CaughtError::Validation(rejection.into())
    }
}

impl From<serde_json::Error> for CaughtError {
    fn from(err: serde_json::Error) -> Self {
        CaughtError::Validation(err.into())
    }
}

impl From<std::io::Error> for CaughtError {
    fn from(err: std::io::Error) -> Self {
        CaughtError::Unknown(Some(Box::new(err)))
    }
}

impl From<BoxError> for CaughtError {
    fn from(err: BoxError) -> Self {
        CaughtError::Unknown(Some(err))
    }
}

/// Map any caught failure onto a [`ServerError`].
pub fn normalize(caught: CaughtError) -> ServerError {
    match caught {
        CaughtError::Normalized(err) => err,
        CaughtError::Validation(failure) => ServerError::bad_request().caused_by(failure),
        CaughtError::Unknown(Some(cause)) => ServerError::internal().caused_by(cause),
        CaughtError::Unknown(None) => ServerError::internal(),
    }
}

impl From<CaughtError> for ServerError {
    fn from(caught: CaughtError) -> Self {
        normalize(caught)
    }
}

impl From<ValidationFailure> for ServerError {
    fn from(err: ValidationFailure) -> Self {
        normalize(err.into())
    }
}

impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        normalize(rejection.into())
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        normalize(err.into())
    }
}

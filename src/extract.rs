//! Request body extraction with schema validation.

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ServerError;

/// JSON body extractor whose failures go through the error normalizer.
///
/// Malformed JSON, a missing `application/json` content type, or a body that
/// does not match `T` all become a `bad-request` response. Pair it with
/// `#[serde(deny_unknown_fields)]` on `T` for a strict schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictJson<T>(pub T);

impl<T, S> FromRequest<S> for StrictJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

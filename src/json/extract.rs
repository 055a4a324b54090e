//! `StrictJson<T>` extractor.

use axum::extract::{FromRef, FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::json::decode::{JsonCodec, JsonError};

/// Like `axum::Json`, but decoded by the state's [`JsonCodec`]: size
/// ceiling, unknown-key policy and single-value rule all apply.
///
/// Rejections render as error envelopes.
#[derive(Debug, Clone)]
pub struct StrictJson<T>(pub T);

impl<T, S> FromRequest<S> for StrictJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    JsonCodec: FromRef<S>,
{
    type Rejection = JsonError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let codec = JsonCodec::from_ref(state);
        codec.read_json(req.into_body()).await.map(StrictJson)
    }
}

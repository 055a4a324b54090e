//! JSON POST helper.

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PostError {
    /// The payload could not be serialized.
    #[error("failed to encode request payload: {0}")]
    Encode(#[from] serde_json::Error),

    /// Building, sending or receiving the request failed.
    #[error("request to remote service failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// POST `payload` as JSON to `uri`.
///
/// Uses `client` when given (custom timeouts, proxies, test transports),
/// otherwise a default client. Returns the response with its status.
pub async fn post_json<T: Serialize + ?Sized>(
    uri: &str,
    payload: &T,
    client: Option<&Client>,
) -> Result<(Response, StatusCode), PostError> {
    let body = serde_json::to_vec(payload)?;

    let default_client;
    let client = match client {
        Some(client) => client,
        None => {
            default_client = Client::new();
            &default_client
        }
    };

    let response = client
        .post(uri)
        .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
        .body(body)
        .send()
        .await?;
    let status = response.status();

    tracing::debug!(uri, status = %status, "Posted JSON");
    Ok((response, status))
}

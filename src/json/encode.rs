//! JSON response writing.

use std::fmt::Display;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::json::decode::JsonError;
use crate::json::envelope::JsonResponse;

/// Serialize `payload` into a JSON response with `status`.
///
/// Serialization runs before anything else, so a failure produces no
/// response at all. `headers` are applied after the default
/// `Content-Type: application/json` and replace any default of the same name.
pub fn write_json<T: Serialize + ?Sized>(
    status: StatusCode,
    payload: &T,
    headers: Option<HeaderMap>,
) -> Result<Response, JsonError> {
    let body = serde_json::to_vec(payload).map_err(JsonError::Encode)?;

    let mut response = Response::new(Body::from(body));
    let out = response.headers_mut();
    out.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(extra) = headers {
        let mut current: Option<HeaderName> = None;
        for (name, value) in extra {
            // Repeated values of one header arrive with `None` as their name.
            match name {
                Some(name) => {
                    out.insert(name.clone(), value);
                    current = Some(name);
                }
                None => {
                    if let Some(name) = &current {
                        out.append(name.clone(), value);
                    }
                }
            }
        }
    }
    *response.status_mut() = status;
    Ok(response)
}

/// Wrap `err` in an error envelope and write it (default `400 Bad Request`).
pub fn error_json(err: &impl Display, status: Option<StatusCode>) -> Result<Response, JsonError> {
    let payload = JsonResponse::<()>::failure(err.to_string());
    write_json(status.unwrap_or(StatusCode::BAD_REQUEST), &payload, None)
}

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        match error_json(&self, Some(self.status())) {
            Ok(response) => response,
            Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response(),
        }
    }
}

//! Forced-attachment static file download.

use std::path::Path;

use axum::body::Body;
use axum::extract::Request;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tower_http::services::ServeFile;

/// Serve the file at `path` so browsers download it as `display_name`
/// instead of rendering it inline.
///
/// A missing file yields `404 File not found`. Range and conditional
/// requests are honoured by the underlying file service.
pub async fn download_static_file(
    request: Request,
    path: impl AsRef<Path>,
    display_name: &str,
) -> Response {
    let path = path.as_ref();
    match tokio::fs::try_exists(path).await {
        Ok(true) => {}
        _ => return (StatusCode::NOT_FOUND, "File not found").into_response(),
    }

    let response = match ServeFile::new(path).oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };
    let (mut parts, body) = response.into_parts();

    let disposition = format!("attachment; filename=\"{}\"", display_name.replace('"', "\\\""));
    match HeaderValue::from_str(&disposition) {
        Ok(value) => {
            parts.headers.insert(header::CONTENT_DISPOSITION, value);
        }
        Err(_) => {
            parts
                .headers
                .insert(header::CONTENT_DISPOSITION, HeaderValue::from_static("attachment"));
        }
    }
    parts.headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );

    tracing::debug!(path = %path.display(), display_name, status = %parts.status, "Serving download");
    Response::from_parts(parts, Body::new(body))
}

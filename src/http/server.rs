//! HTTP server setup and handlers.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up request tracing
//! - Bind server to listener with graceful shutdown
//! - Remove partially stored uploads when a batch fails

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::{FromRef, Path as UrlPath, Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::{ServerConfig, ToolkitConfig};
use crate::files::download_static_file;
use crate::json::{error_json, write_json, JsonCodec, JsonError, JsonResponse, StrictJson};
use crate::text::slugify;
use crate::upload::{UploadedFile, Uploader};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub uploader: Uploader,
    pub json: JsonCodec,
    pub server: Arc<ServerConfig>,
}

impl FromRef<AppState> for JsonCodec {
    fn from_ref(state: &AppState) -> Self {
        state.json.clone()
    }
}

/// Demo server exposing the toolkit over HTTP.
pub struct HttpServer {
    router: Router,
    config: ToolkitConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ToolkitConfig) -> Self {
        let state = AppState {
            uploader: Uploader::new(config.upload.clone()),
            json: JsonCodec::new(config.json.clone()),
            server: Arc::new(config.server.clone()),
        };
        let router = Self::build_router(state);
        Self { router, config }
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/upload", post(upload_files))
            .route("/upload/one", post(upload_one))
            .route("/slug", post(slug))
            .route("/download/{name}", get(download))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// The configured router, for serving or driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ToolkitConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upload_dir = %self.config.server.upload_dir.display(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn upload_files(State(state): State<AppState>, request: Request) -> Result<Response, JsonError> {
    match state.uploader.upload_files(request, &state.server.upload_dir).await {
        Ok(files) => {
            let message = format!("{} file(s) uploaded", files.len());
            write_json(StatusCode::OK, &JsonResponse::ok(message, files), None)
        }
        Err(partial) => {
            tracing::warn!(
                error = %partial.error,
                stored = partial.stored.len(),
                "Upload batch failed, removing stored files"
            );
            remove_stored(&state.server.upload_dir, &partial.stored).await;
            error_json(&partial.error, Some(partial.error.status()))
        }
    }
}

async fn upload_one(State(state): State<AppState>, request: Request) -> Result<Response, JsonError> {
    match state.uploader.upload_one(request, &state.server.upload_dir).await {
        Ok(file) => write_json(StatusCode::OK, &JsonResponse::ok("file uploaded", file), None),
        Err(err) => {
            tracing::warn!(error = %err, "Single upload failed");
            error_json(&err, Some(err.status()))
        }
    }
}

#[derive(Debug, Deserialize)]
struct SlugRequest {
    text: String,
}

#[derive(Debug, Serialize)]
struct SlugResponse {
    slug: String,
}

async fn slug(StrictJson(request): StrictJson<SlugRequest>) -> Result<Response, JsonError> {
    match slugify(&request.text) {
        Ok(slug) => write_json(StatusCode::OK, &JsonResponse::ok("", SlugResponse { slug }), None),
        Err(err) => error_json(&err, None),
    }
}

async fn download(
    State(state): State<AppState>,
    UrlPath(name): UrlPath<String>,
    request: Request,
) -> Response {
    if !is_plain_file_name(&name) {
        return (StatusCode::BAD_REQUEST, "invalid file name").into_response();
    }
    let path: PathBuf = state.server.download_dir.join(&name);
    download_static_file(request, path, &name).await
}

/// A single path component that cannot escape its directory.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

async fn remove_stored(dir: &Path, stored: &[UploadedFile]) {
    for file in stored {
        if let Err(err) = tokio::fs::remove_file(dir.join(&file.new_file_name)).await {
            tracing::warn!(file = %file.new_file_name, error = %err, "Failed to remove stored file");
        }
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_file_names() {
        assert!(is_plain_file_name("report.pdf"));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name("a/b"));
        assert!(!is_plain_file_name("a\\b"));
        assert!(!is_plain_file_name(""));
    }
}

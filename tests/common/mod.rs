//! Shared utilities for integration tests.

use std::net::SocketAddr;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use reqkit::{HttpServer, ToolkitConfig};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// PNG signature followed by filler bytes.
#[allow(dead_code)]
pub fn png_bytes(len: usize) -> Vec<u8> {
    let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend((0..len.saturating_sub(8)).map(|i| (i % 251) as u8));
    data
}

/// Start the demo server on an ephemeral port.
#[allow(dead_code)]
pub async fn start_server(config: ToolkitConfig) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config);

    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });
    addr
}

/// Start a backend that answers `201` with the content type and JSON body it
/// received.
#[allow(dead_code)]
pub async fn start_echo_backend() -> SocketAddr {
    async fn echo(headers: HeaderMap, body: Bytes) -> (StatusCode, Json<Value>) {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let received: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (
            StatusCode::CREATED,
            Json(json!({"content_type": content_type, "received": received})),
        )
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/{*path}", post(echo));

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

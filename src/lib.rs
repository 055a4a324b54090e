//! Request-handling toolkit for axum services.
//!
//! - [`upload`]: multipart ingestion with content sniffing and an allow-list
//! - [`json`]: strict JSON decoding with stable error messages, enveloped responses
//! - [`text`]: random tokens and URL slugs
//! - [`files`]: directory helpers and forced-attachment downloads
//! - [`outbound`]: JSON POST to other services

pub mod config;
pub mod files;
pub mod http;
pub mod json;
pub mod observability;
pub mod outbound;
pub mod text;
pub mod upload;

pub use config::ToolkitConfig;
pub use http::HttpServer;
pub use json::{error_json, write_json, JsonCodec, JsonError, JsonPolicy, JsonResponse, StrictJson};
pub use text::{random_string, slugify};
pub use upload::{PartialUpload, UploadError, UploadPolicy, UploadedFile, Uploader};

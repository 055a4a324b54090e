//! Upload records, policy and error definitions.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default ceiling on a whole multipart body (1 GiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 1024 * 1024 * 1024;

/// Metadata about one stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Name the file was written under inside the destination directory.
    pub new_file_name: String,

    /// Name supplied by the client. Untrusted.
    pub original_file_name: String,

    /// Number of bytes written.
    pub file_size: u64,
}

/// Upload behaviour, fixed per [`Uploader`](super::Uploader).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UploadPolicy {
    /// Ceiling on the whole multipart body in bytes.
    pub max_total_bytes: u64,

    /// Accepted sniffed MIME types, compared case-insensitively.
    /// Empty accepts anything.
    pub allowed_content_types: Vec<String>,

    /// Store under a random name (keeping the extension) instead of the
    /// client-supplied filename.
    pub rename_on_store: bool,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_total_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_content_types: Vec::new(),
            rename_on_store: true,
        }
    }
}

impl UploadPolicy {
    /// Whether a sniffed content type passes the allow-list.
    pub fn permits(&self, content_type: &str) -> bool {
        self.allowed_content_types.is_empty()
            || self
                .allowed_content_types
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(content_type))
    }
}

/// Errors that can occur while ingesting uploads.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The multipart body exceeds `max_total_bytes`.
    #[error("uploaded file is too big (limit {limit} bytes)")]
    UploadTooLarge { limit: u64 },

    /// The sniffed content type is not in the allow-list.
    #[error("uploaded file type not permitted: {content_type}")]
    UnsupportedFileType { content_type: String },

    /// The body is not valid `multipart/form-data`.
    #[error("invalid multipart form data: {0}")]
    MultipartParse(String),

    /// A single-file upload was requested but the form carries no file.
    #[error("no file found in the request")]
    NoFile,

    /// Filesystem failure while storing a file.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl UploadError {
    /// Status used when this error is reported to the uploading client.
    pub fn status(&self) -> StatusCode {
        match self {
            UploadError::UploadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            UploadError::UnsupportedFileType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            UploadError::MultipartParse(_) | UploadError::NoFile => StatusCode::BAD_REQUEST,
            UploadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<multer::Error> for UploadError {
    fn from(err: multer::Error) -> Self {
        match err {
            multer::Error::StreamSizeExceeded { limit } => UploadError::UploadTooLarge { limit },
            other => UploadError::MultipartParse(other.to_string()),
        }
    }
}

/// A batch that stopped at its first failing file.
///
/// `stored` lists the files written before the failure. They are left on
/// disk; removing them is up to the caller.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct PartialUpload {
    #[source]
    pub error: UploadError,
    pub stored: Vec<UploadedFile>,
}

impl PartialUpload {
    /// Failure before any file was stored.
    pub fn empty(error: impl Into<UploadError>) -> Self {
        Self {
            error: error.into(),
            stored: Vec::new(),
        }
    }
}

//! Multipart file upload ingestion.
//!
//! # Data Flow
//! ```text
//! multipart request
//!     → engine.rs (size gate, multer parsing, per-part loop)
//!     → classifier.rs (sniff first 512 bytes, check allow-list)
//!     → text::random (optional random stored name)
//!     → destination directory (streamed write)
//!     → Vec<UploadedFile> | PartialUpload
//! ```
//!
//! # Design Decisions
//! - Content type comes from the bytes, never from the client's header
//! - The first failing file ends the batch; files stored before it are
//!   reported back so the caller can keep or remove them
//! - Stored names are not checked for collisions; a collision overwrites

pub mod classifier;
pub mod engine;
pub mod types;

pub use classifier::{ContentClassifier, MagicClassifier, SNIFF_LEN};
pub use engine::{Uploader, RANDOM_NAME_LEN};
pub use types::{PartialUpload, UploadError, UploadPolicy, UploadedFile, DEFAULT_MAX_UPLOAD_BYTES};

//! Filesystem helpers.
//!
//! # Responsibilities
//! - Create upload/download directories idempotently
//! - Purge directory contents without removing the directory itself
//! - Serve a file as a forced download (`Content-Disposition: attachment`)
//!
//! # Design Decisions
//! - All I/O goes through `tokio::fs` so handlers never block the runtime
//! - Errors are returned unchanged; callers decide what to surface

pub mod dirs;
pub mod download;

pub use dirs::{clean_directory, ensure_dir, DIR_MODE};
pub use download::download_static_file;

//! Outbound JSON requests to other services.

pub mod post;

pub use post::{post_json, PostError};

//! Strict JSON request decoding and enveloped JSON responses.
//!
//! # Data Flow
//! ```text
//! request body
//!     → decode.rs (size ceiling, single value, unknown-key policy)
//!     → T | JsonError (stable message per failure kind)
//!
//! handler result
//!     → envelope.rs (JsonResponse { error, message, data })
//!     → encode.rs (serialize first, then headers, status, body)
//! ```
//!
//! # Design Decisions
//! - Error messages are part of the wire contract and never change wording
//! - Serialization failures surface before any response is built
//! - `StrictJson<T>` applies the same rules as an axum extractor

pub mod decode;
pub mod encode;
pub mod envelope;
pub mod extract;

pub use decode::{JsonCodec, JsonError, JsonErrorKind, JsonPolicy, DEFAULT_MAX_JSON_BYTES};
pub use encode::{error_json, write_json};
pub use envelope::JsonResponse;
pub use extract::StrictJson;

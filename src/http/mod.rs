//! Demo HTTP host wiring every toolkit operation into an axum router.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, TraceLayer)
//!     → handlers (upload / slug / download)
//!     → JsonResponse envelopes
//! ```

pub mod server;

pub use server::{AppState, HttpServer};

//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! upload / json subsystems produce:
//!     → tracing events (debug level, successful progress only)
//!     → metrics.rs (counters)
//!
//! The binary installs:
//!     → logging.rs (tracing-subscriber with EnvFilter)
//!     → metrics.rs (Prometheus scrape endpoint, optional)
//! ```
//!
//! # Design Decisions
//! - The library never installs a subscriber or recorder; the host does
//! - Errors are returned to callers, never logged on their behalf

pub mod logging;
pub mod metrics;

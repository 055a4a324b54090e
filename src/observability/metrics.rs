//! Metrics collection and exposition.
//!
//! # Metrics
//! - `reqkit_files_stored_total` (counter): uploaded files written to disk
//! - `reqkit_bytes_stored_total` (counter): bytes written by uploads
//! - `reqkit_json_decode_failures_total` (counter): decode failures by `kind`

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_file_stored(bytes: u64) {
    ::metrics::counter!("reqkit_files_stored_total").increment(1);
    ::metrics::counter!("reqkit_bytes_stored_total").increment(bytes);
}

pub fn record_decode_failure(kind: &'static str) {
    ::metrics::counter!("reqkit_json_decode_failures_total", "kind" => kind).increment(1);
}

//! reqkit demo server.
//!
//! ```text
//!     POST /upload            multipart, every file part
//!     POST /upload/one        multipart, first file part only
//!     POST /slug              {"text": "..."} → {"slug": "..."}
//!     GET  /download/{name}   forced attachment from download_dir
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use reqkit::config::{load_config, ToolkitConfig};
use reqkit::files::ensure_dir;
use reqkit::observability::{logging, metrics};
use reqkit::HttpServer;

#[derive(Parser)]
#[command(name = "reqkit")]
#[command(about = "Demo server for the reqkit request-handling toolkit", long_about = None)]
struct Cli {
    /// Path to a TOML config file; defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `server.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ToolkitConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.server.bind_address = bind;
    }

    logging::init_logging(&config.observability.log_level);
    tracing::info!("reqkit v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.server.bind_address,
        max_upload_bytes = config.upload.max_total_bytes,
        max_json_bytes = config.json.max_body_bytes,
        allowed_types = ?config.upload.allowed_content_types,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    ensure_dir(&config.server.upload_dir).await?;
    ensure_dir(&config.server.download_dir).await?;

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    HttpServer::new(config).run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

//! reqmetrics - an instrumented example HTTP service
//!
//! Usage:
//!     reqmetrics [--config <path>]
//!
//! See --help for more options.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::info;

use reqmetrics::config::{load_config, Config};
use reqmetrics::http::HttpServer;
use reqmetrics::util::init_logging;
use reqmetrics::AppState;

/// An instrumented example HTTP service exposing Prometheus metrics.
#[derive(Parser, Debug)]
#[command(name = "reqmetrics")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Override the listen address
    #[arg(long, value_name = "ADDR")]
    listen: Option<SocketAddr>,

    /// Validate configuration and exit
    #[arg(long)]
    validate: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path).with_context(|| {
            format!("failed to load configuration from '{}'", path.display())
        })?,
        None => Config::default(),
    };

    if let Some(listen) = cli.listen {
        config.server.listen = listen;
    }

    // CLI overrides config
    let log_level = cli
        .log_level
        .as_deref()
        .unwrap_or(&config.global.log_level);

    init_logging(log_level, &config.global.log_format)
        .context("failed to initialize logging")?;

    if cli.validate {
        info!("Configuration is valid");
        println!("Configuration is valid.");
        println!("  Service: {}", config.global.service_name);
        println!("  Listen: {}", config.server.listen);
        println!(
            "  Metrics: {} (path label: {:?})",
            config.metrics.path, config.metrics.path_label
        );
        return Ok(());
    }

    info!(
        config_path = ?cli.config.as_ref().map(|p| p.display().to_string()),
        service = %config.global.service_name,
        listen = %config.server.listen,
        metrics_path = %config.metrics.path,
        path_label = ?config.metrics.path_label,
        "reqmetrics starting"
    );

    run(config)
}

/// Run the service with the given configuration.
fn run(config: Config) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    runtime.block_on(async { run_async(config).await })
}

/// Async entry point.
async fn run_async(config: Config) -> Result<()> {
    let listen = config.server.listen;
    let state = AppState::new(config);

    let server = HttpServer::bind(listen, state.clone())
        .await
        .context("failed to start http server")?;

    let handle = tokio::spawn(server.run(state.shutdown().subscribe()));

    info!("reqmetrics is running");
    info!("press Ctrl+C to stop");

    state.shutdown().shutdown_on_ctrl_c().await;

    let _ = handle.await;

    info!("reqmetrics shut down complete");
    Ok(())
}

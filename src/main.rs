//! Echo server.
//!
//! Accepts one connection at a time on the configured port (30000 by
//! default) and sends every received frame straight back until the peer
//! hangs up.
//!
//! ```text
//!   client ──[len|payload]──▶ ┌──────────┐
//!                             │ listener │──▶ connection ──▶ echo loop
//!   client ◀──[len|payload]── └──────────┘
//! ```
//!
//! Bind and listen failures are fatal: the error is printed and the process
//! exits with a non-zero status.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use socket_echo::config::{self, validation::validate_server_config, ConfigError, ServerConfig};
use socket_echo::observability::{logging, metrics};
use socket_echo::EchoServer;

#[derive(Parser)]
#[command(name = "echo-server")]
#[command(about = "Length-prefixed TCP echo server", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind.
    #[arg(long)]
    host: Option<String>,

    /// Port to bind.
    #[arg(short, long)]
    port: Option<u16>,

    /// Pending connection queue depth.
    #[arg(long)]
    backlog: Option<u32>,

    /// Largest accepted frame payload in bytes.
    #[arg(long)]
    max_frame_size: Option<usize>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => config::load_server_config(path)?,
            None => ServerConfig::default(),
        };
        if let Some(host) = self.host {
            config.listener.host = host;
        }
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(backlog) = self.backlog {
            config.listener.backlog = backlog;
        }
        if let Some(max) = self.max_frame_size {
            config.framing.max_frame_size = max;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
        validate_server_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server exiting");
            eprintln!("echo-server: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = cli.into_config()?;
    logging::init_logging(&config.observability.log_level);

    tracing::info!(
        host = %config.listener.host,
        port = config.listener.port,
        backlog = config.listener.backlog,
        max_frame_size = config.framing.max_frame_size,
        "Configuration loaded"
    );

    if let Some(addr) = &config.observability.metrics_address {
        metrics::init_metrics(addr.parse()?)?;
    }

    let server = EchoServer::bind(&config).await?;
    server.run().await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

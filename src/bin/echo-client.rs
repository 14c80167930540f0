use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use socket_echo::config::{self, validation::validate_client_config, ClientConfig, ConfigError};
use socket_echo::echo::client::{format_response, request};
use socket_echo::observability::logging;

#[derive(Parser)]
#[command(name = "echo-client")]
#[command(about = "Send one framed message to the echo server and print the reply", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server host.
    #[arg(long)]
    host: Option<String>,

    /// Server port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Message to send.
    #[arg(short, long, default_value = "Test message.")]
    message: String,

    /// Largest accepted frame payload in bytes.
    #[arg(long)]
    max_frame_size: Option<usize>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn to_config(&self) -> Result<ClientConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => config::load_client_config(path)?,
            None => ClientConfig::default(),
        };
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(max) = self.max_frame_size {
            config.framing.max_frame_size = max;
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
        validate_client_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("echo-client: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = cli.to_config()?;
    logging::init_logging(&config.observability.log_level);

    let reply = request(&config, cli.message.as_bytes()).await?;
    print!("{}", format_response(&reply));
    Ok(())
}

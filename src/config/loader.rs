//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::{ClientConfig, ServerConfig};
use crate::config::validation::{validate_client_config, validate_server_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate a server configuration from a TOML file.
pub fn load_server_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_server_config(&content)
}

/// Parse and validate a server configuration from TOML text.
pub fn parse_server_config(content: &str) -> Result<ServerConfig, ConfigError> {
    let config: ServerConfig = toml::from_str(content)?;
    validate_server_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate a client configuration from a TOML file.
pub fn load_client_config(path: &Path) -> Result<ClientConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_client_config(&content)
}

/// Parse and validate a client configuration from TOML text.
pub fn parse_client_config(content: &str) -> Result<ClientConfig, ConfigError> {
    let config: ClientConfig = toml::from_str(content)?;
    validate_client_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

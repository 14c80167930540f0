//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (backlog > 0, frame limit fits the length prefix)
//! - Check addresses and log levels parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is a pure function of the config

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{
    BackoffConfig, ClientConfig, FramingConfig, ListenerConfig, ObservabilityConfig, ServerConfig,
};

/// Longest accepted accept-retry delay (one hour).
pub const MAX_BACKOFF_DELAY_MS: u64 = 60 * 60 * 1000;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("listener.backlog must be greater than 0")]
    ZeroBacklog,

    #[error("framing.max_frame_size must be between 1 and {max}, got {value}")]
    FrameSizeOutOfRange { value: usize, max: u64 },

    #[error("unknown log level {0:?}")]
    UnknownLogLevel(String),

    #[error("invalid metrics address {0:?}")]
    InvalidMetricsAddress(String),

    #[error("accept_backoff.base_delay_ms ({base}) exceeds max_delay_ms ({max})")]
    BackoffInverted { base: u64, max: u64 },

    #[error("accept_backoff.max_delay_ms must be at most {limit}, got {value}")]
    BackoffTooLong { value: u64, limit: u64 },
}

/// Validate a server configuration.
pub fn validate_server_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    check_listener(&config.listener, &mut errors);
    check_framing(&config.framing, &mut errors);
    check_observability(&config.observability, &mut errors);
    check_backoff(&config.accept_backoff, &mut errors);
    finish(errors)
}

/// Validate a client configuration.
pub fn validate_client_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    if config.host.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "host" });
    }
    check_framing(&config.framing, &mut errors);
    check_observability(&config.observability, &mut errors);
    finish(errors)
}

fn check_listener(listener: &ListenerConfig, errors: &mut Vec<ValidationError>) {
    if listener.host.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "listener.host" });
    }
    if listener.backlog == 0 {
        errors.push(ValidationError::ZeroBacklog);
    }
}

fn check_framing(framing: &FramingConfig, errors: &mut Vec<ValidationError>) {
    let max = u64::from(u32::MAX);
    if framing.max_frame_size == 0 || framing.max_frame_size as u64 > max {
        errors.push(ValidationError::FrameSizeOutOfRange {
            value: framing.max_frame_size,
            max,
        });
    }
}

fn check_observability(observability: &ObservabilityConfig, errors: &mut Vec<ValidationError>) {
    let level = observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(observability.log_level.clone()));
    }
    if let Some(addr) = &observability.metrics_address {
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidMetricsAddress(addr.clone()));
        }
    }
}

fn check_backoff(backoff: &BackoffConfig, errors: &mut Vec<ValidationError>) {
    if backoff.max_delay_ms > MAX_BACKOFF_DELAY_MS {
        errors.push(ValidationError::BackoffTooLong {
            value: backoff.max_delay_ms,
            limit: MAX_BACKOFF_DELAY_MS,
        });
    }
    if backoff.base_delay_ms > backoff.max_delay_ms {
        errors.push(ValidationError::BackoffInverted {
            base: backoff.base_delay_ms,
            max: backoff.max_delay_ms,
        });
    }
}

fn finish(errors: Vec<ValidationError>) -> Result<(), Vec<ValidationError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(validate_server_config(&ServerConfig::default()).is_ok());
        assert!(validate_client_config(&ClientConfig::default()).is_ok());
    }

    #[test]
    fn collects_every_error() {
        let mut config = ServerConfig::default();
        config.listener.host = " ".into();
        config.listener.backlog = 0;
        config.framing.max_frame_size = 0;
        config.observability.log_level = "loud".into();
        config.observability.metrics_address = Some("not-an-address".into());
        config.accept_backoff.base_delay_ms = 5000;

        let errors = validate_server_config(&config).unwrap_err();
        assert_eq!(errors.len(), 6);
        assert!(errors.contains(&ValidationError::ZeroBacklog));
        assert!(errors.contains(&ValidationError::UnknownLogLevel("loud".into())));
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = ClientConfig::default();
        config.observability.log_level = "DEBUG".into();
        assert!(validate_client_config(&config).is_ok());
    }

    #[test]
    fn client_requires_host() {
        let mut config = ClientConfig::default();
        config.host.clear();
        let errors = validate_client_config(&config).unwrap_err();
        assert_eq!(errors, vec![ValidationError::Empty { field: "host" }]);
    }

    #[test]
    fn backoff_delay_is_bounded() {
        let mut config = ServerConfig::default();
        config.accept_backoff.base_delay_ms = u64::MAX;
        config.accept_backoff.max_delay_ms = u64::MAX;
        let errors = validate_server_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::BackoffTooLong {
                value: u64::MAX,
                limit: MAX_BACKOFF_DELAY_MS,
            }]
        );

        config.accept_backoff.base_delay_ms = 1000;
        config.accept_backoff.max_delay_ms = MAX_BACKOFF_DELAY_MS;
        assert!(validate_server_config(&config).is_ok());
    }
}

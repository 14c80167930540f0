//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files, and
//! every section falls back to its defaults when omitted.

use serde::{Deserialize, Serialize};

use crate::net::framing::DEFAULT_MAX_FRAME_SIZE;

/// Port used by both roles unless configured otherwise.
pub const DEFAULT_PORT: u16 = 30000;

/// Root configuration for the echo server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listening address and backlog.
    pub listener: ListenerConfig,

    /// Frame limits.
    pub framing: FramingConfig,

    /// Logging and metrics.
    pub observability: ObservabilityConfig,

    /// Delay between retries after a failed accept.
    pub accept_backoff: BackoffConfig,
}

/// Root configuration for the echo client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server host name or address.
    pub host: String,

    /// Server port.
    pub port: u16,

    pub framing: FramingConfig,

    pub observability: ObservabilityConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            framing: FramingConfig::default(),
            observability: ObservabilityConfig {
                log_level: "warn".to_string(),
                metrics_address: None,
            },
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Host or address to bind (e.g., "0.0.0.0").
    pub host: String,

    /// Port to bind. 0 picks an ephemeral port.
    pub port: u16,

    /// Depth of the OS queue of not-yet-accepted connections.
    pub backlog: u32,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            backlog: 5,
        }
    }
}

/// Frame size limits, applied to both sending and receiving.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FramingConfig {
    /// Largest accepted payload in bytes.
    pub max_frame_size: usize,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Prometheus endpoint bind address; disabled when unset.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_address: None,
        }
    }
}

/// Exponential backoff bounds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Delay after the first consecutive failure in milliseconds.
    pub base_delay_ms: u64,

    /// Upper bound on the delay in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 10,
            max_delay_ms: 1000,
        }
    }
}

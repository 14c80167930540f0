//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServerConfig / ClientConfig (validated, immutable)
//!     → command line flags override individual fields
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_client_config, load_server_config, ConfigError};
pub use schema::{
    BackoffConfig, ClientConfig, FramingConfig, ListenerConfig, ObservabilityConfig, ServerConfig,
    DEFAULT_PORT,
};
pub use validation::ValidationError;

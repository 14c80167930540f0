//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` takes precedence over the configured level
//! - Output goes to stderr so that stdout only carries program output

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// `default_level` applies to this crate only; other crates stay at `warn`.
/// Calling this twice is harmless: the second install is ignored.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(default_level)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

fn default_directive(level: &str) -> String {
    format!("warn,socket_echo={}", level.to_ascii_lowercase())
}

//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! net, server, client produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (connection and frame counters)
//!
//! Consumers:
//!     → stderr (log lines; stdout is reserved for program output)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Connection ID flows through every per-connection log line
//! - Counters are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;

//! Resilience subsystem.
//!
//! The server's accept loop backs off after consecutive accept failures
//! (e.g. file descriptor exhaustion) instead of spinning. Connection-level
//! operations are never retried.

pub mod backoff;

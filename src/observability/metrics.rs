//! Metrics collection and exposition.
//!
//! # Metrics
//! - `echo_connections_accepted_total` (counter): connections handed out by the listener
//! - `echo_connections_failed_total` (counter): connections that ended in an error, by kind
//! - `echo_accept_errors_total` (counter): failed accept calls
//! - `echo_frames_total` (counter): frames moved, by direction
//! - `echo_frame_bytes_total` (counter): payload bytes moved, by direction
//!
//! Without an installed recorder every call here is a no-op.

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus HTTP endpoint. Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    describe();
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

fn describe() {
    metrics::describe_counter!(
        "echo_connections_accepted_total",
        "Connections accepted by the listener"
    );
    metrics::describe_counter!(
        "echo_connections_failed_total",
        "Connections that ended with an error"
    );
    metrics::describe_counter!("echo_accept_errors_total", "Failed accept calls");
    metrics::describe_counter!("echo_frames_total", "Frames sent or received");
    metrics::describe_counter!("echo_frame_bytes_total", "Payload bytes sent or received");
}

pub fn record_connection_accepted() {
    metrics::counter!("echo_connections_accepted_total").increment(1);
}

pub fn record_connection_failed(kind: &'static str) {
    metrics::counter!("echo_connections_failed_total", "kind" => kind).increment(1);
}

pub fn record_accept_error() {
    metrics::counter!("echo_accept_errors_total").increment(1);
}

/// Record one frame moving in `direction` ("sent" or "received").
pub fn record_frame(direction: &'static str, payload_len: usize) {
    metrics::counter!("echo_frames_total", "direction" => direction).increment(1);
    metrics::counter!("echo_frame_bytes_total", "direction" => direction).increment(payload_len as u64);
}

//! Framed TCP transport with an echo client and server.

pub mod config;
pub mod echo;
pub mod net;
pub mod observability;
pub mod resilience;

pub use config::{ClientConfig, ServerConfig};
pub use echo::EchoServer;
pub use net::{Connection, ErrorKind, Listener, TransportError, TransportResult};

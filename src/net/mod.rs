//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Server:
//!     listener.rs (bind, listen, accept)
//!     → connection.rs (one owned stream per peer)
//!     → framing.rs (length-prefixed frames)
//!
//! Client:
//!     connection.rs (connect)
//!     → framing.rs
//!
//! Connection States:
//!     Connected → Closed
//! ```
//!
//! # Design Decisions
//! - Every failure is a `TransportError` carrying an `ErrorKind`
//! - Connections are owned by one task and never shared
//! - No timeouts: operations wait for completion, failure or peer closure

pub mod connection;
pub mod error;
pub mod framing;
pub mod listener;

pub use connection::{Connection, ConnectionId, ConnectionState};
pub use error::{ErrorKind, TransportError, TransportResult};
pub use listener::{Listener, ListenerState};

//! Error values for transport operations.
//!
//! Every failure in the network layer is reported as a [`TransportError`]:
//! a kind that callers branch on, plus a description for diagnostics.

use std::fmt;
use thiserror::Error;

/// What kind of network operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Reserving the local address failed.
    Bind,
    /// Marking the endpoint ready to accept failed.
    Listen,
    /// Accepting an incoming connection failed.
    Accept,
    /// Establishing an outgoing connection failed.
    Connect,
    /// Writing a frame failed.
    Send,
    /// Reading a frame failed, or the frame was malformed or truncated.
    Receive,
    /// The peer closed at a frame boundary, or the handle is already closed.
    ConnectionClosed,
}

impl ErrorKind {
    /// Setup failures that are never retried.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ErrorKind::Bind | ErrorKind::Listen)
    }

    /// Stable label used for metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Bind => "bind",
            ErrorKind::Listen => "listen",
            ErrorKind::Accept => "accept",
            ErrorKind::Connect => "connect",
            ErrorKind::Send => "send",
            ErrorKind::Receive => "receive",
            ErrorKind::ConnectionClosed => "connection_closed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ErrorKind::Bind => "bind error",
            ErrorKind::Listen => "listen error",
            ErrorKind::Accept => "accept error",
            ErrorKind::Connect => "connect error",
            ErrorKind::Send => "send error",
            ErrorKind::Receive => "receive error",
            ErrorKind::ConnectionClosed => "connection closed",
        };
        f.write_str(text)
    }
}

/// A failed network operation.
///
/// Immutable once built. Only [`kind`](Self::kind) should drive control flow;
/// the description is for humans.
#[derive(Debug, Error)]
#[error("{kind}: {description}")]
pub struct TransportError {
    kind: ErrorKind,
    description: String,
    #[source]
    source: Option<std::io::Error>,
}

impl TransportError {
    /// Create an error without an underlying I/O cause.
    pub fn new(kind: ErrorKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            source: None,
        }
    }

    /// Wrap an I/O error, prefixing its message with `context`.
    pub fn io(kind: ErrorKind, context: impl fmt::Display, err: std::io::Error) -> Self {
        Self {
            kind,
            description: format!("{}: {}", context, err),
            source: Some(err),
        }
    }

    /// Shorthand for an operation attempted on a closed handle or endpoint.
    pub fn closed(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConnectionClosed, description)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// True when the peer ended the connection at a frame boundary.
    pub fn is_connection_closed(&self) -> bool {
        self.kind == ErrorKind::ConnectionClosed
    }

    pub fn is_fatal(&self) -> bool {
        self.kind.is_fatal()
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

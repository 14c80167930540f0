//! TCP listening endpoint.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Start listening with the configured backlog
//! - Accept incoming connections one at a time
//! - Keep accepting after transient accept failures
//!
//! # States
//! ```text
//! Idle ──bind──▶ Idle(bound) ──listen──▶ Listening ──close──▶ Closed
//! ```

use std::net::SocketAddr;
use tokio::net::{lookup_host, TcpListener, TcpSocket};

use crate::config::{FramingConfig, ListenerConfig};
use crate::net::connection::Connection;
use crate::net::error::{ErrorKind, TransportError, TransportResult};
use crate::observability::metrics;

/// Externally visible listener state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    /// Created, possibly bound, not yet listening.
    Idle,
    /// Accepting connections.
    Listening,
    /// Listening socket released.
    Closed,
}

#[derive(Debug)]
enum Inner {
    Idle(Option<TcpSocket>),
    Listening(TcpListener),
    Closed,
}

/// Binds a local address and yields accepted [`Connection`]s.
///
/// Ownership of every accepted connection passes to the caller.
#[derive(Debug)]
pub struct Listener {
    inner: Inner,
    local_addr: Option<SocketAddr>,
    backlog: u32,
    max_frame_size: usize,
}

impl Listener {
    /// Create an unbound endpoint.
    pub fn new(framing: &FramingConfig) -> Self {
        Self {
            inner: Inner::Idle(None),
            local_addr: None,
            backlog: 0,
            max_frame_size: framing.max_frame_size,
        }
    }

    /// Bind and start listening in one step.
    pub async fn bind_and_listen(config: &ListenerConfig, framing: &FramingConfig) -> TransportResult<Self> {
        let mut listener = Self::new(framing);
        listener.bind(&config.host, config.port).await?;
        listener.listen(config.backlog)?;
        Ok(listener)
    }

    /// Reserve the local address `host:port`.
    pub async fn bind(&mut self, host: &str, port: u16) -> TransportResult<SocketAddr> {
        match &self.inner {
            Inner::Idle(None) => {}
            Inner::Idle(Some(_)) => {
                return Err(TransportError::new(ErrorKind::Bind, "endpoint is already bound"));
            }
            Inner::Listening(_) => {
                return Err(TransportError::new(ErrorKind::Bind, "endpoint is already listening"));
            }
            Inner::Closed => {
                return Err(TransportError::new(ErrorKind::Bind, "endpoint is closed"));
            }
        }

        let target = format!("{}:{}", host, port);
        let addr = lookup_host(target.as_str())
            .await
            .map_err(|e| TransportError::io(ErrorKind::Bind, format!("resolve {}", target), e))?
            .next()
            .ok_or_else(|| TransportError::new(ErrorKind::Bind, format!("{} did not resolve to any address", target)))?;

        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4(),
            SocketAddr::V6(_) => TcpSocket::new_v6(),
        }
        .map_err(|e| TransportError::io(ErrorKind::Bind, "create socket", e))?;

        // Same as tokio's TcpListener::bind: allow rebinding over TIME_WAIT, but
        // an address held by a live listener still fails.
        #[cfg(unix)]
        socket
            .set_reuseaddr(true)
            .map_err(|e| TransportError::io(ErrorKind::Bind, "set SO_REUSEADDR", e))?;

        socket
            .bind(addr)
            .map_err(|e| TransportError::io(ErrorKind::Bind, format!("bind {}", addr), e))?;
        let local_addr = socket
            .local_addr()
            .map_err(|e| TransportError::io(ErrorKind::Bind, "read local address", e))?;

        tracing::info!(address = %local_addr, "Listener bound");
        self.local_addr = Some(local_addr);
        self.inner = Inner::Idle(Some(socket));
        Ok(local_addr)
    }

    /// Start accepting with the given backlog depth.
    pub fn listen(&mut self, backlog: u32) -> TransportResult<()> {
        let socket = match std::mem::replace(&mut self.inner, Inner::Closed) {
            Inner::Idle(Some(socket)) => socket,
            other => {
                let reason = match &other {
                    Inner::Idle(None) => "listen called before bind",
                    Inner::Listening(_) => "endpoint is already listening",
                    _ => "endpoint is closed",
                };
                self.inner = other;
                return Err(TransportError::new(ErrorKind::Listen, reason));
            }
        };

        // The socket is consumed either way; a failed listen leaves the endpoint Closed.
        let listener = socket.listen(backlog).map_err(|e| {
            tracing::warn!(address = ?self.local_addr, backlog, error = %e, "Listen failed, endpoint closed");
            TransportError::io(ErrorKind::Listen, format!("listen with backlog {}", backlog), e)
        })?;

        tracing::info!(
            address = ?self.local_addr,
            backlog,
            "Listening for connections"
        );
        self.backlog = backlog;
        self.inner = Inner::Listening(listener);
        Ok(())
    }

    /// Wait for the next peer and hand back its connection.
    ///
    /// An `Accept` error from the OS leaves the listener usable; call again.
    pub async fn accept(&self) -> TransportResult<Connection> {
        let listener = match &self.inner {
            Inner::Listening(listener) => listener,
            Inner::Idle(_) => {
                return Err(TransportError::new(ErrorKind::Accept, "endpoint is not listening"));
            }
            Inner::Closed => return Err(TransportError::closed("listener is closed")),
        };

        let (stream, peer_addr) = listener
            .accept()
            .await
            .map_err(|e| TransportError::io(ErrorKind::Accept, "accept", e))?;

        let conn = Connection::from_stream(stream, peer_addr, self.max_frame_size);
        metrics::record_connection_accepted();
        tracing::debug!(
            connection_id = %conn.id(),
            peer_addr = %peer_addr,
            "Connection accepted"
        );
        Ok(conn)
    }

    /// Release the listening socket. Calling this more than once is a no-op.
    pub fn close(&mut self) {
        if !matches!(self.inner, Inner::Closed) {
            self.inner = Inner::Closed;
            tracing::info!(address = ?self.local_addr, "Listener closed");
        }
    }

    pub fn state(&self) -> ListenerState {
        match self.inner {
            Inner::Idle(_) => ListenerState::Idle,
            Inner::Listening(_) => ListenerState::Listening,
            Inner::Closed => ListenerState::Closed,
        }
    }

    /// The bound address, once `bind` has succeeded.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn backlog(&self) -> u32 {
        self.backlog
    }
}

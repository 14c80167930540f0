//! Connected stream endpoint.
//!
//! # Responsibilities
//! - Establish outgoing connections (client role)
//! - Wrap accepted streams (server role)
//! - Framed send/receive over the owned stream
//! - Track state (Connected → Closed) and refuse I/O once closed
//!
//! A [`Connection`] exclusively owns its socket. Dropping it releases the
//! socket, so every early return closes the connection.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::config::FramingConfig;
use crate::net::error::{ErrorKind, TransportError, TransportResult};
use crate::net::framing;
use crate::observability::metrics;

/// Global atomic counter for connection IDs.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection, used to correlate log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Take the next ID from the process-wide counter.
    fn next() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Connection state for lifecycle tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Stream is open; frames may be sent and received.
    Connected,
    /// Stream has been released.
    Closed,
}

/// One connected byte-stream endpoint with framed send/receive.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    stream: Option<TcpStream>,
    peer_addr: SocketAddr,
    max_frame_size: usize,
}

impl Connection {
    /// Connect to `host:port`.
    ///
    /// Every resolved address is tried in turn. Waits for the OS to finish or
    /// fail the handshake; there is no application-level timeout.
    pub async fn connect(host: &str, port: u16, framing: &FramingConfig) -> TransportResult<Self> {
        let target = format!("{}:{}", host, port);
        let stream = TcpStream::connect(target.as_str())
            .await
            .map_err(|e| TransportError::io(ErrorKind::Connect, format!("connect to {}", target), e))?;
        let peer_addr = stream
            .peer_addr()
            .map_err(|e| TransportError::io(ErrorKind::Connect, format!("connect to {}", target), e))?;

        let conn = Self::from_stream(stream, peer_addr, framing.max_frame_size);
        tracing::debug!(
            connection_id = %conn.id,
            peer_addr = %peer_addr,
            "Connected"
        );
        Ok(conn)
    }

    /// Wrap an already connected stream.
    pub(crate) fn from_stream(stream: TcpStream, peer_addr: SocketAddr, max_frame_size: usize) -> Self {
        // Frames are written header then payload; don't let Nagle hold the payload back.
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(peer_addr = %peer_addr, error = %e, "Failed to set TCP_NODELAY");
        }
        Self {
            id: ConnectionId::next(),
            stream: Some(stream),
            peer_addr,
            max_frame_size,
        }
    }

    /// Send one frame.
    pub async fn send(&mut self, payload: &[u8]) -> TransportResult<()> {
        let max = self.max_frame_size;
        let stream = self.stream_mut()?;
        framing::write_frame(stream, payload, max).await?;
        metrics::record_frame("sent", payload.len());
        Ok(())
    }

    /// Receive one frame, waiting until it has fully arrived.
    ///
    /// `ConnectionClosed` means the peer hung up between frames; a close in
    /// the middle of a frame is a `Receive` error.
    pub async fn receive(&mut self) -> TransportResult<Vec<u8>> {
        let max = self.max_frame_size;
        let stream = self.stream_mut()?;
        let payload = framing::read_frame(stream, max).await?;
        metrics::record_frame("received", payload.len());
        Ok(payload)
    }

    /// Close the connection. Calling this more than once is a no-op.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            // Best effort: the peer may already be gone.
            if let Err(e) = stream.shutdown().await {
                tracing::trace!(connection_id = %self.id, error = %e, "Shutdown failed");
            }
            tracing::debug!(connection_id = %self.id, peer_addr = %self.peer_addr, "Connection closed");
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    pub fn state(&self) -> ConnectionState {
        if self.stream.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Closed
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state() == ConnectionState::Closed
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    fn stream_mut(&mut self) -> TransportResult<&mut TcpStream> {
        let id = self.id;
        self.stream
            .as_mut()
            .ok_or_else(|| TransportError::closed(format!("{} is closed", id)))
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if self.stream.is_some() {
            tracing::trace!(connection_id = %self.id, "Connection dropped while open");
        }
    }
}

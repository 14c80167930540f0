//! Sequential echo server.
//!
//! # Responsibilities
//! - Own the listening endpoint for the process lifetime
//! - Echo every received frame back to its sender
//! - Isolate per-connection failures from the accept loop
//! - Back off after consecutive accept failures

use std::net::SocketAddr;
use std::time::Duration;

use crate::config::{BackoffConfig, ServerConfig};
use crate::net::{Connection, ErrorKind, Listener, ListenerState, TransportError, TransportResult};
use crate::observability::metrics;
use crate::resilience::backoff::Backoff;

/// Echo server serving one connection at a time.
#[derive(Debug)]
pub struct EchoServer {
    listener: Listener,
    accept_backoff: BackoffConfig,
}

impl EchoServer {
    /// Bind and listen as configured. Failures here are fatal.
    pub async fn bind(config: &ServerConfig) -> TransportResult<Self> {
        let listener = Listener::bind_and_listen(&config.listener, &config.framing).await?;
        Self::new(listener, config.accept_backoff.clone())
    }

    /// Wrap a listener that is already listening.
    pub fn new(listener: Listener, accept_backoff: BackoffConfig) -> TransportResult<Self> {
        if listener.state() != ListenerState::Listening {
            return Err(TransportError::new(
                ErrorKind::Listen,
                format!("echo server needs a listening endpoint, got {:?}", listener.state()),
            ));
        }
        Ok(Self {
            listener,
            accept_backoff,
        })
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept forever.
    ///
    /// Returns `Ok(())` once the listener has been closed. Accept failures are
    /// logged and retried after a backoff delay.
    pub async fn run(&self) -> TransportResult<()> {
        let mut backoff = Backoff::new(self.accept_backoff.clone());
        loop {
            match self.serve_next().await {
                Ok(()) => backoff.reset(),
                Err(e) => match on_accept_error(&mut backoff, e)? {
                    AcceptStep::Retry(delay) => tokio::time::sleep(delay).await,
                    AcceptStep::Stop => return Ok(()),
                },
            }
        }
    }

    /// Accept one connection and serve it until it ends.
    ///
    /// Only accept failures are returned; whatever happens on the accepted
    /// connection is logged and swallowed.
    pub async fn serve_next(&self) -> TransportResult<()> {
        let conn = self.listener.accept().await?;
        handle_connection(conn).await;
        Ok(())
    }

    /// Release the listening socket.
    pub fn close(&mut self) {
        self.listener.close();
    }
}

/// What the accept loop does after `accept` failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AcceptStep {
    /// Wait this long, then accept again.
    Retry(Duration),
    /// The listener is closed.
    Stop,
}

/// Decide how the accept loop continues after `err`.
///
/// A closed listener ends the loop, setup failures propagate, and every
/// other failure is counted and retried after a backoff delay.
fn on_accept_error(backoff: &mut Backoff, err: TransportError) -> TransportResult<AcceptStep> {
    if err.is_connection_closed() {
        tracing::info!("Listener closed, accept loop stopping");
        return Ok(AcceptStep::Stop);
    }
    if err.is_fatal() {
        return Err(err);
    }

    metrics::record_accept_error();
    let delay = backoff.next_delay();
    tracing::warn!(
        error = %err,
        consecutive_failures = backoff.failures(),
        retry_in_ms = delay.as_millis() as u64,
        "Accept failed"
    );
    Ok(AcceptStep::Retry(delay))
}

async fn handle_connection(mut conn: Connection) {
    let id = conn.id();
    let peer_addr = conn.peer_addr();
    tracing::info!(
        connection_id = %id,
        peer_addr = %peer_addr,
        max_frame_size = conn.max_frame_size(),
        "Serving connection"
    );

    match serve_connection(&mut conn).await {
        Ok(frames) => {
            tracing::info!(connection_id = %id, frames, "Peer closed connection");
        }
        Err(e) => {
            metrics::record_connection_failed(e.kind().as_str());
            tracing::warn!(
                connection_id = %id,
                peer_addr = %peer_addr,
                error = %e,
                "Connection failed"
            );
        }
    }
    conn.close().await;
}

/// Echo frames on `conn` until the peer closes between frames.
///
/// Returns the number of frames echoed. A peer that hangs up mid-frame, or
/// any I/O failure, is returned as an error.
pub async fn serve_connection(conn: &mut Connection) -> TransportResult<u64> {
    let mut frames = 0u64;
    loop {
        let payload = match conn.receive().await {
            Ok(payload) => payload,
            Err(e) if e.is_connection_closed() => return Ok(frames),
            Err(e) => return Err(e),
        };
        tracing::debug!(connection_id = %conn.id(), payload_len = payload.len(), "Echoing frame");
        conn.send(&payload).await?;
        frames += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FramingConfig, ListenerConfig};
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpStream;

    fn loopback_config() -> ServerConfig {
        ServerConfig {
            listener: ListenerConfig {
                host: "127.0.0.1".into(),
                port: 0,
                backlog: 5,
            },
            ..ServerConfig::default()
        }
    }

    #[tokio::test]
    async fn requires_listening_endpoint() {
        let listener = Listener::new(&FramingConfig::default());
        let err = EchoServer::new(listener, BackoffConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Listen);
    }

    #[tokio::test]
    async fn serve_next_echoes_until_close() {
        let server = EchoServer::bind(&loopback_config()).await.unwrap();
        let port = server.local_addr().unwrap().port();

        let client = async {
            let mut conn = Connection::connect("127.0.0.1", port, &FramingConfig::default())
                .await
                .unwrap();
            conn.send(b"hello").await.unwrap();
            let first = conn.receive().await.unwrap();
            conn.send(b"").await.unwrap();
            let second = conn.receive().await.unwrap();
            conn.close().await;
            (first, second)
        };

        let (served, (first, second)) = tokio::join!(server.serve_next(), client);
        served.unwrap();
        assert_eq!(first, b"hello");
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn truncated_frame_is_swallowed() {
        let server = EchoServer::bind(&loopback_config()).await.unwrap();
        let addr = server.local_addr().unwrap();

        let client = async {
            let mut raw = TcpStream::connect(addr).await.unwrap();
            // Header promises 100 bytes, only 3 arrive before the close.
            raw.write_all(&[0, 0, 0, 100, 1, 2, 3]).await.unwrap();
            drop(raw);
        };

        let (served, ()) = tokio::join!(server.serve_next(), client);
        assert!(served.is_ok());
    }

    #[tokio::test]
    async fn run_stops_when_listener_closed() {
        let mut server = EchoServer::bind(&loopback_config()).await.unwrap();
        server.close();
        server.run().await.unwrap();
    }

    fn test_backoff() -> Backoff {
        Backoff::new(BackoffConfig {
            base_delay_ms: 10,
            max_delay_ms: 1000,
        })
    }

    #[test]
    fn accept_error_retries_with_growing_delay() {
        let mut backoff = test_backoff();
        let first = on_accept_error(
            &mut backoff,
            TransportError::new(ErrorKind::Accept, "too many open files"),
        )
        .unwrap();
        let second = on_accept_error(
            &mut backoff,
            TransportError::new(ErrorKind::Accept, "too many open files"),
        )
        .unwrap();

        match (first, second) {
            (AcceptStep::Retry(a), AcceptStep::Retry(b)) => {
                assert!(a >= Duration::from_millis(10));
                assert!(b >= Duration::from_millis(20));
            }
            other => panic!("expected two retries, got {other:?}"),
        }
        assert_eq!(backoff.failures(), 2);
    }

    #[test]
    fn closed_listener_stops_the_loop() {
        let mut backoff = test_backoff();
        let step = on_accept_error(&mut backoff, TransportError::closed("listener is closed")).unwrap();
        assert_eq!(step, AcceptStep::Stop);
        assert_eq!(backoff.failures(), 0);
    }

    #[test]
    fn setup_errors_propagate() {
        let mut backoff = test_backoff();
        let err = on_accept_error(&mut backoff, TransportError::new(ErrorKind::Listen, "not listening"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Listen);
    }

    #[tokio::test]
    async fn serves_again_after_accept_error() {
        let server = EchoServer::bind(&loopback_config()).await.unwrap();
        let port = server.local_addr().unwrap().port();

        let mut backoff = test_backoff();
        let step = on_accept_error(&mut backoff, TransportError::new(ErrorKind::Accept, "aborted")).unwrap();
        assert!(matches!(step, AcceptStep::Retry(_)));

        let client = async {
            let mut conn = Connection::connect("127.0.0.1", port, &FramingConfig::default())
                .await
                .unwrap();
            conn.send(b"again").await.unwrap();
            let reply = conn.receive().await.unwrap();
            conn.close().await;
            reply
        };
        let (served, reply) = tokio::join!(server.serve_next(), client);
        served.unwrap();
        assert_eq!(reply, b"again");
    }
}

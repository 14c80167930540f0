//! Shared utilities for integration tests.

use std::net::SocketAddr;
use tokio::task::JoinHandle;

use socket_echo::config::{ListenerConfig, ServerConfig};
use socket_echo::EchoServer;

/// Config for a loopback server on an ephemeral port.
pub fn loopback_config() -> ServerConfig {
    ServerConfig {
        listener: ListenerConfig {
            host: "127.0.0.1".into(),
            port: 0,
            backlog: 8,
        },
        ..ServerConfig::default()
    }
}

/// Start an echo server in the background. Abort the handle to stop it.
pub async fn start_echo_server(config: ServerConfig) -> (SocketAddr, JoinHandle<()>) {
    let server = EchoServer::bind(&config).await.unwrap();
    let addr = server.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let _ = server.run().await;
    });
    (addr, handle)
}

/// A loopback port with nothing listening on it.
#[allow(dead_code)]
pub fn unused_port() -> u16 {
    let probe = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    probe.local_addr().unwrap().port()
}

/// Random payload of `len` bytes.
#[allow(dead_code)]
pub fn random_payload(len: usize) -> Vec<u8> {
    use rand::RngCore;
    let mut payload = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut payload);
    payload
}

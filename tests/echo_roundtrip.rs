//! End-to-end echo tests over loopback TCP.

use socket_echo::config::{ClientConfig, FramingConfig};
use socket_echo::echo::client::request;
use socket_echo::{Connection, ErrorKind};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

mod common;

fn client_for(port: u16) -> ClientConfig {
    ClientConfig {
        host: "127.0.0.1".into(),
        port,
        ..ClientConfig::default()
    }
}

#[tokio::test]
async fn test_request_returns_identical_payload() {
    let (addr, server) = common::start_echo_server(common::loopback_config()).await;

    let reply = request(&client_for(addr.port()), b"Test message.").await.unwrap();
    assert_eq!(reply, b"Test message.");

    server.abort();
}

#[tokio::test]
async fn test_arbitrary_payloads_round_trip() {
    let (addr, server) = common::start_echo_server(common::loopback_config()).await;
    let mut conn = Connection::connect("127.0.0.1", addr.port(), &FramingConfig::default())
        .await
        .unwrap();

    let payloads = vec![
        Vec::new(),
        vec![0, 0, 0, 0],
        vec![0, 0, 0, 4, 0xde, 0xad, 0xbe, 0xef],
        vec![0xff; 3],
        common::random_payload(1000),
        common::random_payload(65_537),
    ];
    for payload in &payloads {
        conn.send(payload).await.unwrap();
        let reply = conn.receive().await.unwrap();
        assert_eq!(&reply, payload);
    }
    conn.close().await;

    server.abort();
}

#[tokio::test]
async fn test_multi_megabyte_payload() {
    let (addr, server) = common::start_echo_server(common::loopback_config()).await;

    let payload = common::random_payload(6 * 1024 * 1024);
    let reply = request(&client_for(addr.port()), &payload).await.unwrap();
    assert_eq!(reply.len(), payload.len());
    assert!(reply == payload);

    server.abort();
}

#[tokio::test]
async fn test_empty_frame_is_not_a_close() {
    let (addr, server) = common::start_echo_server(common::loopback_config()).await;

    let mut raw = TcpStream::connect(addr).await.unwrap();
    raw.write_all(&[0, 0, 0, 0]).await.unwrap();
    let mut echoed = [0xAAu8; 4];
    raw.read_exact(&mut echoed).await.unwrap();
    assert_eq!(echoed, [0, 0, 0, 0]);

    // The connection is still being served after the empty frame.
    raw.write_all(&[0, 0, 0, 2, b'o', b'k']).await.unwrap();
    let mut echoed = [0u8; 6];
    raw.read_exact(&mut echoed).await.unwrap();
    assert_eq!(&echoed, &[0, 0, 0, 2, b'o', b'k']);

    server.abort();
}

#[tokio::test]
async fn test_byte_at_a_time_writer() {
    let (addr, server) = common::start_echo_server(common::loopback_config()).await;

    let mut raw = TcpStream::connect(addr).await.unwrap();
    raw.set_nodelay(true).unwrap();
    let frame = [0u8, 0, 0, 5, b'h', b'e', b'l', b'l', b'o'];
    for byte in frame {
        raw.write_all(&[byte]).await.unwrap();
        raw.flush().await.unwrap();
        tokio::task::yield_now().await;
    }
    let mut echoed = [0u8; 9];
    raw.read_exact(&mut echoed).await.unwrap();
    assert_eq!(echoed, frame);

    server.abort();
}

#[tokio::test]
async fn test_oversized_frame_ends_connection() {
    let mut config = common::loopback_config();
    config.framing.max_frame_size = 16;
    let (addr, server) = common::start_echo_server(config).await;

    let mut raw = TcpStream::connect(addr).await.unwrap();
    raw.write_all(&[0, 0, 0, 17]).await.unwrap();

    // The server rejects the header and closes without echoing anything.
    let mut buf = Vec::new();
    let read = raw.read_to_end(&mut buf).await;
    assert!(read.is_err() || buf.is_empty());

    server.abort();
}

#[tokio::test]
async fn test_client_rejects_oversized_reply_limit() {
    let (addr, server) = common::start_echo_server(common::loopback_config()).await;

    let mut config = client_for(addr.port());
    config.framing.max_frame_size = 4;
    let err = request(&config, b"too long").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Send);

    server.abort();
}

//! One-shot echo client.

use crate::config::ClientConfig;
use crate::net::{Connection, TransportResult};

/// Header printed before the server's reply.
pub const RESPONSE_BANNER: &str = "The response from the server:";

/// Send `payload` as one frame and return the single frame sent back.
///
/// The connection is closed on every path, including errors.
pub async fn request(config: &ClientConfig, payload: &[u8]) -> TransportResult<Vec<u8>> {
    let mut conn = Connection::connect(&config.host, config.port, &config.framing).await?;
    let result = exchange(&mut conn, payload).await;
    conn.close().await;
    result
}

async fn exchange(conn: &mut Connection, payload: &[u8]) -> TransportResult<Vec<u8>> {
    conn.send(payload).await?;
    let reply = conn.receive().await?;
    tracing::debug!(
        connection_id = %conn.id(),
        sent = payload.len(),
        received = reply.len(),
        "Exchange complete"
    );
    Ok(reply)
}

/// Render a reply the way the client prints it.
pub fn format_response(reply: &[u8]) -> String {
    format!("{}\n\"{}\"\n", RESPONSE_BANNER, String::from_utf8_lossy(reply))
}

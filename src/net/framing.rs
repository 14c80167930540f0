//! Length-prefixed message framing.
//!
//! # Wire Format
//! ```text
//! ┌──────────────────────┬──────────────────────────┐
//! │ length: u32 (BE)     │ payload: `length` bytes  │
//! └──────────────────────┴──────────────────────────┘
//! ```
//!
//! The length is authoritative: no delimiter, no escaping. A stream may
//! commit or deliver only part of a buffer per call, so both directions
//! loop until the whole frame has moved.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::error::{ErrorKind, TransportError, TransportResult};

/// Size of the length prefix in bytes.
pub const HEADER_LEN: usize = 4;

/// Default upper bound on a frame payload (16 MiB).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024 * 1024;

/// Encode a payload length as the frame header.
pub fn encode_header(len: u32) -> [u8; HEADER_LEN] {
    len.to_be_bytes()
}

/// Decode a frame header into the payload length.
pub fn decode_header(header: [u8; HEADER_LEN]) -> u32 {
    u32::from_be_bytes(header)
}

/// Write one complete frame.
///
/// Returns once every byte has been handed to the writer and flushed. This
/// says nothing about whether the peer has read it.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8], max_frame_size: usize) -> TransportResult<()>
where
    W: AsyncWrite + Unpin,
{
    if payload.len() > max_frame_size {
        return Err(TransportError::new(
            ErrorKind::Send,
            format!(
                "payload of {} bytes exceeds maximum frame size of {} bytes",
                payload.len(),
                max_frame_size
            ),
        ));
    }
    let len = u32::try_from(payload.len()).map_err(|_| {
        TransportError::new(
            ErrorKind::Send,
            format!("payload of {} bytes does not fit a u32 length prefix", payload.len()),
        )
    })?;

    write_fully(writer, &encode_header(len), "frame header").await?;
    write_fully(writer, payload, "frame payload").await?;
    writer
        .flush()
        .await
        .map_err(|e| TransportError::io(ErrorKind::Send, "flush", e))?;

    tracing::trace!(payload_len = len, "Frame written");
    Ok(())
}

/// Read one complete frame and return its payload.
///
/// End of stream before the first header byte is a clean close and yields
/// `ConnectionClosed`. End of stream anywhere later is a truncated frame and
/// yields `Receive`. A length above `max_frame_size` is rejected before any
/// payload byte is read or allocated.
pub async fn read_frame<R>(reader: &mut R, max_frame_size: usize) -> TransportResult<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_LEN];
    let got = read_fully(reader, &mut header).await?;
    if got == 0 {
        return Err(TransportError::closed("peer closed the connection"));
    }
    if got < HEADER_LEN {
        return Err(TransportError::new(
            ErrorKind::Receive,
            format!("truncated frame: peer closed after {} of {} header bytes", got, HEADER_LEN),
        ));
    }

    let len = decode_header(header) as usize;
    if len > max_frame_size {
        return Err(TransportError::new(
            ErrorKind::Receive,
            format!(
                "frame length {} exceeds maximum frame size of {} bytes",
                len, max_frame_size
            ),
        ));
    }

    let mut payload = vec![0u8; len];
    let got = read_fully(reader, &mut payload).await?;
    if got < len {
        return Err(TransportError::new(
            ErrorKind::Receive,
            format!("truncated frame: peer closed after {} of {} payload bytes", got, len),
        ));
    }

    tracing::trace!(payload_len = len, "Frame read");
    Ok(payload)
}

/// Write all of `buf`, looping over partial writes.
async fn write_fully<W>(writer: &mut W, buf: &[u8], what: &str) -> TransportResult<()>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;
    while written < buf.len() {
        match writer.write(&buf[written..]).await {
            Ok(0) => {
                return Err(TransportError::new(
                    ErrorKind::Send,
                    format!("write of {} returned zero after {} of {} bytes", what, written, buf.len()),
                ));
            }
            Ok(n) => written += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(TransportError::io(ErrorKind::Send, format!("write {}", what), e)),
        }
    }
    Ok(())
}

/// Fill `buf`, looping over partial reads. Returns fewer bytes than
/// `buf.len()` only when the stream ended.
async fn read_fully<R>(reader: &mut R, buf: &mut [u8]) -> TransportResult<usize>
where
    R: AsyncRead + Unpin,
{
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]).await {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(TransportError::io(ErrorKind::Receive, "read", e)),
        }
    }
    Ok(filled)
}

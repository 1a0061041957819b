//! Length-prefixed framing.
//!
//! Every message on the socket is one frame:
//!
//! ```text
//! <decimal byte length>:<payload>
//! 32:{"applicationType":"gecko",...}
//! ```
//!
//! The payload boundary is authoritative; nothing trails it. Reads tolerate
//! arbitrary TCP fragmentation and writes loop until every byte is flushed.

// ============================================================================
// Imports
// ============================================================================

use std::io::ErrorKind;

use tokio::io::{AsyncBufRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Separates the length prefix from the payload.
pub const DELIMITER: u8 = b':';

/// Upper bound on the buffer reserved before payload bytes arrive.
const INITIAL_PAYLOAD_CAPACITY: usize = 64 * 1024;

/// Longest accepted length prefix (digits in `u64::MAX`).
pub const MAX_PREFIX_LEN: usize = 20;

// ============================================================================
// Encoding
// ============================================================================

/// Builds the wire bytes of one frame.
#[must_use]
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    let prefix = payload.len().to_string();
    let mut frame = Vec::with_capacity(prefix.len() + 1 + payload.len());
    frame.extend_from_slice(prefix.as_bytes());
    frame.push(DELIMITER);
    frame.extend_from_slice(payload);
    frame
}

/// Writes one frame and flushes it.
///
/// # Errors
///
/// Returns [`Error::Io`] if the socket rejects the write.
pub async fn write_frame<W>(writer: &mut W, payload: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&encode_frame(payload)).await?;
    writer.flush().await?;

    trace!(len = payload.len(), "Frame written");
    Ok(())
}

// ============================================================================
// Decoding
// ============================================================================

/// Reads one frame and returns its payload.
///
/// # Errors
///
/// - [`Error::ConnectionClosed`] if the stream ends before a frame starts
/// - [`Error::Frame`] if the prefix is malformed, exceeds `max_frame_size`,
///   or the stream ends inside the frame
/// - [`Error::Io`] on socket failure
pub async fn read_frame<R>(reader: &mut R, max_frame_size: usize) -> Result<Vec<u8>>
where
    R: AsyncBufRead + Unpin,
{
    let length = read_length_prefix(reader).await?;

    if length > max_frame_size {
        return Err(Error::frame(format!(
            "frame of {length} bytes exceeds limit of {max_frame_size}"
        )));
    }

    // The buffer grows with the bytes that actually arrive.
    let mut payload = Vec::with_capacity(length.min(INITIAL_PAYLOAD_CAPACITY));
    (&mut *reader)
        .take(length as u64)
        .read_to_end(&mut payload)
        .await?;

    if payload.len() < length {
        return Err(Error::truncated_frame(payload.len(), length));
    }

    trace!(len = length, "Frame read");
    Ok(payload)
}

/// Reads digits up to the delimiter and parses them.
async fn read_length_prefix<R>(reader: &mut R) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut prefix = Vec::with_capacity(MAX_PREFIX_LEN);

    loop {
        let byte = match reader.read_u8().await {
            Ok(byte) => byte,
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                return Err(if prefix.is_empty() {
                    Error::ConnectionClosed
                } else {
                    Error::frame("connection closed inside length prefix")
                });
            }
            Err(e) => return Err(e.into()),
        };

        if byte == DELIMITER {
            break;
        }

        if !byte.is_ascii_digit() {
            return Err(Error::frame(format!(
                "invalid byte 0x{byte:02x} in length prefix"
            )));
        }

        if prefix.len() == MAX_PREFIX_LEN {
            return Err(Error::frame(format!(
                "no delimiter within {MAX_PREFIX_LEN} bytes"
            )));
        }

        prefix.push(byte);
    }

    if prefix.is_empty() {
        return Err(Error::frame("empty length prefix"));
    }

    // Digits only, so the prefix is valid UTF-8.
    let digits = String::from_utf8_lossy(&prefix);
    digits
        .parse::<usize>()
        .map_err(|e| Error::frame(format!("invalid length prefix {digits}: {e}")))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use proptest::prelude::*;
    use tokio::io::{BufReader, duplex};
    use tokio_test::io::Builder;

    const LIMIT: usize = 1 << 20;

    async fn decode(bytes: &[u8]) -> Result<Vec<u8>> {
        let mut reader = BufReader::new(bytes);
        read_frame(&mut reader, LIMIT).await
    }

    #[test]
    fn test_encode_frame() {
        assert_eq!(encode_frame(b"hello"), b"5:hello");
        assert_eq!(encode_frame(b""), b"0:");
    }

    #[tokio::test]
    async fn test_roundtrip_empty() {
        assert_eq!(decode(b"0:").await.expect("read"), b"");
    }

    #[tokio::test]
    async fn test_roundtrip_large_payload() {
        let payload: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        let frame = encode_frame(&payload);
        assert_eq!(decode(&frame).await.expect("read"), payload);
    }

    #[tokio::test]
    async fn test_reads_consecutive_frames() {
        let mut bytes = encode_frame(b"first");
        bytes.extend(encode_frame(b"second"));
        let mut reader = BufReader::new(&bytes[..]);

        assert_eq!(read_frame(&mut reader, LIMIT).await.expect("first"), b"first");
        assert_eq!(read_frame(&mut reader, LIMIT).await.expect("second"), b"second");
        assert!(matches!(
            read_frame(&mut reader, LIMIT).await,
            Err(Error::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn test_fragmented_reads() {
        let mock = Builder::new()
            .read(b"1")
            .read(b"1:hel")
            .read(b"lo")
            .read(b" world")
            .build();
        let mut reader = BufReader::new(mock);

        let payload = read_frame(&mut reader, LIMIT).await.expect("read");
        assert_eq!(payload, b"hello world");
    }

    #[tokio::test]
    async fn test_truncated_payload() {
        let mock = Builder::new().read(b"50:{\"a\":").build();
        let mut reader = BufReader::new(mock);

        let err = read_frame(&mut reader, LIMIT).await.unwrap_err();
        assert!(err.is_frame_error());
        assert!(err.to_string().contains("after 5 of 50"));
    }

    #[tokio::test]
    async fn test_oversized_declaration_then_close() {
        let mock = Builder::new().read(b"268435456:").build();
        let mut reader = BufReader::new(mock);

        let err = read_frame(&mut reader, 256 * 1024 * 1024).await.unwrap_err();
        assert!(err.is_frame_error());
        assert!(err.to_string().contains("after 0 of 268435456"));
    }

    #[tokio::test]
    async fn test_eof_inside_prefix() {
        let err = decode(b"12").await.unwrap_err();
        assert!(err.is_frame_error());
    }

    #[tokio::test]
    async fn test_eof_before_frame() {
        assert!(matches!(decode(b"").await, Err(Error::ConnectionClosed)));
    }

    #[tokio::test]
    async fn test_rejects_non_digit_prefix() {
        let inputs: [&[u8]; 4] = [b"abc:xyz", b"+5:hello", b" 5:hello", b"-1:"];
        for bytes in inputs {
            let err = decode(bytes).await.unwrap_err();
            assert!(err.is_frame_error(), "{err}");
        }
    }

    #[tokio::test]
    async fn test_rejects_empty_prefix() {
        assert!(decode(b":{}").await.unwrap_err().is_frame_error());
    }

    #[tokio::test]
    async fn test_rejects_missing_delimiter() {
        let bytes = vec![b'1'; MAX_PREFIX_LEN + 5];
        let err = decode(&bytes).await.unwrap_err();
        assert!(err.to_string().contains("no delimiter"));
    }

    #[tokio::test]
    async fn test_rejects_oversized_frame() {
        let mut reader = BufReader::new(&b"11:hello world"[..]);
        let err = read_frame(&mut reader, 10).await.unwrap_err();
        assert!(err.to_string().contains("exceeds limit"));
    }

    #[tokio::test]
    async fn test_rejects_prefix_overflow() {
        let err = decode(b"99999999999999999999:").await.unwrap_err();
        assert!(err.is_frame_error());
    }

    #[tokio::test]
    async fn test_write_frame() {
        let mut mock = Builder::new().write(b"4:null").build();
        write_frame(&mut mock, b"null").await.expect("write");
    }

    #[tokio::test]
    async fn test_write_frame_survives_partial_writes() {
        let payload: Vec<u8> = (0..70_000u32).map(|i| (i % 97) as u8).collect();
        let (mut client, server) = duplex(16);

        let expected = payload.clone();
        let reader = tokio::spawn(async move {
            let mut reader = BufReader::new(server);
            read_frame(&mut reader, LIMIT).await
        });

        write_frame(&mut client, &payload).await.expect("write");

        let received = tokio::time::timeout(Duration::from_secs(5), reader)
            .await
            .expect("reader finished")
            .expect("reader task")
            .expect("frame");
        assert_eq!(received, expected);
    }

    proptest! {
        #[test]
        fn prop_frame_roundtrip(payload in proptest::collection::vec(any::<u8>(), 0..4096)) {
            let frame = encode_frame(&payload);
            let decoded = tokio_test::block_on(decode(&frame)).expect("read");
            prop_assert_eq!(decoded, payload);
        }
    }
}

//! Framed codec for extension communication.
//!
//! Uses LengthDelimitedCodec for framing + serde_json for serialization.
//! Works over any AsyncRead/AsyncWrite (stdio pipes in production, in-memory
//! duplex streams in tests).

use std::io;
use std::marker::PhantomData;

use serde::{Serialize, de::DeserializeOwned};
use tokio_util::bytes::{Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder, LengthDelimitedCodec};

/// Largest payload accepted or produced, matching the browser's cap on
/// messages from a native host. A frame declaring more than this is rejected
/// before any payload bytes are consumed.
pub const MAX_FRAME_LEN: usize = 1024 * 1024;

/// Errors produced while reading or writing frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Stream truncated mid-prefix or mid-payload, a declared length above
    /// [`MAX_FRAME_LEN`], or an I/O failure on the underlying stream. The
    /// channel is no longer frame-aligned and cannot be resynchronized.
    #[error("framing error: {0}")]
    Framing(#[from] io::Error),

    /// Payload bytes are not the UTF-8 JSON shape the channel carries.
    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Codec that frames messages with a length prefix and serializes with JSON.
///
/// Wraps LengthDelimitedCodec and adds serde_json serialization. The prefix
/// is a 4-byte unsigned integer in the host's native byte order, the framing
/// the browser uses on both directions of a native messaging channel.
pub struct JsonCodec<T> {
    inner: LengthDelimitedCodec,
    /// True once a length prefix has been consumed but its payload has not
    /// fully arrived. Distinguishes truncation from a clean close at EOF.
    mid_frame: bool,
    _phantom: PhantomData<T>,
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> JsonCodec<T> {
    pub fn new() -> Self {
        Self {
            inner: LengthDelimitedCodec::builder()
                .length_field_length(4)
                .native_endian()
                .max_frame_length(MAX_FRAME_LEN)
                .new_codec(),
            mid_frame: false,
            _phantom: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> Decoder for JsonCodec<T> {
    type Item = T;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let before = src.len();
        match self.inner.decode(src)? {
            Some(bytes) => {
                self.mid_frame = false;
                Ok(Some(serde_json::from_slice(&bytes)?))
            }
            None => {
                // The inner codec strips the prefix from the buffer as soon
                // as it arrives; anything consumed without producing a frame
                // means a payload is still outstanding.
                if src.len() != before {
                    self.mid_frame = true;
                }
                Ok(None)
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(item) => Ok(Some(item)),
            None if self.mid_frame || !src.is_empty() => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stream ended mid-frame",
            )
            .into()),
            None => Ok(None),
        }
    }
}

impl<T: Serialize> Encoder<T> for JsonCodec<T> {
    type Error = FrameError;

    fn encode(&mut self, item: T, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let json = serde_json::to_vec(&item)?;
        tracing::trace!(payload_bytes = json.len(), "encoding frame");
        self.inner.encode(Bytes::from(json), dst)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::protocol::{Request, Response};

    #[test]
    fn codec_roundtrip_request() {
        let mut codec = JsonCodec::<Request>::new();
        let mut buf = BytesMut::new();

        codec.encode(Request::start(), &mut buf).unwrap();
        let decoded = codec.decode(&mut buf).unwrap().unwrap();

        assert_eq!(decoded.action(), Some("start"));
        assert!(buf.is_empty());
    }

    #[test]
    fn codec_roundtrip_response() {
        let mut codec = JsonCodec::<Response>::new();
        let mut buf = BytesMut::new();

        codec.encode(Response::ok("Server started successfully"), &mut buf).unwrap();
        let decoded = codec.decode(&mut buf).unwrap().unwrap();

        assert!(decoded.success);
        assert_eq!(decoded.message, "Server started successfully");
    }

    #[test]
    fn prefix_is_payload_length_in_native_byte_order() {
        let mut codec = JsonCodec::<Response>::new();
        let mut buf = BytesMut::new();

        codec.encode(Response::failed("no"), &mut buf).unwrap();

        let payload_len = buf.len() - 4;
        assert_eq!(buf[..4], (payload_len as u32).to_ne_bytes());

        let payload: Response = serde_json::from_slice(&buf[4..]).unwrap();
        assert!(!payload.success);
    }

    #[test]
    fn partial_frame_yields_none() {
        let mut codec = JsonCodec::<Request>::new();

        // Prefix declares 10 bytes, only 3 have arrived.
        let mut buf = BytesMut::from(&10u32.to_ne_bytes()[..]);
        buf.extend_from_slice(b"{\"a");

        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn oversized_declared_length_is_framing_error() {
        let mut codec = JsonCodec::<Request>::new();
        let mut buf = BytesMut::from(&((MAX_FRAME_LEN as u32) + 1).to_ne_bytes()[..]);

        let err = codec.decode(&mut buf).unwrap_err();
        assert!(matches!(err, FrameError::Framing(_)));
    }

    #[test]
    fn eof_mid_payload_is_framing_error() {
        let mut codec = JsonCodec::<Request>::new();

        let mut buf = BytesMut::from(&100u32.to_ne_bytes()[..]);
        buf.extend_from_slice(b"0123456789");

        assert!(codec.decode(&mut buf).unwrap().is_none());
        let err = codec.decode_eof(&mut buf).unwrap_err();
        assert!(matches!(err, FrameError::Framing(_)));
    }

    #[test]
    fn eof_right_after_prefix_is_framing_error() {
        let mut codec = JsonCodec::<Request>::new();

        // The prefix promises a payload that never arrives at all.
        let mut buf = BytesMut::from(&10u32.to_ne_bytes()[..]);

        assert!(codec.decode(&mut buf).unwrap().is_none());
        let err = codec.decode_eof(&mut buf).unwrap_err();
        assert!(matches!(err, FrameError::Framing(_)));
    }

    #[test]
    fn eof_at_frame_boundary_is_clean() {
        let mut codec = JsonCodec::<Request>::new();
        let mut buf = BytesMut::new();

        codec.encode(Request::start(), &mut buf).unwrap();
        assert!(codec.decode(&mut buf).unwrap().is_some());
        assert!(codec.decode_eof(&mut buf).unwrap().is_none());
    }

    #[test]
    fn invalid_json_payload_is_decode_error() {
        let mut codec = JsonCodec::<Request>::new();

        let payload = b"not json at all";
        let mut buf = BytesMut::from(&(payload.len() as u32).to_ne_bytes()[..]);
        buf.extend_from_slice(payload);

        let err = codec.decode(&mut buf).unwrap_err();
        assert!(matches!(err, FrameError::Decode(_)));
    }
}

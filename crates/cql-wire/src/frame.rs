//! Frame type: header plus owned body bytes.

use bytes::{Bytes, BytesMut};

use crate::{Direction, Limits, error::ProtocolError, header::FrameHeader};

/// One length-delimited CQL protocol frame, with its capture timestamp and
/// stitcher bookkeeping.
///
/// # Invariants
///
/// - `body.len() == header.length() as usize`.
/// - `stream_id() == -1` iff the frame is a server-initiated `EVENT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Parsed 9-byte header.
    pub header: FrameHeader,
    /// Owned body bytes, exactly `header.length()` long.
    pub body: Bytes,
    /// Capture time supplied by the frame source; monotonic per connection
    /// and per direction.
    pub timestamp_ns: u64,
    /// Set by the stitcher once this (request) frame has been matched to a
    /// response. Never set on response frames.
    pub consumed: bool,
}

impl Frame {
    /// Stream id reserved for server-initiated events.
    pub const EVENT_STREAM_ID: i16 = -1;

    /// Construct a frame directly (used by tests and by [`Self::decode`]).
    #[must_use]
    pub fn new(header: FrameHeader, body: impl Into<Bytes>, timestamp_ns: u64) -> Self {
        Self { header, body: body.into(), timestamp_ns, consumed: false }
    }

    /// Client-chosen stream id; `-1` marks a server-initiated event.
    #[must_use]
    pub fn stream_id(&self) -> i16 {
        self.header.stream_id()
    }

    /// Raw opcode byte.
    #[must_use]
    pub fn opcode_byte(&self) -> u8 {
        self.header.opcode()
    }

    /// Decode the next frame from the front of `bytes`.
    ///
    /// On success, returns the frame and the number of bytes consumed
    /// (`9 + length`); the caller advances its offset by that amount.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::NeedMoreData`] if fewer than 9 header bytes, or
    ///   fewer than `length` body bytes, are available yet.
    /// - [`ProtocolError::BodyTooLarge`] if `length` exceeds
    ///   `limits.max_body_len`.
    /// - [`ProtocolError::DirectionMismatch`] if the version byte disagrees
    ///   with `direction`.
    /// - [`ProtocolError::UnknownOpcode`] if the opcode byte is not a known
    ///   request or response opcode for `direction`.
    pub fn decode(
        bytes: &[u8],
        direction: Direction,
        timestamp_ns: u64,
        limits: Limits,
    ) -> Result<(Self, usize), ProtocolError> {
        let header = FrameHeader::from_bytes(bytes, direction)?;

        if header.length() > limits.max_body_len {
            return Err(ProtocolError::BodyTooLarge { length: header.length(), max: limits.max_body_len });
        }

        direction.validate_opcode(header.opcode())?;

        let body_len = header.length() as usize;
        let total_len = FrameHeader::SIZE + body_len;
        if bytes.len() < total_len {
            return Err(ProtocolError::NeedMoreData { needed: total_len, available: bytes.len() });
        }

        let body = Bytes::copy_from_slice(&bytes[FrameHeader::SIZE..total_len]);
        Ok((Self::new(header, body, timestamp_ns), total_len))
    }

    /// Serialize the frame back to wire bytes (used by tests and by
    /// encoders upstream of this crate).
    #[must_use]
    pub fn encode(&self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(FrameHeader::SIZE + self.body.len());
        buf.extend_from_slice(&self.header.to_bytes());
        buf.extend_from_slice(&self.body);
        buf
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::Direction;

    fn sample_frame(stream_id: i16, opcode: u8, body: &[u8]) -> Frame {
        let header = FrameHeader::new(Direction::Request, 0x04, 0x00, stream_id, opcode, body.len() as u32);
        Frame::new(header, Bytes::copy_from_slice(body), 1000)
    }

    #[test]
    fn decode_exact_frame() {
        let frame = sample_frame(1, 0x05, b"");
        let wire = frame.encode();
        let (decoded, consumed) = Frame::decode(&wire, Direction::Request, 1000, Limits::default()).unwrap();
        assert_eq!(decoded, frame);
        assert_eq!(consumed, wire.len());
    }

    #[test]
    fn need_more_data_on_short_header() {
        let result = Frame::decode(&[0u8; 3], Direction::Request, 0, Limits::default());
        assert_eq!(result, Err(ProtocolError::NeedMoreData { needed: 9, available: 3 }));
    }

    #[test]
    fn need_more_data_on_truncated_body() {
        let frame = sample_frame(1, 0x07, b"SELECT 1");
        let wire = frame.encode();
        let truncated = &wire[..wire.len() - 2];
        let result = Frame::decode(truncated, Direction::Request, 0, Limits::default());
        assert_eq!(
            result,
            Err(ProtocolError::NeedMoreData { needed: wire.len(), available: truncated.len() })
        );
    }

    #[test]
    fn body_too_large_is_malformed() {
        let header = FrameHeader::new(Direction::Request, 0x04, 0, 1, 0x07, 1024);
        let bytes = header.to_bytes();
        let limits = Limits { max_body_len: 16 };
        let result = Frame::decode(&bytes, Direction::Request, 0, limits);
        assert_eq!(result, Err(ProtocolError::BodyTooLarge { length: 1024, max: 16 }));
    }

    #[test]
    fn unknown_opcode_is_rejected() {
        let frame = sample_frame(1, 0xFE, b"");
        let wire = frame.encode();
        let result = Frame::decode(&wire, Direction::Request, 0, Limits::default());
        assert_eq!(
            result,
            Err(ProtocolError::UnknownOpcode { opcode: 0xFE, direction: Direction::Request })
        );
    }

    #[test]
    fn event_stream_id_is_negative_one() {
        let frame = sample_frame(-1, 0x0C, b"");
        assert_eq!(frame.stream_id(), Frame::EVENT_STREAM_ID);
    }

    proptest! {
        #[test]
        fn round_trip(
            stream_id in any::<i16>(),
            body in prop::collection::vec(any::<u8>(), 0..256),
        ) {
            // QUERY is a valid request opcode for any stream id, including -1
            // (the decoder does not reject -1 on non-EVENT opcodes itself;
            // that invariant is enforced by the stitcher, not the decoder).
            let frame = sample_frame(stream_id, 0x07, &body);
            let wire = frame.encode();
            let (decoded, consumed) = Frame::decode(&wire, Direction::Request, 1000, Limits::default()).unwrap();
            prop_assert_eq!(decoded, frame);
            prop_assert_eq!(consumed, wire.len());
        }
    }
}

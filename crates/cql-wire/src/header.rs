//! Fixed 9-byte CQL frame header, parsed zero-copy.
//!
//! Layout (big endian), per the CQL binary protocol spec:
//! `version(1) flags(1) stream_id(2) opcode(1) length(4)`.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

use crate::{Direction, error::ProtocolError};

/// Raw 9-byte frame header, castable directly from wire bytes.
///
/// All multi-byte integers are big-endian and stored as raw byte arrays to
/// avoid alignment requirements on the underlying buffer.
#[repr(C, packed)]
#[derive(Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable)]
pub struct FrameHeader {
    version: u8,
    flags: u8,
    stream_id: [u8; 2],
    pub(crate) opcode: u8,
    length: [u8; 4],
}

impl FrameHeader {
    /// Size of the serialized header in bytes.
    pub const SIZE: usize = 9;

    /// High bit of the version byte: set on response frames, clear on
    /// request frames.
    const DIRECTION_BIT: u8 = 0x80;

    /// Parse a header from the front of `bytes`, validating that its
    /// direction bit matches `expected`.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::NeedMoreData`] if fewer than [`Self::SIZE`] bytes
    ///   are available.
    /// - [`ProtocolError::DirectionMismatch`] if the version byte's high bit
    ///   disagrees with `expected`.
    pub fn from_bytes(bytes: &[u8], expected: Direction) -> Result<Self, ProtocolError> {
        let header = Self::ref_from_prefix(bytes)
            .map_err(|_| ProtocolError::NeedMoreData {
                needed: Self::SIZE,
                available: bytes.len(),
            })?
            .0;

        let is_response = header.version & Self::DIRECTION_BIT != 0;
        let matches = match expected {
            Direction::Request => !is_response,
            Direction::Response => is_response,
        };
        if !matches {
            return Err(ProtocolError::DirectionMismatch { expected });
        }

        Ok(*header)
    }

    /// Serialize the header to its 9-byte wire form.
    #[must_use]
    pub fn to_bytes(self) -> [u8; Self::SIZE] {
        let bytes = IntoBytes::as_bytes(&self);
        let mut arr = [0u8; Self::SIZE];
        arr.copy_from_slice(bytes);
        arr
    }

    /// Build a header for a frame travelling in `direction` with the given
    /// protocol version (low 7 bits), flags, stream id, opcode byte, and
    /// body length.
    #[must_use]
    pub fn new(
        direction: Direction,
        version: u8,
        flags: u8,
        stream_id: i16,
        opcode: u8,
        length: u32,
    ) -> Self {
        let direction_bit = match direction {
            Direction::Request => 0,
            Direction::Response => Self::DIRECTION_BIT,
        };
        Self {
            version: (version & 0x7F) | direction_bit,
            flags,
            stream_id: stream_id.to_be_bytes(),
            opcode,
            length: length.to_be_bytes(),
        }
    }

    /// Protocol version, low 7 bits of the version byte.
    #[must_use]
    pub fn protocol_version(&self) -> u8 {
        self.version & 0x7F
    }

    /// Direction implied by the version byte's high bit.
    #[must_use]
    pub fn direction(&self) -> Direction {
        if self.version & Self::DIRECTION_BIT != 0 { Direction::Response } else { Direction::Request }
    }

    /// Raw flags byte (compression, tracing, custom payload, warning).
    #[must_use]
    pub fn flags(&self) -> u8 {
        self.flags
    }

    /// Client-chosen stream id; `-1` marks a server-initiated event.
    #[must_use]
    pub fn stream_id(&self) -> i16 {
        i16::from_be_bytes(self.stream_id)
    }

    /// Raw opcode byte; interpretation depends on [`Self::direction`].
    #[must_use]
    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    /// Declared body length in bytes.
    #[must_use]
    pub fn length(&self) -> u32 {
        u32::from_be_bytes(self.length)
    }
}

impl std::fmt::Debug for FrameHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameHeader")
            .field("version", &format!("{:#04x}", self.version))
            .field("direction", &self.direction())
            .field("flags", &format!("{:#04x}", self.flags))
            .field("stream_id", &self.stream_id())
            .field("opcode", &format!("{:#04x}", self.opcode))
            .field("length", &self.length())
            .finish()
    }
}

impl PartialEq for FrameHeader {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for FrameHeader {}

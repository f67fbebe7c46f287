//! Error types for frame and body decoding.

use thiserror::Error;

/// Errors surfaced while decoding a frame header, body, or primitive.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Fewer than 9 bytes of header, or fewer than `length` body bytes, are
    /// available yet. Not a parse failure — the caller should wait for more
    /// bytes from the framer.
    #[error("need {needed} more bytes, have {available}")]
    NeedMoreData {
        /// Total bytes required to make progress.
        needed: usize,
        /// Bytes actually available.
        available: usize,
    },

    /// The frame's declared body length exceeds the configured ceiling.
    #[error("body length {length} exceeds ceiling {max}")]
    BodyTooLarge {
        /// Declared body length.
        length: u32,
        /// Configured ceiling.
        max: u32,
    },

    /// The opcode byte is not a known request or response opcode for the
    /// direction the decoder is running on.
    #[error("unknown opcode {opcode:#04x} for {direction:?} frame")]
    UnknownOpcode {
        /// Raw opcode byte.
        opcode: u8,
        /// Direction the decoder was run on.
        direction: super::Direction,
    },

    /// The version byte's high bit disagrees with the direction the decoder
    /// is being run on.
    #[error("frame direction mismatch: expected {expected:?}, version byte implies otherwise")]
    DirectionMismatch {
        /// Direction the decoder was run on.
        expected: super::Direction,
    },

    /// A body primitive or opcode-specific shape failed to parse.
    #[error("malformed body ({opcode:#04x}): {reason}")]
    Malformed {
        /// Opcode of the frame whose body failed to parse.
        opcode: u8,
        /// Human-readable description of what went wrong.
        reason: String,
    },
}

/// Convenience alias for decoder results.
pub type Result<T> = std::result::Result<T, ProtocolError>;

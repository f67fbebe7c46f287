//! Stitcher-level errors. These never abort stitching; they are converted
//! to [`crate::Diagnostic`] values by the caller of the per-frame processing
//! functions and logged via `tracing`.

use thiserror::Error;

/// Errors raised while processing a single frame into a [`crate::Request`]
/// or [`crate::Response`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StitchError {
    /// The frame's body failed to decode.
    #[error("malformed body: {0}")]
    Malformed(#[from] cql_wire::ProtocolError),

    /// A recognized opcode with no per-message processor (forward
    /// compatibility fallback; none of the opcodes enumerated in this
    /// crate currently hit this arm).
    #[error("no processor for opcode {opcode:#04x}")]
    UnhandledOpcode {
        /// Raw opcode byte.
        opcode: u8,
    },

    /// A response arrived with no live request sharing its stream id.
    #[error("no matching request for stream {stream_id} (opcode {opcode:#04x})")]
    NoMatchingRequest {
        /// Stream id carried by the orphaned response.
        stream_id: i16,
        /// Opcode of the orphaned response.
        opcode: u8,
    },

    /// A response carried `stream_id == -1` but an opcode other than
    /// `EVENT` (the only opcode allowed to be solitary).
    #[error("invariant violation: stream id -1 with non-EVENT opcode {opcode:#04x}")]
    InvariantViolation {
        /// Opcode of the offending response.
        opcode: u8,
    },
}

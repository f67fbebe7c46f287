//! CQL (Cassandra) wire protocol frame and body decoding.
//!
//! This crate is the "Frame Decoder" and "Body Decoder" components of the
//! CQL stitching engine: pure, allocation-conscious parsers that turn raw
//! socket bytes into typed values. It performs no I/O and holds no
//! connection state — that lives in `cql-stitch`.

pub mod body;
mod error;
mod frame;
mod header;
mod opcode;

pub use error::{ProtocolError, Result};
pub use frame::Frame;
pub use header::FrameHeader;
pub use opcode::{ReqOp, RespOp, ResultKind};

/// Which byte stream (request or response direction of a TCP connection) a
/// decoder is being run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Client-to-server byte stream.
    Request,
    /// Server-to-client byte stream.
    Response,
}

impl Direction {
    pub(crate) fn validate_opcode(self, opcode: u8) -> Result<()> {
        let recognized = match self {
            Self::Request => ReqOp::from_byte(opcode).is_some(),
            Self::Response => RespOp::from_byte(opcode).is_some(),
        };
        if recognized {
            Ok(())
        } else {
            Err(ProtocolError::UnknownOpcode { opcode, direction: self })
        }
    }
}

/// Configurable decoding ceilings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum accepted frame body length, in bytes. The CQL spec's own
    /// ceiling is 256 MiB.
    pub max_body_len: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self { max_body_len: 256 * 1024 * 1024 }
    }
}

//! The user-visible types emitted by the stitcher: a processed request, a
//! processed response, and the matched pair of the two.

use cql_wire::{ReqOp, RespOp};

/// A request frame after per-message summarization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Decoded request opcode.
    pub op: ReqOp,
    /// Capture timestamp of the originating frame.
    pub timestamp_ns: u64,
    /// Short, human-oriented summary (see `cql_stitch::processor`).
    pub msg: String,
}

/// A response frame after per-message summarization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Decoded response opcode.
    pub op: RespOp,
    /// Capture timestamp of the originating frame.
    pub timestamp_ns: u64,
    /// Short, human-oriented summary (see `cql_stitch::processor`).
    pub msg: String,
}

/// A matched request/response pair, the unit emitted from [`crate::Stitcher::drain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// The request half of the pair (synthesized for solitary events).
    pub req: Request,
    /// The response half of the pair.
    pub resp: Response,
}

impl Record {
    /// Latency in nanoseconds, `resp.timestamp_ns - req.timestamp_ns`.
    ///
    /// Can be negative in practice (clock skew between capture points); see
    /// [`crate::Diagnostic::NegativeLatency`].
    #[must_use]
    pub fn latency_ns(&self) -> i128 {
        i128::from(self.resp.timestamp_ns) - i128::from(self.req.timestamp_ns)
    }
}

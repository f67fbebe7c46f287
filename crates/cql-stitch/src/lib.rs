//! Per-message summarization and request/response stitching for the CQL
//! wire protocol.
//!
//! This crate is the "Per-Message Processor" and "Stitcher" components of
//! the CQL stitching engine: it consumes typed frames from `cql-wire` and
//! produces a stream of matched [`Record`]s. It performs no I/O; callers
//! push frames from their own framer and drain records whenever convenient.

mod config;
mod diagnostic;
mod error;
pub mod processor;
mod record;
mod stitcher;

pub use config::StitcherConfig;
pub use diagnostic::Diagnostic;
pub use error::StitchError;
pub use record::{Record, Request, Response};
pub use stitcher::Stitcher;

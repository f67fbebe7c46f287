//! Fuzz target for `Frame::decode`.
//!
//! Exercises header validation, body-length bounds, and direction/opcode
//! checks with arbitrary byte sequences. Should never panic; all invalid
//! input must return `Err`.

#![no_main]

use cql_wire::{Direction, Frame, Limits};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let _ = Frame::decode(data, Direction::Request, 0, Limits::default());
    let _ = Frame::decode(data, Direction::Response, 0, Limits::default());
});

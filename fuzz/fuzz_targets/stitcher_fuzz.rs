//! Fuzz target for `Stitcher`.
//!
//! Drives a sequence of arbitrary request/response pushes and drains through
//! the stitching state machine. Should never panic, regardless of stream id
//! reuse, out-of-order arrival, or drain timing.

#![no_main]

use arbitrary::Arbitrary;
use cql_stitch::{Stitcher, StitcherConfig};
use cql_wire::{Direction, Frame, FrameHeader};
use libfuzzer_sys::fuzz_target;

// `timestamp_ns` is a delta (not an absolute timestamp) accumulated per
// queue below, so every push lands non-decreasing within its own queue —
// the precondition `Stitcher::push_request`/`push_response` assert on
// (`spec.md`'s caller-supplied-ordering invariant), mirroring how
// `cql-harness`'s `arb_request_response_stream` builds its timestamps.
#[derive(Debug, Arbitrary)]
enum Op {
    PushRequest { stream_id: i16, opcode: u8, body: Vec<u8>, delta_ns: u32 },
    PushResponse { stream_id: i16, opcode: u8, body: Vec<u8>, delta_ns: u32 },
    Drain { now_ns: u64 },
    PruneAged { now_ns: u64 },
}

#[derive(Debug, Arbitrary)]
struct Input {
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let mut stitcher = Stitcher::new(StitcherConfig::default());
    let mut request_clock = 0u64;
    let mut response_clock = 0u64;

    for op in input.ops {
        match op {
            Op::PushRequest { stream_id, opcode, body, delta_ns } => {
                request_clock = request_clock.saturating_add(u64::from(delta_ns));
                let header = FrameHeader::new(Direction::Request, 0x04, 0, stream_id, opcode, body.len() as u32);
                stitcher.push_request(Frame::new(header, body, request_clock));
            }
            Op::PushResponse { stream_id, opcode, body, delta_ns } => {
                response_clock = response_clock.saturating_add(u64::from(delta_ns));
                let header = FrameHeader::new(Direction::Response, 0x84, 0, stream_id, opcode, body.len() as u32);
                stitcher.push_response(Frame::new(header, body, response_clock));
            }
            Op::Drain { now_ns } => {
                let _ = stitcher.drain(now_ns);
            }
            Op::PruneAged { now_ns } => {
                let _ = stitcher.prune_aged(now_ns);
            }
        }
    }
});

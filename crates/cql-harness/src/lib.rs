//! `proptest` `Strategy` generators for CQL frames and request/response
//! interleavings, shared by `cql-wire`'s and `cql-stitch`'s property tests.
//! Dev/test-only; not part of the production dependency graph.

use cql_wire::{Direction, Frame, FrameHeader, ReqOp, RespOp};
use proptest::prelude::*;

/// Build a request-direction frame with the given wire fields.
#[must_use]
pub fn build_request(stream_id: i16, opcode: u8, body: Vec<u8>, timestamp_ns: u64) -> Frame {
    let header = FrameHeader::new(Direction::Request, 0x04, 0, stream_id, opcode, body.len() as u32);
    Frame::new(header, body, timestamp_ns)
}

/// Build a response-direction frame with the given wire fields.
#[must_use]
pub fn build_response(stream_id: i16, opcode: u8, body: Vec<u8>, timestamp_ns: u64) -> Frame {
    let header = FrameHeader::new(Direction::Response, 0x84, 0, stream_id, opcode, body.len() as u32);
    Frame::new(header, body, timestamp_ns)
}

/// An always-valid (empty body) `OPTIONS` request frame.
#[must_use]
pub fn options_request(stream_id: i16, timestamp_ns: u64) -> Frame {
    build_request(stream_id, ReqOp::Options.to_byte(), Vec::new(), timestamp_ns)
}

/// An always-valid (empty body) `READY` response frame.
#[must_use]
pub fn ready_response(stream_id: i16, timestamp_ns: u64) -> Frame {
    build_response(stream_id, RespOp::Ready.to_byte(), Vec::new(), timestamp_ns)
}

/// A valid `STATUS_CHANGE` event frame (stream id `-1`).
#[must_use]
pub fn status_change_event(timestamp_ns: u64, up: bool) -> Frame {
    let change = if up { "UP" } else { "DOWN" };
    let mut body = Vec::new();
    body.extend_from_slice(&13u16.to_be_bytes());
    body.extend_from_slice(b"STATUS_CHANGE");
    body.extend_from_slice(&(change.len() as u16).to_be_bytes());
    body.extend_from_slice(change.as_bytes());
    body.push(4u8);
    body.extend_from_slice(&[10, 0, 0, 1]);
    body.extend_from_slice(&9042i32.to_be_bytes());
    build_response(Frame::EVENT_STREAM_ID, RespOp::Event.to_byte(), body, timestamp_ns)
}

const REQUEST_OPCODES: [u8; 8] = [0x01, 0x05, 0x07, 0x09, 0x0A, 0x0B, 0x0D, 0x0F];
const RESPONSE_OPCODES: [u8; 8] = [0x00, 0x02, 0x03, 0x06, 0x08, 0x0C, 0x0E, 0x10];

/// A single raw frame for `direction` with an arbitrary stream id and body,
/// but an opcode drawn from the set recognized for that direction (so
/// `Frame::decode` always succeeds) — for round-trip testing of the header
/// and frame-length plumbing, not body semantics.
pub fn arb_frame(direction: Direction) -> impl Strategy<Value = Frame> {
    let opcodes: &'static [u8] = match direction {
        Direction::Request => &REQUEST_OPCODES,
        Direction::Response => &RESPONSE_OPCODES,
    };
    (
        any::<i16>(),
        (0..opcodes.len()).prop_map(move |i| opcodes[i]),
        prop::collection::vec(any::<u8>(), 0..128),
        any::<u64>(),
    )
        .prop_map(move |(stream_id, opcode, body, timestamp_ns)| {
            let header = FrameHeader::new(direction, 0x04, 0, stream_id, opcode, body.len() as u32);
            Frame::new(header, body, timestamp_ns)
        })
}

/// `n` requests on distinct stream ids, each a valid `OPTIONS` frame at an
/// increasing timestamp.
pub fn arb_request_burst(max_len: usize) -> impl Strategy<Value = Vec<Frame>> {
    prop::collection::hash_set(1i16..=i16::MAX, 1..=max_len.max(1)).prop_map(|ids| {
        ids.into_iter()
            .enumerate()
            .map(|(i, stream_id)| options_request(stream_id, i as u64 * 10))
            .collect()
    })
}

/// A response burst answering every frame in `requests`, in a randomly
/// permuted order, one `READY` per stream id. Exercises out-of-order
/// response matching (`spec.md` §8 property 1 / scenario 5).
pub fn arb_response_permutation(requests: Vec<Frame>) -> impl Strategy<Value = Vec<Frame>> {
    let stream_ids: Vec<i16> = requests.iter().map(Frame::stream_id).collect();
    let len = stream_ids.len();
    prop::collection::vec(any::<u64>(), len).prop_map(move |keys| {
        let mut order: Vec<usize> = (0..len).collect();
        order.sort_by_key(|&i| keys[i]);
        order
            .into_iter()
            .enumerate()
            .map(|(i, idx)| ready_response(stream_ids[idx], 1_000 + i as u64 * 10))
            .collect()
    })
}

/// A full request burst plus a permuted response burst answering it,
/// composed as a single strategy for property tests that need both.
pub fn arb_request_response_stream(max_len: usize) -> impl Strategy<Value = (Vec<Frame>, Vec<Frame>)> {
    arb_request_burst(max_len).prop_flat_map(|requests| {
        arb_response_permutation(requests.clone()).prop_map(move |responses| (requests.clone(), responses))
    })
}

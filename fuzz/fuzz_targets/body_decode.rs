//! Fuzz target for `ReqBody::decode` / `RespBody::decode`.
//!
//! Runs arbitrary bytes through every known opcode's body decoder. Should
//! never panic; malformed bodies must surface as `CursorError`.

#![no_main]

use cql_wire::body::{ReqBody, RespBody};
use cql_wire::{ReqOp, RespOp};
use libfuzzer_sys::fuzz_target;

const REQ_OPS: [ReqOp; 8] = [
    ReqOp::Startup,
    ReqOp::AuthResponse,
    ReqOp::Options,
    ReqOp::Query,
    ReqOp::Prepare,
    ReqOp::Execute,
    ReqOp::Batch,
    ReqOp::Register,
];

const RESP_OPS: [RespOp; 8] = [
    RespOp::Error,
    RespOp::Ready,
    RespOp::Authenticate,
    RespOp::Supported,
    RespOp::Result,
    RespOp::Event,
    RespOp::AuthChallenge,
    RespOp::AuthSuccess,
];

fuzz_target!(|data: &[u8]| {
    for op in REQ_OPS {
        let _ = ReqBody::decode(op, data);
    }
    for op in RESP_OPS {
        let _ = RespBody::decode(op, data);
    }
});

//! Property tests for the six invariants in `spec.md` §8, driven by the
//! shared harness generators.

use cql_harness::{arb_request_response_stream, status_change_event};
use cql_stitch::{Stitcher, StitcherConfig};
use cql_wire::ReqOp;
use proptest::prelude::*;

proptest! {
    /// Property 1: emitted records appear in the same order as their
    /// response frames were pushed. The harness builds each response burst
    /// with strictly increasing timestamps in push order, so "same order
    /// as pushed" is equivalent to "non-decreasing `resp.timestamp_ns`
    /// across the emitted records".
    #[test]
    fn records_appear_in_response_arrival_order(
        (requests, responses) in arb_request_response_stream(24)
    ) {
        let mut stitcher = Stitcher::new(StitcherConfig::default());
        for frame in requests {
            stitcher.push_request(frame);
        }
        for frame in responses {
            stitcher.push_response(frame);
        }

        let (records, diagnostics) = stitcher.drain(u64::MAX);
        prop_assert!(diagnostics.is_empty());

        let timestamps: Vec<u64> = records.iter().map(|r| r.resp.timestamp_ns).collect();
        let mut sorted = timestamps.clone();
        sorted.sort_unstable();
        prop_assert_eq!(timestamps, sorted);
    }

    /// Property 2: each request frame contributes to at most one record —
    /// checked indirectly by asserting the request queue is fully
    /// tombstoned (and pruned) after a 1:1 matched stream.
    #[test]
    fn each_request_is_consumed_at_most_once(
        (requests, responses) in arb_request_response_stream(24)
    ) {
        let request_count = requests.len();
        let mut stitcher = Stitcher::new(StitcherConfig::default());
        for frame in requests {
            stitcher.push_request(frame);
        }
        for frame in responses {
            stitcher.push_response(frame);
        }

        let (records, _diagnostics) = stitcher.drain(u64::MAX);
        prop_assert!(records.len() <= request_count);
        prop_assert_eq!(stitcher.pending_requests(), 0);
    }
}

#[test]
fn event_synthesis_invariant() {
    let mut stitcher = Stitcher::new(StitcherConfig::default());
    stitcher.push_response(status_change_event(777, false));

    let (records, diagnostics) = stitcher.drain(777);
    assert!(diagnostics.is_empty());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].req.op, ReqOp::Register);
    assert_eq!(records[0].req.msg, "-");
    assert_eq!(records[0].req.timestamp_ns, records[0].resp.timestamp_ns);
}

#[test]
fn idempotence_of_stitching() {
    use cql_harness::{build_request, build_response};
    use cql_wire::RespOp;

    let mut first = Stitcher::new(StitcherConfig::default());
    first.push_request(build_request(1, ReqOp::Options.to_byte(), Vec::new(), 0));
    first.push_response(build_response(1, RespOp::Ready.to_byte(), Vec::new(), 10));
    let (first_records, _) = first.drain(10);

    let mut second = Stitcher::new(StitcherConfig::default());
    second.push_request(build_request(1, ReqOp::Options.to_byte(), Vec::new(), 0));
    second.push_response(build_response(1, RespOp::Ready.to_byte(), Vec::new(), 10));
    let (second_records, _) = second.drain(10);

    assert_eq!(first_records, second_records);
}

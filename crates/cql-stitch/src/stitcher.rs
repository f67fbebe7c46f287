//! The matching state machine: pairs response frames with their earliest
//! unconsumed same-stream request, tombstones matched requests, and prunes
//! aged-out unmatched requests. See the module-level algorithm description
//! in `crate`'s docs for the response-led, first-match-wins rationale.

use std::collections::VecDeque;

use cql_wire::{Direction, Frame, ReqOp, RespOp};

use crate::{Diagnostic, Record, Request, StitcherConfig, processor};

/// Per-connection stitching state: two time-ordered frame queues and the
/// configuration governing request aging.
///
/// `Stitcher` performs no I/O; it is a pure transformation invoked whenever
/// the caller has appended new frames to either queue (`push_request`/
/// `push_response`), matching the Sans-IO discipline used elsewhere in this
/// stack — state in, records and diagnostics out, no ambient clock or
/// logging side effects beyond `tracing` (which a caller can leave
/// unsubscribed in tests).
#[derive(Debug)]
pub struct Stitcher {
    requests: VecDeque<Frame>,
    responses: VecDeque<Frame>,
    config: StitcherConfig,
}

impl Stitcher {
    /// Construct an empty stitcher with the given configuration.
    #[must_use]
    pub fn new(config: StitcherConfig) -> Self {
        Self { requests: VecDeque::new(), responses: VecDeque::new(), config }
    }

    /// Append a request-direction frame to the tail of the request queue.
    ///
    /// # Panics
    ///
    /// Debug builds assert that `frame.timestamp_ns` is non-decreasing
    /// within the queue (`spec.md` §3's ordering invariant).
    pub fn push_request(&mut self, frame: Frame) {
        debug_assert!(
            self.requests.back().is_none_or(|last| last.timestamp_ns <= frame.timestamp_ns),
            "request queue timestamps must be non-decreasing"
        );
        self.requests.push_back(frame);
    }

    /// Append a response-direction frame to the tail of the response queue.
    ///
    /// # Panics
    ///
    /// Debug builds assert that `frame.timestamp_ns` is non-decreasing
    /// within the queue.
    pub fn push_response(&mut self, frame: Frame) {
        debug_assert!(
            self.responses.back().is_none_or(|last| last.timestamp_ns <= frame.timestamp_ns),
            "response queue timestamps must be non-decreasing"
        );
        self.responses.push_back(frame);
    }

    /// Number of requests still retained (unconsumed or not yet pruned).
    #[must_use]
    pub fn pending_requests(&self) -> usize {
        self.requests.len()
    }

    /// Drain every currently queued response, matching each against the
    /// request queue, emitting a [`Record`] (and any [`Diagnostic`]s) per
    /// `spec.md` §4.4's algorithm. `now_ns` is accepted for symmetry with
    /// [`Self::prune_aged`] but is not otherwise consulted here.
    pub fn drain(&mut self, now_ns: u64) -> (Vec<Record>, Vec<Diagnostic>) {
        let _ = now_ns;
        let mut records = Vec::new();
        let mut diagnostics = Vec::new();

        while let Some(response_frame) = self.responses.pop_front() {
            let stream_id = response_frame.stream_id();
            let opcode = response_frame.opcode_byte();

            let Some(op) = RespOp::from_byte(opcode) else {
                diagnostics.push(Diagnostic::UnhandledOpcode { stream_id, opcode });
                continue;
            };

            if stream_id == Frame::EVENT_STREAM_ID && op != RespOp::Event {
                diagnostics.push(Diagnostic::InvariantViolation { opcode });
                continue;
            }

            if op == RespOp::Event {
                self.emit_event(&response_frame, op, &mut records, &mut diagnostics);
                continue;
            }

            self.match_response(response_frame, op, stream_id, opcode, &mut records, &mut diagnostics);
            self.prune_consumed_head();
        }

        (records, diagnostics)
    }

    fn emit_event(
        &self,
        response_frame: &Frame,
        op: RespOp,
        records: &mut Vec<Record>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let synthetic_request =
            Request { op: ReqOp::Register, timestamp_ns: response_frame.timestamp_ns, msg: "-".to_string() };
        match processor::summarize_response(response_frame, op) {
            Ok(resp) => records.push(Record { req: synthetic_request, resp }),
            Err(source) => diagnostics.push(Diagnostic::MalformedBody {
                stream_id: Frame::EVENT_STREAM_ID,
                opcode: response_frame.opcode_byte(),
                source,
            }),
        }
    }

    fn match_response(
        &mut self,
        response_frame: Frame,
        op: RespOp,
        stream_id: i16,
        opcode: u8,
        records: &mut Vec<Record>,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let Some(request_frame) = self
            .requests
            .iter_mut()
            .find(|frame| !frame.consumed && frame.stream_id() == stream_id)
        else {
            diagnostics.push(Diagnostic::NoMatchingRequest { stream_id, opcode });
            return;
        };

        let Some(req_op) = ReqOp::from_byte(request_frame.opcode_byte()) else {
            diagnostics.push(Diagnostic::UnhandledOpcode {
                stream_id,
                opcode: request_frame.opcode_byte(),
            });
            return;
        };

        let req_summary = processor::summarize_request(request_frame, req_op);
        let resp_summary = processor::summarize_response(&response_frame, op);

        match (req_summary, resp_summary) {
            (Ok(req), Ok(resp)) => {
                request_frame.consumed = true;
                if resp.timestamp_ns < req.timestamp_ns {
                    diagnostics.push(Diagnostic::NegativeLatency {
                        stream_id,
                        latency_ns: i128::from(resp.timestamp_ns) - i128::from(req.timestamp_ns),
                    });
                }
                records.push(Record { req, resp });
            },
            (Err(source), _) => {
                diagnostics.push(Diagnostic::MalformedBody {
                    stream_id,
                    opcode: request_frame.opcode_byte(),
                    source,
                });
            },
            (_, Err(source)) => {
                diagnostics.push(Diagnostic::MalformedBody { stream_id, opcode, source });
            },
        }
    }

    fn prune_consumed_head(&mut self) {
        while self.requests.front().is_some_and(|frame| frame.consumed) {
            self.requests.pop_front();
        }
    }

    /// Discard unconsumed requests older than `config.max_age_ns` relative
    /// to `now_ns`, and (as a last-resort back-pressure valve) the oldest
    /// requests beyond `config.max_queue_len`. No record is emitted for a
    /// pruned request; this is the only mechanism that recovers memory
    /// after a lost response (`spec.md` §4.4, "Lost frames and aging").
    ///
    /// Returns the number of requests discarded.
    pub fn prune_aged(&mut self, now_ns: u64) -> usize {
        let before = self.requests.len();

        self.requests.retain(|frame| {
            frame.consumed || now_ns.saturating_sub(frame.timestamp_ns) <= self.config.max_age_ns
        });

        while self.requests.len() > self.config.max_queue_len {
            self.requests.pop_front();
        }

        before - self.requests.len()
    }
}

#[cfg(test)]
mod tests {
    use cql_wire::FrameHeader;

    use super::*;

    fn request_frame(stream_id: i16, opcode: u8, body: &[u8], timestamp_ns: u64) -> Frame {
        let header = FrameHeader::new(Direction::Request, 0x04, 0, stream_id, opcode, body.len() as u32);
        Frame::new(header, body.to_vec(), timestamp_ns)
    }

    fn response_frame(stream_id: i16, opcode: u8, body: &[u8], timestamp_ns: u64) -> Frame {
        let header = FrameHeader::new(Direction::Response, 0x84, 0, stream_id, opcode, body.len() as u32);
        Frame::new(header, body.to_vec(), timestamp_ns)
    }

    fn long_string(s: &str) -> Vec<u8> {
        let mut buf = (s.len() as i32).to_be_bytes().to_vec();
        buf.extend_from_slice(s.as_bytes());
        buf
    }

    #[test]
    fn matches_request_and_response_by_stream_id() {
        let mut query = long_string("SELECT 1");
        query.extend_from_slice(&0x0001u16.to_be_bytes());
        query.push(0x00);

        let mut stitcher = Stitcher::new(StitcherConfig::default());
        stitcher.push_request(request_frame(1, ReqOp::Query.to_byte(), &query, 100));
        stitcher.push_response(response_frame(1, RespOp::Result.to_byte(), &0x0001i32.to_be_bytes(), 150));

        let (records, diagnostics) = stitcher.drain(200);
        assert!(diagnostics.is_empty());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].req.op, ReqOp::Query);
        assert_eq!(records[0].resp.msg, "Response type = VOID");
        assert_eq!(stitcher.pending_requests(), 0);
    }

    #[test]
    fn response_order_wins_over_request_order() {
        let options = b"".to_vec();

        let mut stitcher = Stitcher::new(StitcherConfig::default());
        stitcher.push_request(request_frame(4, ReqOp::Options.to_byte(), &options, 100));
        stitcher.push_request(request_frame(5, ReqOp::Options.to_byte(), &options, 110));
        stitcher.push_response(response_frame(5, RespOp::Result.to_byte(), &0x0001i32.to_be_bytes(), 200));
        stitcher.push_response(response_frame(4, RespOp::Result.to_byte(), &0x0001i32.to_be_bytes(), 210));

        let (records, diagnostics) = stitcher.drain(300);
        assert!(diagnostics.is_empty());
        assert_eq!(records.len(), 2);
        // response for stream 5 arrived first, so its record is emitted first
        assert_eq!(records[0].req.timestamp_ns, 110);
        assert_eq!(records[1].req.timestamp_ns, 100);
    }

    #[test]
    fn event_synthesizes_register_request() {
        let mut body = Vec::new();
        body.extend_from_slice(&13u16.to_be_bytes());
        body.extend_from_slice(b"STATUS_CHANGE");
        body.extend_from_slice(&2u16.to_be_bytes());
        body.extend_from_slice(b"UP");
        body.push(4u8);
        body.extend_from_slice(&[10, 0, 0, 1]);
        body.extend_from_slice(&9042i32.to_be_bytes());

        let mut stitcher = Stitcher::new(StitcherConfig::default());
        stitcher.push_response(response_frame(-1, RespOp::Event.to_byte(), &body, 500));

        let (records, diagnostics) = stitcher.drain(500);
        assert!(diagnostics.is_empty());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].req.op, ReqOp::Register);
        assert_eq!(records[0].req.msg, "-");
        assert_eq!(records[0].req.timestamp_ns, records[0].resp.timestamp_ns);
        assert_eq!(records[0].resp.msg, "STATUS_CHANGE UP 10.0.0.1:9042");
    }

    #[test]
    fn unmatched_response_produces_diagnostic_only() {
        let mut stitcher = Stitcher::new(StitcherConfig::default());
        stitcher.push_response(response_frame(9, RespOp::Ready.to_byte(), &[], 100));

        let (records, diagnostics) = stitcher.drain(100);
        assert!(records.is_empty());
        assert_eq!(diagnostics, vec![Diagnostic::NoMatchingRequest { stream_id: 9, opcode: RespOp::Ready.to_byte() }]);
    }

    #[test]
    fn prune_aged_discards_stale_unconsumed_requests() {
        let mut stitcher = Stitcher::new(StitcherConfig { max_age_ns: 1_000, max_queue_len: usize::MAX });
        stitcher.push_request(request_frame(1, ReqOp::Options.to_byte(), &[], 0));

        let discarded = stitcher.prune_aged(10_000);
        assert_eq!(discarded, 1);
        assert_eq!(stitcher.pending_requests(), 0);
    }

    #[test]
    fn stream_id_reused_after_consumption_matches_next_response() {
        let mut stitcher = Stitcher::new(StitcherConfig::default());
        stitcher.push_request(request_frame(1, ReqOp::Options.to_byte(), &[], 0));
        stitcher.push_response(response_frame(1, RespOp::Ready.to_byte(), &[], 10));
        let (first, _) = stitcher.drain(10);
        assert_eq!(first.len(), 1);

        stitcher.push_request(request_frame(1, ReqOp::Options.to_byte(), &[], 20));
        stitcher.push_response(response_frame(1, RespOp::Ready.to_byte(), &[], 30));
        let (second, diagnostics) = stitcher.drain(30);
        assert!(diagnostics.is_empty());
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].req.timestamp_ns, 20);
    }

    #[test]
    fn idempotent_on_repeated_drain_of_empty_queues() {
        let mut stitcher = Stitcher::new(StitcherConfig::default());
        stitcher.push_request(request_frame(1, ReqOp::Options.to_byte(), &[], 0));
        stitcher.push_response(response_frame(1, RespOp::Ready.to_byte(), &[], 10));
        let (first, _) = stitcher.drain(10);
        let (second, diagnostics) = stitcher.drain(10);
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert!(diagnostics.is_empty());
    }
}

//! Request-direction body shapes, one variant per request opcode.

use bytes::Bytes;

use super::{
    primitives::{Cursor, CursorError},
    query_params::{BoundValue, QueryParameters},
};
use crate::ReqOp;

/// One entry of a `BATCH` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchQuery {
    /// An inline query string.
    Query(String),
    /// A reference to a previously prepared statement.
    Prepared(Bytes),
}

/// One statement plus its bound values within a `BATCH` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    /// The query, either inline or by prepared-statement id.
    pub query_or_id: BatchQuery,
    /// Bound values for this statement.
    pub values: Vec<BoundValue>,
}

/// Parsed body of a `QUERY` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryReq {
    /// The query text.
    pub query: String,
    /// Consistency/paging/bound-value parameters.
    pub params: QueryParameters,
}

/// Parsed body of an `EXECUTE` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteReq {
    /// Id of the previously prepared statement.
    pub id: Bytes,
    /// Consistency/paging/bound-value parameters.
    pub params: QueryParameters,
}

/// Parsed body of a `BATCH` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReq {
    /// `0` = LOGGED, `1` = UNLOGGED, `2` = COUNTER.
    pub batch_type: u8,
    /// Statements in the batch.
    pub queries: Vec<BatchEntry>,
    /// Requested consistency level.
    pub consistency: u16,
    /// Optional serial consistency level.
    pub serial_consistency: Option<u16>,
    /// Optional client-supplied write timestamp.
    pub timestamp: Option<i64>,
}

/// Sum type over every request-direction body shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReqBody {
    /// `STARTUP`: `[string map]` of options.
    Startup(Vec<(String, String)>),
    /// `AUTH_RESPONSE`: `[bytes]` token.
    AuthResponse(Option<Bytes>),
    /// `OPTIONS`: empty body.
    Options,
    /// `QUERY`.
    Query(QueryReq),
    /// `PREPARE`: `[long string]` query.
    Prepare(String),
    /// `EXECUTE`.
    Execute(ExecuteReq),
    /// `BATCH`.
    Batch(BatchReq),
    /// `REGISTER`: `[string list]` of event types.
    Register(Vec<String>),
}

impl ReqBody {
    const FLAG_SERIAL_CONSISTENCY: u8 = 0x10;
    const FLAG_DEFAULT_TIMESTAMP: u8 = 0x20;
    const FLAG_NAMES_FOR_VALUES: u8 = 0x40;

    /// Decode a request body for `op` from `bytes`.
    pub fn decode(op: ReqOp, bytes: &[u8]) -> Result<Self, CursorError> {
        let mut cursor = Cursor::new(bytes);
        match op {
            ReqOp::Startup => Ok(Self::Startup(cursor.read_string_map()?)),
            ReqOp::AuthResponse => Ok(Self::AuthResponse(cursor.read_bytes()?)),
            ReqOp::Options => Ok(Self::Options),
            ReqOp::Query => {
                let query = cursor.read_long_string()?;
                let params = QueryParameters::decode(&mut cursor)?;
                Ok(Self::Query(QueryReq { query, params }))
            },
            ReqOp::Prepare => Ok(Self::Prepare(cursor.read_long_string()?)),
            ReqOp::Execute => {
                let id = cursor.read_short_bytes()?;
                let params = QueryParameters::decode(&mut cursor)?;
                Ok(Self::Execute(ExecuteReq { id, params }))
            },
            ReqOp::Batch => Self::decode_batch(&mut cursor),
            ReqOp::Register => Ok(Self::Register(cursor.read_string_list()?)),
        }
    }

    fn decode_batch(cursor: &mut Cursor<'_>) -> Result<Self, CursorError> {
        let batch_type = cursor.read_u8()?;
        let count = cursor.read_short()?;

        let mut queries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let kind = cursor.read_u8()?;
            let query_or_id = if kind == 0 {
                BatchQuery::Query(cursor.read_long_string()?)
            } else {
                BatchQuery::Prepared(cursor.read_short_bytes()?)
            };

            let value_count = cursor.read_short()?;
            let values = (0..value_count)
                .map(|_| Ok(BoundValue { name: None, value: cursor.read_value()? }))
                .collect::<Result<Vec<_>, CursorError>>()?;

            queries.push(BatchEntry { query_or_id, values });
        }

        let consistency = cursor.read_short()?;
        let flags = cursor.read_u8()?;
        let _named = flags & Self::FLAG_NAMES_FOR_VALUES != 0; // not rendered; see DESIGN.md

        let serial_consistency =
            if flags & Self::FLAG_SERIAL_CONSISTENCY != 0 { Some(cursor.read_short()?) } else { None };

        let timestamp =
            if flags & Self::FLAG_DEFAULT_TIMESTAMP != 0 { Some(cursor.read_long()?) } else { None };

        Ok(Self::Batch(BatchReq { batch_type, queries, consistency, serial_consistency, timestamp }))
    }
}

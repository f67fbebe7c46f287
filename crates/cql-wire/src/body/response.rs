//! Response-direction body shapes, one variant per response opcode.

use bytes::Bytes;

use super::primitives::{Cursor, CursorError};
use crate::{RespOp, ResultKind};

/// A single column specification within `ROWS` metadata. The column's CQL
/// type is parsed only far enough to advance the cursor past it; the type
/// itself is not retained (see [`skip_option`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    /// Owning keyspace, present unless `GLOBAL_TABLES_SPEC` made it implicit.
    pub keyspace: Option<String>,
    /// Owning table, present unless `GLOBAL_TABLES_SPEC` made it implicit.
    pub table: Option<String>,
    /// Column name.
    pub name: String,
}

/// Decoded `ROWS` result metadata plus the row count (row contents are not
/// retained; see Non-goals).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowsResp {
    /// Column specs, present unless `NO_METADATA` was set.
    pub columns: Vec<ColumnSpec>,
    /// Opaque paging-state token for a follow-up page request.
    pub paging_state: Option<Bytes>,
    /// Number of rows in this page.
    pub rows_count: i32,
}

/// `RESULT` body, keyed by `ResultKind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultResp {
    /// `VOID`.
    Void,
    /// `ROWS`.
    Rows(RowsResp),
    /// `SET_KEYSPACE`: the new current keyspace name.
    SetKeyspace(String),
    /// `PREPARED`: the assigned statement id (remaining metadata skipped).
    Prepared(Bytes),
    /// `SCHEMA_CHANGE` as a `RESULT` (distinct from the `EVENT` variant of
    /// the same name, which a client only sees after `REGISTER`).
    SchemaChange {
        /// `CREATED` / `UPDATED` / `DROPPED`.
        change: String,
        /// `KEYSPACE` / `TABLE` / `TYPE` / `FUNCTION` / `AGGREGATE`.
        target: String,
        /// Affected keyspace.
        keyspace: String,
        /// Affected table/type/function/aggregate name, when `target` is
        /// not `KEYSPACE`.
        name: Option<String>,
    },
}

/// `EVENT` body, keyed by the event type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventResp {
    /// `TOPOLOGY_CHANGE`.
    Topology {
        /// `NEW_NODE` / `REMOVED_NODE`.
        change: String,
        /// Affected node address.
        addr: std::net::SocketAddr,
    },
    /// `STATUS_CHANGE`.
    Status {
        /// `UP` / `DOWN`.
        change: String,
        /// Affected node address.
        addr: std::net::SocketAddr,
    },
    /// `SCHEMA_CHANGE`.
    SchemaChange {
        /// `CREATED` / `UPDATED` / `DROPPED`.
        change: String,
        /// `KEYSPACE` / `TABLE` / `TYPE` / `FUNCTION` / `AGGREGATE`.
        target: String,
        /// Affected keyspace.
        keyspace: String,
        /// Affected table/type/function/aggregate name, when `target` is
        /// not `KEYSPACE`.
        name: Option<String>,
    },
}

/// Sum type over every response-direction body shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RespBody {
    /// `ERROR`: the `[int]` error code plus its `[string]` message. Error
    /// bodies carry additional kind-specific fields after the message; they
    /// are not parsed (Non-goal).
    Error {
        /// CQL error code.
        code: i32,
        /// Human-readable error message.
        message: String,
    },
    /// `READY`: empty body.
    Ready,
    /// `AUTHENTICATE`: the authenticator class name.
    Authenticate(String),
    /// `SUPPORTED`: server-advertised option multimap.
    Supported(Vec<(String, Vec<String>)>),
    /// `RESULT`.
    Result(ResultResp),
    /// `EVENT`.
    Event(EventResp),
    /// `AUTH_CHALLENGE`: opaque challenge token.
    AuthChallenge(Option<Bytes>),
    /// `AUTH_SUCCESS`: opaque final token.
    AuthSuccess(Option<Bytes>),
}

const GLOBAL_TABLES_SPEC: i32 = 0x0001;
const HAS_MORE_PAGES: i32 = 0x0002;
const NO_METADATA: i32 = 0x0004;

impl RespBody {
    /// Decode a response body for `op` from `bytes`.
    pub fn decode(op: RespOp, bytes: &[u8]) -> Result<Self, CursorError> {
        let mut cursor = Cursor::new(bytes);
        match op {
            RespOp::Error => {
                let code = cursor.read_int()?;
                let message = cursor.read_string()?;
                Ok(Self::Error { code, message })
            },
            RespOp::Ready => Ok(Self::Ready),
            RespOp::Authenticate => Ok(Self::Authenticate(cursor.read_string()?)),
            RespOp::Supported => Ok(Self::Supported(cursor.read_string_multimap()?)),
            RespOp::Result => decode_result(&mut cursor).map(Self::Result),
            RespOp::Event => decode_event(&mut cursor).map(Self::Event),
            RespOp::AuthChallenge => Ok(Self::AuthChallenge(cursor.read_bytes()?)),
            RespOp::AuthSuccess => Ok(Self::AuthSuccess(cursor.read_bytes()?)),
        }
    }
}

fn decode_result(cursor: &mut Cursor<'_>) -> Result<ResultResp, CursorError> {
    let kind = cursor.read_int()?;
    match ResultKind::from_i32(kind) {
        Some(ResultKind::Void) => Ok(ResultResp::Void),
        Some(ResultKind::Rows) => decode_rows(cursor).map(ResultResp::Rows),
        Some(ResultKind::SetKeyspace) => Ok(ResultResp::SetKeyspace(cursor.read_string()?)),
        Some(ResultKind::Prepared) => Ok(ResultResp::Prepared(cursor.read_short_bytes()?)),
        Some(ResultKind::SchemaChange) | None => decode_schema_change_result(cursor),
    }
}

fn decode_event(cursor: &mut Cursor<'_>) -> Result<EventResp, CursorError> {
    let event_type = cursor.read_string()?;
    match event_type.as_str() {
        "TOPOLOGY_CHANGE" => {
            let change = cursor.read_string()?;
            let addr = cursor.read_inet()?;
            Ok(EventResp::Topology { change, addr })
        },
        "STATUS_CHANGE" => {
            let change = cursor.read_string()?;
            let addr = cursor.read_inet()?;
            Ok(EventResp::Status { change, addr })
        },
        _ => {
            let change = cursor.read_string()?;
            let (target, keyspace, name) = decode_schema_change_tail(cursor)?;
            Ok(EventResp::SchemaChange { change, target, keyspace, name })
        },
    }
}

fn decode_schema_change_result(cursor: &mut Cursor<'_>) -> Result<ResultResp, CursorError> {
    let change = cursor.read_string()?;
    let (target, keyspace, name) = decode_schema_change_tail(cursor)?;
    Ok(ResultResp::SchemaChange { change, target, keyspace, name })
}

fn decode_schema_change_tail(
    cursor: &mut Cursor<'_>,
) -> Result<(String, String, Option<String>), CursorError> {
    let target = cursor.read_string()?;
    let keyspace = cursor.read_string()?;
    let name = if target == "KEYSPACE" { None } else { Some(cursor.read_string()?) };
    Ok((target, keyspace, name))
}

fn decode_rows(cursor: &mut Cursor<'_>) -> Result<RowsResp, CursorError> {
    let flags = cursor.read_int()?;
    let columns_count = nonneg(cursor.read_int()?)?;

    let paging_state = if flags & HAS_MORE_PAGES != 0 { cursor.read_bytes()? } else { None };

    let columns = if flags & NO_METADATA != 0 {
        Vec::new()
    } else {
        let global_spec = flags & GLOBAL_TABLES_SPEC != 0;
        let (global_keyspace, global_table) = if global_spec {
            (Some(cursor.read_string()?), Some(cursor.read_string()?))
        } else {
            (None, None)
        };

        let mut columns = Vec::with_capacity(columns_count);
        for _ in 0..columns_count {
            let (keyspace, table) = if global_spec {
                (global_keyspace.clone(), global_table.clone())
            } else {
                (Some(cursor.read_string()?), Some(cursor.read_string()?))
            };
            let name = cursor.read_string()?;
            skip_option(cursor)?;
            columns.push(ColumnSpec { keyspace, table, name });
        }
        columns
    };

    let rows_count = cursor.read_int()?;
    Ok(RowsResp { columns, paging_state, rows_count })
}

fn nonneg(value: i32) -> Result<usize, CursorError> {
    if value < 0 {
        Err(CursorError::NegativeCount(value))
    } else {
        Ok(value as usize)
    }
}

/// CQL `[option]` ids that carry no further payload.
const OPTION_CUSTOM: u16 = 0x0000;
const OPTION_LIST: u16 = 0x0020;
const OPTION_MAP: u16 = 0x0021;
const OPTION_SET: u16 = 0x0022;
const OPTION_UDT: u16 = 0x0030;
const OPTION_TUPLE: u16 = 0x0031;

/// Consume one `[option]` (a column type descriptor) without retaining it.
///
/// `[option]` is `[short]` id followed by an id-specific payload; container
/// and user-defined types nest recursively. This is the only part of a CQL
/// type the stitcher needs: enough cursor movement to reach whatever follows
/// the column spec, never the type itself (see Non-goals).
fn skip_option(cursor: &mut Cursor<'_>) -> Result<(), CursorError> {
    let id = cursor.read_short()?;
    match id {
        OPTION_CUSTOM => {
            cursor.read_string()?;
        },
        OPTION_LIST | OPTION_SET => {
            skip_option(cursor)?;
        },
        OPTION_MAP => {
            skip_option(cursor)?;
            skip_option(cursor)?;
        },
        OPTION_UDT => {
            cursor.read_string()?; // keyspace
            cursor.read_string()?; // udt name
            let field_count = cursor.read_short()?;
            for _ in 0..field_count {
                cursor.read_string()?; // field name
                skip_option(cursor)?;
            }
        },
        OPTION_TUPLE => {
            let field_count = cursor.read_short()?;
            for _ in 0..field_count {
                skip_option(cursor)?;
            }
        },
        _ => {}, // fixed-width scalar type, no further payload
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error() {
        let mut buf = 0x1100i32.to_be_bytes().to_vec(); // Invalid
        buf.extend_from_slice(&9u16.to_be_bytes());
        buf.extend_from_slice(b"bad query");
        let body = RespBody::decode(RespOp::Error, &buf).unwrap();
        assert_eq!(body, RespBody::Error { code: 0x1100, message: "bad query".to_string() });
    }

    #[test]
    fn decode_ready_is_empty() {
        assert_eq!(RespBody::decode(RespOp::Ready, &[]).unwrap(), RespBody::Ready);
    }

    #[test]
    fn decode_void_result() {
        let buf = 0x0001i32.to_be_bytes();
        let body = RespBody::decode(RespOp::Result, &buf).unwrap();
        assert_eq!(body, RespBody::Result(ResultResp::Void));
    }

    #[test]
    fn decode_set_keyspace_result() {
        let mut buf = 0x0003i32.to_be_bytes().to_vec();
        buf.extend_from_slice(&2u16.to_be_bytes());
        buf.extend_from_slice(b"ks");
        let body = RespBody::decode(RespOp::Result, &buf).unwrap();
        assert_eq!(body, RespBody::Result(ResultResp::SetKeyspace("ks".to_string())));
    }

    #[test]
    fn decode_rows_with_global_spec_and_scalar_columns() {
        let mut buf = 0x0002i32.to_be_bytes().to_vec(); // ROWS
        buf.extend_from_slice(&GLOBAL_TABLES_SPEC.to_be_bytes()); // flags
        buf.extend_from_slice(&2i32.to_be_bytes()); // columns_count
        buf.extend_from_slice(&2u16.to_be_bytes());
        buf.extend_from_slice(b"ks");
        buf.extend_from_slice(&1u16.to_be_bytes());
        buf.extend_from_slice(b"t");
        // column 1: "id" int
        buf.extend_from_slice(&2u16.to_be_bytes());
        buf.extend_from_slice(b"id");
        buf.extend_from_slice(&0x0009u16.to_be_bytes()); // int
        // column 2: "tags" list<text>
        buf.extend_from_slice(&4u16.to_be_bytes());
        buf.extend_from_slice(b"tags");
        buf.extend_from_slice(&OPTION_LIST.to_be_bytes());
        buf.extend_from_slice(&0x000Du16.to_be_bytes()); // varchar
        buf.extend_from_slice(&3i32.to_be_bytes()); // rows_count

        let body = RespBody::decode(RespOp::Result, &buf).unwrap();
        match body {
            RespBody::Result(ResultResp::Rows(rows)) => {
                assert_eq!(rows.columns.len(), 2);
                assert_eq!(rows.columns[0].name, "id");
                assert_eq!(rows.columns[0].keyspace.as_deref(), Some("ks"));
                assert_eq!(rows.columns[1].name, "tags");
                assert_eq!(rows.rows_count, 3);
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn decode_rows_no_metadata() {
        let mut buf = 0x0002i32.to_be_bytes().to_vec();
        buf.extend_from_slice(&NO_METADATA.to_be_bytes());
        buf.extend_from_slice(&0i32.to_be_bytes()); // columns_count, unused
        buf.extend_from_slice(&5i32.to_be_bytes()); // rows_count
        let body = RespBody::decode(RespOp::Result, &buf).unwrap();
        match body {
            RespBody::Result(ResultResp::Rows(rows)) => {
                assert!(rows.columns.is_empty());
                assert_eq!(rows.rows_count, 5);
            },
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn decode_schema_change_event_for_table() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&13u16.to_be_bytes());
        buf.extend_from_slice(b"SCHEMA_CHANGE");
        buf.extend_from_slice(&7u16.to_be_bytes());
        buf.extend_from_slice(b"UPDATED");
        buf.extend_from_slice(&5u16.to_be_bytes());
        buf.extend_from_slice(b"TABLE");
        buf.extend_from_slice(&2u16.to_be_bytes());
        buf.extend_from_slice(b"ks");
        buf.extend_from_slice(&1u16.to_be_bytes());
        buf.extend_from_slice(b"t");

        let body = RespBody::decode(RespOp::Event, &buf).unwrap();
        assert_eq!(
            body,
            RespBody::Event(EventResp::SchemaChange {
                change: "UPDATED".to_string(),
                target: "TABLE".to_string(),
                keyspace: "ks".to_string(),
                name: Some("t".to_string()),
            })
        );
    }

    #[test]
    fn decode_status_change_event() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&13u16.to_be_bytes());
        buf.extend_from_slice(b"STATUS_CHANGE");
        buf.extend_from_slice(&2u16.to_be_bytes());
        buf.extend_from_slice(b"UP");
        buf.push(4u8);
        buf.extend_from_slice(&[10, 0, 0, 1]);
        buf.extend_from_slice(&9042i32.to_be_bytes());

        let body = RespBody::decode(RespOp::Event, &buf).unwrap();
        match body {
            RespBody::Event(EventResp::Status { change, addr }) => {
                assert_eq!(change, "UP");
                assert_eq!(addr.port(), 9042);
            },
            other => panic!("unexpected {other:?}"),
        }
    }
}

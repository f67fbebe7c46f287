//! CQL primitive readers and opcode-specific body parsers.

pub mod primitives;
pub mod query_params;
pub mod request;
pub mod response;

pub use primitives::{Cursor, CursorError, Value};
pub use query_params::{BoundValue, QueryParameters};
pub use request::{BatchEntry, BatchQuery, BatchReq, ExecuteReq, QueryReq, ReqBody};
pub use response::{ColumnSpec, EventResp, ResultResp, RespBody, RowsResp};

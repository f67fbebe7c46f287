//! Per-message processors: one function per opcode, each turning a decoded
//! body into the short summary string stored in [`crate::Request::msg`] or
//! [`crate::Response::msg`]. Mirrors `ProcessStartupReq`/`ProcessQueryReq`/
//! `...` composed by `ProcessReq`/`ProcessResp` in the reference
//! implementation's `cql_stitcher.cc`.

use cql_wire::body::{
    BatchQuery, ColumnSpec, EventResp, ReqBody, RespBody, ResultResp, Value,
};
use cql_wire::{Frame, ReqOp, RespOp};

use crate::{Request, Response, StitchError};

fn hex_value(value: &Value) -> String {
    match value {
        Value::Bytes(bytes) => hex::encode(bytes),
        Value::Null => "null".to_string(),
        Value::NotSet => "not_set".to_string(),
    }
}

fn process_startup(body: &ReqBody) -> String {
    let ReqBody::Startup(options) = body else { unreachable!("dispatched by opcode") };
    let map: serde_json::Map<String, serde_json::Value> =
        options.iter().map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone()))).collect();
    serde_json::to_string(&map).unwrap_or_default()
}

fn process_auth_response(body: &ReqBody) -> String {
    let ReqBody::AuthResponse(token) = body else { unreachable!("dispatched by opcode") };
    match token {
        Some(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        None => String::new(),
    }
}

fn process_register(body: &ReqBody) -> String {
    let ReqBody::Register(types) = body else { unreachable!("dispatched by opcode") };
    serde_json::to_string(types).unwrap_or_default()
}

fn process_query(body: &ReqBody) -> String {
    let ReqBody::Query(query) = body else { unreachable!("dispatched by opcode") };
    if query.params.values.is_empty() {
        query.query.clone()
    } else {
        let hexed: Vec<String> = query.params.values.iter().map(|v| hex_value(&v.value)).collect();
        format!("{}\n{}", query.query, serde_json::to_string(&hexed).unwrap_or_default())
    }
}

fn process_prepare(body: &ReqBody) -> String {
    let ReqBody::Prepare(query) = body else { unreachable!("dispatched by opcode") };
    query.clone()
}

fn process_execute(body: &ReqBody) -> String {
    let ReqBody::Execute(execute) = body else { unreachable!("dispatched by opcode") };
    let hexed: Vec<String> = execute.params.values.iter().map(|v| hex_value(&v.value)).collect();
    serde_json::to_string(&hexed).unwrap_or_default()
}

fn process_batch(body: &ReqBody) -> String {
    let ReqBody::Batch(batch) = body else { unreachable!("dispatched by opcode") };
    let entries: Vec<serde_json::Value> = batch
        .queries
        .iter()
        .map(|entry| match &entry.query_or_id {
            BatchQuery::Query(q) => serde_json::json!({ "query": q }),
            BatchQuery::Prepared(id) => serde_json::json!({ "id": hex::encode(id) }),
        })
        .collect();
    serde_json::to_string(&entries).unwrap_or_default()
}

/// Summarize a decoded request body for opcode `op`.
///
/// # Errors
///
/// Returns [`StitchError::UnhandledOpcode`] for an opcode with no summary
/// rule. No such request opcode currently exists; the arm exists for
/// forward compatibility with `#[non_exhaustive]` `ReqOp`.
pub fn process_request(op: ReqOp, body: &ReqBody) -> Result<String, StitchError> {
    match op {
        ReqOp::Startup => Ok(process_startup(body)),
        ReqOp::AuthResponse => Ok(process_auth_response(body)),
        ReqOp::Options => Ok(String::new()),
        ReqOp::Query => Ok(process_query(body)),
        ReqOp::Prepare => Ok(process_prepare(body)),
        ReqOp::Execute => Ok(process_execute(body)),
        ReqOp::Batch => Ok(process_batch(body)),
        ReqOp::Register => Ok(process_register(body)),
        _ => Err(StitchError::UnhandledOpcode { opcode: op.to_byte() }),
    }
}

fn columns_json(columns: &[ColumnSpec]) -> String {
    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    serde_json::to_string(&names).unwrap_or_default()
}

fn process_result(result: &ResultResp) -> String {
    match result {
        ResultResp::Void => "Response type = VOID".to_string(),
        ResultResp::Rows(rows) => format!(
            "Response type = ROWS\nNumber of columns = {}\n{}\nNumber of rows = {}",
            rows.columns.len(),
            columns_json(&rows.columns),
            rows.rows_count
        ),
        ResultResp::SetKeyspace(keyspace) => {
            format!("Response type = SET_KEYSPACE\nKeyspace = {keyspace}")
        },
        ResultResp::Prepared(_) => "Response type = PREPARED".to_string(),
        ResultResp::SchemaChange { .. } => "Response type = SCHEMA_CHANGE".to_string(),
    }
}

fn process_event(event: &EventResp) -> String {
    match event {
        EventResp::Topology { change, addr } => format!("TOPOLOGY_CHANGE {change} {addr}"),
        EventResp::Status { change, addr } => format!("STATUS_CHANGE {change} {addr}"),
        EventResp::SchemaChange { change, keyspace, name, .. } => match name {
            Some(name) => format!("SCHEMA_CHANGE {change} keyspace={keyspace} name={name}"),
            None => format!("SCHEMA_CHANGE {change} keyspace={keyspace}"),
        },
    }
}

/// Summarize a decoded response body for opcode `op`.
///
/// # Errors
///
/// Returns [`StitchError::UnhandledOpcode`] for an opcode with no summary
/// rule. No such response opcode currently exists; the arm exists for
/// forward compatibility with `#[non_exhaustive]` `RespOp`.
pub fn process_response(op: RespOp, body: &RespBody) -> Result<String, StitchError> {
    match (op, body) {
        (RespOp::Error, RespBody::Error { code, message }) => {
            Ok(format!("[{code}] {message}"))
        },
        (RespOp::Ready, RespBody::Ready) => Ok(String::new()),
        (RespOp::Authenticate, RespBody::Authenticate(name)) => Ok(name.clone()),
        (RespOp::Supported, RespBody::Supported(multimap)) => {
            let map: serde_json::Map<String, serde_json::Value> = multimap
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::from(v.clone())))
                .collect();
            Ok(serde_json::to_string(&map).unwrap_or_default())
        },
        (RespOp::Result, RespBody::Result(result)) => Ok(process_result(result)),
        (RespOp::Event, RespBody::Event(event)) => Ok(process_event(event)),
        (RespOp::AuthChallenge, RespBody::AuthChallenge(token))
        | (RespOp::AuthSuccess, RespBody::AuthSuccess(token)) => {
            Ok(token.as_deref().map(hex::encode).unwrap_or_default())
        },
        _ => Err(StitchError::UnhandledOpcode { opcode: op.to_byte() }),
    }
}

/// Decode and summarize a request-direction frame in one step.
///
/// # Errors
///
/// Propagates body-decode failures and unhandled-opcode conditions.
pub fn summarize_request(frame: &Frame, op: ReqOp) -> Result<Request, StitchError> {
    let body = ReqBody::decode(op, &frame.body)
        .map_err(|source| StitchError::Malformed(cql_wire::ProtocolError::Malformed {
            opcode: op.to_byte(),
            reason: source.to_string(),
        }))?;
    let msg = process_request(op, &body)?;
    Ok(Request { op, timestamp_ns: frame.timestamp_ns, msg })
}

/// Decode and summarize a response-direction frame in one step.
///
/// # Errors
///
/// Propagates body-decode failures and unhandled-opcode conditions.
pub fn summarize_response(frame: &Frame, op: RespOp) -> Result<Response, StitchError> {
    let body = RespBody::decode(op, &frame.body)
        .map_err(|source| StitchError::Malformed(cql_wire::ProtocolError::Malformed {
            opcode: op.to_byte(),
            reason: source.to_string(),
        }))?;
    let msg = process_response(op, &body)?;
    Ok(Response { op, timestamp_ns: frame.timestamp_ns, msg })
}

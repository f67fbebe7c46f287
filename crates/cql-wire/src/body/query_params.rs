//! `QueryParameters`: the flags-driven tail shared by `QUERY` and `EXECUTE`.

use super::primitives::{Cursor, CursorError, Value};

/// One bound value, optionally named (protocol v3+ with the `names_for_values`
/// flag set).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundValue {
    /// Parameter name, present only when bound by name.
    pub name: Option<String>,
    /// The bound value itself.
    pub value: Value,
}

/// Parameters shared by `QUERY` and `EXECUTE` bodies.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryParameters {
    /// Requested consistency level.
    pub consistency: u16,
    /// Bound values, if the `VALUES` flag was set.
    pub values: Vec<BoundValue>,
    /// Requested page size, if the `PAGE_SIZE` flag was set.
    pub page_size: Option<i32>,
    /// Opaque paging state token, if the `WITH_PAGING_STATE` flag was set.
    pub paging_state: Option<bytes::Bytes>,
    /// Serial consistency level, if the `WITH_SERIAL_CONSISTENCY` flag was
    /// set.
    pub serial_consistency: Option<u16>,
    /// Client-supplied write timestamp, if the `WITH_DEFAULT_TIMESTAMP` flag
    /// was set.
    pub timestamp: Option<i64>,
}

impl QueryParameters {
    const FLAG_VALUES: u8 = 0x01;
    const FLAG_SKIP_METADATA: u8 = 0x02;
    const FLAG_PAGE_SIZE: u8 = 0x04;
    const FLAG_WITH_PAGING_STATE: u8 = 0x08;
    const FLAG_WITH_SERIAL_CONSISTENCY: u8 = 0x10;
    const FLAG_WITH_DEFAULT_TIMESTAMP: u8 = 0x20;
    const FLAG_NAMES_FOR_VALUES: u8 = 0x40;

    /// Decode `QueryParameters` from `cursor`.
    pub fn decode(cursor: &mut Cursor<'_>) -> Result<Self, CursorError> {
        let consistency = cursor.read_short()?;
        let flags = cursor.read_u8()?;
        let _ = flags & Self::FLAG_SKIP_METADATA; // preserved by the server, not interpreted here

        let values = if flags & Self::FLAG_VALUES != 0 {
            let count = cursor.read_short()?;
            let named = flags & Self::FLAG_NAMES_FOR_VALUES != 0;
            (0..count)
                .map(|_| {
                    let name = named.then(|| cursor.read_string()).transpose()?;
                    let value = cursor.read_value()?;
                    Ok(BoundValue { name, value })
                })
                .collect::<Result<Vec<_>, CursorError>>()?
        } else {
            Vec::new()
        };

        let page_size =
            if flags & Self::FLAG_PAGE_SIZE != 0 { Some(cursor.read_int()?) } else { None };

        let paging_state =
            if flags & Self::FLAG_WITH_PAGING_STATE != 0 { cursor.read_bytes()? } else { None };

        let serial_consistency = if flags & Self::FLAG_WITH_SERIAL_CONSISTENCY != 0 {
            Some(cursor.read_short()?)
        } else {
            None
        };

        let timestamp = if flags & Self::FLAG_WITH_DEFAULT_TIMESTAMP != 0 {
            Some(cursor.read_long()?)
        } else {
            None
        };

        Ok(Self { consistency, values, page_size, paging_state, serial_consistency, timestamp })
    }
}

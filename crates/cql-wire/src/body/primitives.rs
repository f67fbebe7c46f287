//! Cursor-based readers for the CQL primitive wire types.
//!
//! Every read advances an internal offset over a borrowed body slice and
//! fails with [`CursorError`] rather than panicking when it would run past
//! the end of the buffer.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use thiserror::Error;

/// Errors produced while reading CQL primitives from a [`Cursor`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CursorError {
    /// Fewer bytes remain than the primitive requires.
    #[error("need {needed} bytes, have {available}")]
    Truncated {
        /// Bytes required to complete this read.
        needed: usize,
        /// Bytes actually remaining in the cursor.
        available: usize,
    },
    /// A `[string]`/`[long string]` was not valid UTF-8.
    #[error("invalid utf-8 in string")]
    InvalidUtf8,
    /// A length-prefixed collection declared a negative count.
    #[error("negative count {0}")]
    NegativeCount(i32),
    /// An `[inet]` address length byte was neither 4 nor 16.
    #[error("invalid inet address length {0}")]
    InvalidInetLength(u8),
}

type Result<T> = std::result::Result<T, CursorError>;

/// A value read via the `[value]` primitive: present bytes, an explicit
/// null, or "not set" (distinct from null; only meaningful for bound
/// parameters).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Concrete bytes.
    Bytes(bytes::Bytes),
    /// Explicit SQL NULL.
    Null,
    /// Value intentionally left unbound (protocol v4+).
    NotSet,
}

/// Read-only cursor over a frame body slice.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Wrap `buf` for reading from the start.
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes remaining after the current position.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Whether every byte has been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(CursorError::Truncated { needed: n, available: self.remaining() });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// `[int]`: big-endian signed 32-bit.
    pub fn read_int(&mut self) -> Result<i32> {
        let bytes: [u8; 4] = self.take(4)?.try_into().expect("exactly 4 bytes");
        Ok(i32::from_be_bytes(bytes))
    }

    /// `[long]`: big-endian signed 64-bit.
    pub fn read_long(&mut self) -> Result<i64> {
        let bytes: [u8; 8] = self.take(8)?.try_into().expect("exactly 8 bytes");
        Ok(i64::from_be_bytes(bytes))
    }

    /// `[short]`: big-endian unsigned 16-bit.
    pub fn read_short(&mut self) -> Result<u16> {
        let bytes: [u8; 2] = self.take(2)?.try_into().expect("exactly 2 bytes");
        Ok(u16::from_be_bytes(bytes))
    }

    /// One raw byte.
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    /// `[string]`: `[short]` length `n`, then `n` UTF-8 bytes.
    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_short()? as usize;
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes).map(str::to_owned).map_err(|_| CursorError::InvalidUtf8)
    }

    /// `[long string]`: `[int]` length `n`, then `n` UTF-8 bytes.
    pub fn read_long_string(&mut self) -> Result<String> {
        let len = self.read_nonneg_int()?;
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes).map(str::to_owned).map_err(|_| CursorError::InvalidUtf8)
    }

    /// `[bytes]`: `[int]` length `n`; `n < 0` is null, `n == 0` is empty,
    /// otherwise `n` raw bytes.
    pub fn read_bytes(&mut self) -> Result<Option<bytes::Bytes>> {
        let len = self.read_int()?;
        if len < 0 {
            return Ok(None);
        }
        let slice = self.take(len as usize)?;
        Ok(Some(bytes::Bytes::copy_from_slice(slice)))
    }

    /// `[value]`: `[int]` length `n`; `-1` is null, `-2` is "not set",
    /// otherwise `n` raw bytes.
    pub fn read_value(&mut self) -> Result<Value> {
        let len = self.read_int()?;
        match len {
            -1 => Ok(Value::Null),
            -2 => Ok(Value::NotSet),
            n if n < 0 => Err(CursorError::NegativeCount(n)),
            n => {
                let slice = self.take(n as usize)?;
                Ok(Value::Bytes(bytes::Bytes::copy_from_slice(slice)))
            },
        }
    }

    /// `[string list]`: `[short]` count then that many `[string]`.
    pub fn read_string_list(&mut self) -> Result<Vec<String>> {
        let count = self.read_short()?;
        (0..count).map(|_| self.read_string()).collect()
    }

    /// `[string map]`: `[short]` count then (`[string]`, `[string]`) pairs.
    pub fn read_string_map(&mut self) -> Result<Vec<(String, String)>> {
        let count = self.read_short()?;
        (0..count).map(|_| Ok((self.read_string()?, self.read_string()?))).collect()
    }

    /// `[string multimap]`: `[short]` count then (`[string]`, `[string
    /// list]`) pairs.
    pub fn read_string_multimap(&mut self) -> Result<Vec<(String, Vec<String>)>> {
        let count = self.read_short()?;
        (0..count).map(|_| Ok((self.read_string()?, self.read_string_list()?))).collect()
    }

    /// `[inet]`: 1-byte address length (4 or 16) + address + `[int]` port.
    pub fn read_inet(&mut self) -> Result<SocketAddr> {
        let len = self.read_u8()?;
        let ip = match len {
            4 => {
                let octets: [u8; 4] = self.take(4)?.try_into().expect("exactly 4 bytes");
                IpAddr::V4(Ipv4Addr::from(octets))
            },
            16 => {
                let octets: [u8; 16] = self.take(16)?.try_into().expect("exactly 16 bytes");
                IpAddr::V6(Ipv6Addr::from(octets))
            },
            other => return Err(CursorError::InvalidInetLength(other)),
        };
        let port = self.read_nonneg_int()?;
        Ok(SocketAddr::new(ip, port as u16))
    }

    /// `[uuid]`: 16 raw bytes.
    pub fn read_uuid(&mut self) -> Result<[u8; 16]> {
        Ok(self.take(16)?.try_into().expect("exactly 16 bytes"))
    }

    /// `[short bytes]`: `[short]` length `n`, then `n` raw bytes (used for
    /// prepared-statement ids, which are never null).
    pub fn read_short_bytes(&mut self) -> Result<bytes::Bytes> {
        let len = self.read_short()? as usize;
        Ok(bytes::Bytes::copy_from_slice(self.take(len)?))
    }

    fn read_nonneg_int(&mut self) -> Result<usize> {
        let len = self.read_int()?;
        if len < 0 {
            return Err(CursorError::NegativeCount(len));
        }
        Ok(len as usize)
    }
}

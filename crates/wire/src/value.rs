// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tagged values, the protocol's only payload vocabulary.

use std::fmt;

use crate::buffer::{ByteReader, ByteWriter};
use crate::error::WireError;

/// The four value types a message can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Bytes,
    Int32,
    Int64,
}

impl ValueKind {
    pub const fn tag(self) -> u8 {
        match self {
            ValueKind::Text => 0,
            ValueKind::Bytes => 1,
            ValueKind::Int32 => 2,
            ValueKind::Int64 => 3,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self, WireError> {
        match tag {
            0 => Ok(ValueKind::Text),
            1 => Ok(ValueKind::Bytes),
            2 => Ok(ValueKind::Int32),
            3 => Ok(ValueKind::Int64),
            other => Err(WireError::UnknownValueType(other)),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Text => "text",
            ValueKind::Bytes => "bytes",
            ValueKind::Int32 => "int32",
            ValueKind::Int64 => "int64",
        };
        f.write_str(name)
    }
}

/// One tagged value: a UTF-8 string, a byte blob, or a fixed-width integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Bytes(Vec<u8>),
    Int32(i32),
    Int64(i64),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn bytes(b: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(b.into())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Text(_) => ValueKind::Text,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Int32(_) => ValueKind::Int32,
            Value::Int64(_) => ValueKind::Int64,
        }
    }

    pub(crate) fn encode(&self, w: &mut ByteWriter) -> Result<(), WireError> {
        w.put_u8(self.kind().tag())?;
        match self {
            Value::Text(s) => w.put_blob(s.as_bytes()),
            Value::Bytes(b) => w.put_blob(b),
            Value::Int32(v) => w.put_i32(*v),
            Value::Int64(v) => w.put_i64(*v),
        }
    }

    pub(crate) fn decode(r: &mut ByteReader<'_>) -> Result<Self, WireError> {
        match ValueKind::from_tag(r.get_u8()?)? {
            ValueKind::Text => {
                let raw = r.get_blob()?;
                let text = std::str::from_utf8(raw)
                    .map_err(|_| WireError::Malformed("text value is not valid UTF-8"))?;
                Ok(Value::Text(text.to_string()))
            }
            ValueKind::Bytes => Ok(Value::Bytes(r.get_blob()?.to_vec())),
            ValueKind::Int32 => Ok(Value::Int32(r.get_i32()?)),
            ValueKind::Int64 => Ok(Value::Int64(r.get_i64()?)),
        }
    }
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;

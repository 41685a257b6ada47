// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request frames: `[id][operation tag][declared arity][values...]`.

use crate::buffer::{ByteReader, ByteWriter};
use crate::error::{DecodeError, WireError};
use crate::operation::OperationKind;
use crate::value::{Value, ValueKind};
use crate::MAX_MESSAGE_BYTES;

/// Request id stamped on every daemon-initiated callback frame. Client ids
/// start at 1, so the two spaces never collide.
pub const CALLBACK_REQUEST_ID: i32 = 0;

/// Id used in error replies when the inbound datagram was too mangled to
/// recover a request id from.
pub const UNPARSEABLE_REQUEST_ID: i32 = -1;

/// One decoded request frame.
///
/// Construction goes through [`Request::new`] or the typed constructors, so a
/// `Request` always carries the catalog arity for its kind. Parameter *types*
/// are not enforced at construction; [`Request::check_params`] does that, and
/// it is the first thing a servicer runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    id: i32,
    kind: OperationKind,
    params: Vec<Value>,
}

impl Request {
    pub fn new(id: i32, kind: OperationKind, params: Vec<Value>) -> Result<Self, WireError> {
        if params.len() != kind.arity() {
            return Err(WireError::ParamCountMismatch {
                kind,
                actual: params.len(),
                expected: kind.arity(),
            });
        }
        Ok(Request { id, kind, params })
    }

    pub fn empty(id: i32) -> Self {
        Request { id, kind: OperationKind::Empty, params: Vec::new() }
    }

    pub fn read(id: i32, path: impl Into<String>) -> Self {
        Request { id, kind: OperationKind::Read, params: vec![Value::text(path)] }
    }

    pub fn insert(id: i32, offset: i32, path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Request {
            id,
            kind: OperationKind::Insert,
            params: vec![Value::Int32(offset), Value::text(path), Value::bytes(data)],
        }
    }

    pub fn get_attr(id: i32, path: impl Into<String>) -> Self {
        Request { id, kind: OperationKind::GetAttr, params: vec![Value::text(path)] }
    }

    pub fn list_dir(id: i32, path: impl Into<String>) -> Self {
        Request { id, kind: OperationKind::ListDir, params: vec![Value::text(path)] }
    }

    pub fn touch(id: i32, path: impl Into<String>) -> Self {
        Request { id, kind: OperationKind::Touch, params: vec![Value::text(path)] }
    }

    pub fn register(id: i32, interval_ms: i32, path: impl Into<String>) -> Self {
        Request {
            id,
            kind: OperationKind::Register,
            params: vec![Value::Int32(interval_ms), Value::text(path)],
        }
    }

    pub fn append(id: i32, path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Request {
            id,
            kind: OperationKind::Append,
            params: vec![Value::text(path), Value::bytes(data)],
        }
    }

    /// Build the daemon-to-client notification for a changed file.
    pub fn file_updated(path: impl Into<String>, mtime_ms: i64, data: impl Into<Vec<u8>>) -> Self {
        Request {
            id: CALLBACK_REQUEST_ID,
            kind: OperationKind::FileUpdated,
            params: vec![Value::text(path), Value::Int64(mtime_ms), Value::bytes(data)],
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Verify every parameter carries the type the catalog assigns its slot.
    pub fn check_params(&self) -> Result<(), WireError> {
        let expected = self.kind.param_kinds();
        if self.params.len() != expected.len() {
            return Err(WireError::ParamCountMismatch {
                kind: self.kind,
                actual: self.params.len(),
                expected: expected.len(),
            });
        }
        for (position, (value, want)) in self.params.iter().zip(expected).enumerate() {
            if value.kind() != *want {
                return Err(WireError::ParamType { kind: self.kind, position, expected: *want });
            }
        }
        Ok(())
    }

    pub fn text_param(&self, position: usize) -> Result<&str, WireError> {
        match self.params.get(position) {
            Some(Value::Text(s)) => Ok(s),
            _ => Err(self.param_type_error(position, ValueKind::Text)),
        }
    }

    pub fn bytes_param(&self, position: usize) -> Result<&[u8], WireError> {
        match self.params.get(position) {
            Some(Value::Bytes(b)) => Ok(b),
            _ => Err(self.param_type_error(position, ValueKind::Bytes)),
        }
    }

    pub fn i32_param(&self, position: usize) -> Result<i32, WireError> {
        match self.params.get(position) {
            Some(Value::Int32(v)) => Ok(*v),
            _ => Err(self.param_type_error(position, ValueKind::Int32)),
        }
    }

    pub fn i64_param(&self, position: usize) -> Result<i64, WireError> {
        match self.params.get(position) {
            Some(Value::Int64(v)) => Ok(*v),
            _ => Err(self.param_type_error(position, ValueKind::Int64)),
        }
    }

    fn param_type_error(&self, position: usize, expected: ValueKind) -> WireError {
        WireError::ParamType { kind: self.kind, position, expected }
    }

    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        let mut w = ByteWriter::with_capacity(MAX_MESSAGE_BYTES);
        w.put_i32(self.id)?;
        w.put_u8(self.kind.tag())?;
        w.put_i32(self.params.len() as i32)?;
        for value in &self.params {
            value.encode(&mut w)?;
        }
        Ok(w.into_bytes())
    }

    /// Decode a frame arriving at the daemon. Callback kinds are refused.
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        Self::decode_frame(buf, false)
    }

    /// Decode a frame arriving at a client's callback socket. Only callback
    /// kinds are accepted.
    pub fn decode_callback(buf: &[u8]) -> Result<Self, DecodeError> {
        Self::decode_frame(buf, true)
    }

    fn decode_frame(buf: &[u8], expect_callback: bool) -> Result<Self, DecodeError> {
        let mut r = ByteReader::new(buf);
        let id = match r.get_i32() {
            Ok(id) => id,
            Err(source) => return Err(DecodeError { request_id: None, source }),
        };
        Self::decode_tail(&mut r, id, expect_callback)
            .map_err(|source| DecodeError { request_id: Some(id), source })
    }

    fn decode_tail(
        r: &mut ByteReader<'_>,
        id: i32,
        expect_callback: bool,
    ) -> Result<Self, WireError> {
        let kind = OperationKind::from_tag(r.get_u8()?)?;
        if expect_callback {
            if !kind.is_callback() {
                return Err(WireError::NotCallback(kind));
            }
        } else if kind.is_callback() {
            return Err(WireError::UnsupportedInbound(kind));
        }
        let declared = r.get_i32()?;
        let expected = kind.arity();
        if declared != expected as i32 {
            return Err(WireError::ArityMismatch { kind, declared, expected });
        }
        let mut params = Vec::with_capacity(expected);
        for _ in 0..expected {
            params.push(Value::decode(r)?);
        }
        Ok(Request { id, kind, params })
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Response frames: `[request id][status code][value count][values...]`.

use crate::buffer::{ByteReader, ByteWriter};
use crate::error::WireError;
use crate::status::Status;
use crate::value::Value;
use crate::MAX_MESSAGE_BYTES;

/// One reply frame, echoing the request id it answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    request_id: i32,
    status: Status,
    values: Vec<Value>,
}

impl Response {
    pub fn new(request_id: i32, status: Status, values: Vec<Value>) -> Self {
        Response { request_id, status, values }
    }

    pub fn ok(request_id: i32, values: Vec<Value>) -> Self {
        Response { request_id, status: Status::Ok, values }
    }

    /// An error reply carries a single human-readable message value.
    pub fn error(request_id: i32, status: Status, message: impl Into<String>) -> Self {
        Response { request_id, status, values: vec![Value::text(message)] }
    }

    pub fn request_id(&self) -> i32 {
        self.request_id
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn encode(&self) -> Result<Vec<u8>, WireError> {
        let mut w = ByteWriter::with_capacity(MAX_MESSAGE_BYTES);
        w.put_i32(self.request_id)?;
        w.put_u8(self.status.code())?;
        w.put_i32(self.values.len() as i32)?;
        for value in &self.values {
            value.encode(&mut w)?;
        }
        Ok(w.into_bytes())
    }

    pub fn decode(buf: &[u8]) -> Result<Self, WireError> {
        let mut r = ByteReader::new(buf);
        let request_id = r.get_i32()?;
        let status = Status::from_code(r.get_u8()?);
        let count = r.get_i32()?;
        if count < 0 {
            return Err(WireError::Malformed("negative value count"));
        }
        let mut values = Vec::new();
        for _ in 0..count {
            values.push(Value::decode(&mut r)?);
        }
        Ok(Response { request_id, status, values })
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;

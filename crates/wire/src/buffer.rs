// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sequential big-endian byte cursors.
//!
//! The writer refuses to grow past its capacity, the reader refuses to
//! read past its input. Both surface the same "malformed message" error
//! kind so callers treat underrun and overrun uniformly.

use crate::error::WireError;

/// Append-only big-endian writer with a hard capacity.
pub struct ByteWriter {
    buf: Vec<u8>,
    capacity: usize,
}

impl ByteWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { buf: Vec::new(), capacity }
    }

    fn reserve(&mut self, extra: usize) -> Result<(), WireError> {
        if self.buf.len().saturating_add(extra) > self.capacity {
            return Err(WireError::Malformed("message exceeds datagram capacity"));
        }
        Ok(())
    }

    pub fn put_u8(&mut self, v: u8) -> Result<(), WireError> {
        self.reserve(1)?;
        self.buf.push(v);
        Ok(())
    }

    pub fn put_i32(&mut self, v: i32) -> Result<(), WireError> {
        self.reserve(4)?;
        self.buf.extend_from_slice(&v.to_be_bytes());
        Ok(())
    }

    pub fn put_i64(&mut self, v: i64) -> Result<(), WireError> {
        self.reserve(8)?;
        self.buf.extend_from_slice(&v.to_be_bytes());
        Ok(())
    }

    /// Write an i32 length prefix followed by the raw bytes.
    pub fn put_blob(&mut self, bytes: &[u8]) -> Result<(), WireError> {
        let len = i32::try_from(bytes.len())
            .map_err(|_| WireError::Malformed("blob too long for a length prefix"))?;
        self.reserve(4 + bytes.len())?;
        self.buf.extend_from_slice(&len.to_be_bytes());
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Forward-only big-endian reader over a borrowed slice.
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        if self.remaining() < n {
            return Err(WireError::Malformed("read past end of message"));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn get_u8(&mut self) -> Result<u8, WireError> {
        Ok(self.take(1)?[0])
    }

    pub fn get_i32(&mut self) -> Result<i32, WireError> {
        let b = self.take(4)?;
        Ok(i32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn get_i64(&mut self) -> Result<i64, WireError> {
        let b = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(b);
        Ok(i64::from_be_bytes(raw))
    }

    /// Read an i32 length prefix and then that many raw bytes.
    pub fn get_blob(&mut self) -> Result<&'a [u8], WireError> {
        let len = self.get_i32()?;
        let len =
            usize::try_from(len).map_err(|_| WireError::Malformed("negative length prefix"))?;
        self.take(len)
    }
}

#[cfg(test)]
#[path = "buffer_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Response status codes.

use std::fmt;

/// Outcome of a request, as carried in the response header.
///
/// Decoding never fails on the status byte: codes outside the catalog map to
/// [`Status::Unknown`] so a reply from a newer daemon still parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    BadRequest,
    NotFound,
    InternalError,
    Unknown,
}

impl Status {
    pub const fn code(self) -> u8 {
        match self {
            Status::Ok => 0,
            Status::BadRequest => 1,
            Status::NotFound => 2,
            Status::InternalError => 3,
            Status::Unknown => 4,
        }
    }

    pub const fn from_code(code: u8) -> Self {
        match code {
            0 => Status::Ok,
            1 => Status::BadRequest,
            2 => Status::NotFound,
            3 => Status::InternalError,
            _ => Status::Unknown,
        }
    }

    pub const fn is_ok(self) -> bool {
        matches!(self, Status::Ok)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Ok => "OK",
            Status::BadRequest => "BAD_REQUEST",
            Status::NotFound => "NOT_FOUND",
            Status::InternalError => "INTERNAL_ERROR",
            Status::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client-side errors.

use std::io;

use rfs_wire::{OperationKind, Status, WireError};
use thiserror::Error;

/// Everything that can go wrong between typing a command and printing
/// its result.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-OK status.
    #[error("{op} rejected: {status}: {message}")]
    Rejected { op: OperationKind, status: Status, message: String },

    /// No matching reply arrived before the retries ran out.
    #[error("no reply after {attempts} attempts; is the server up?")]
    Timeout { attempts: u32 },

    /// A reply decoded fine but did not carry the values its operation
    /// promises.
    #[error("unexpected reply shape for {0}")]
    UnexpectedReply(OperationKind),

    /// Local validation failed before anything was sent.
    #[error("{0}")]
    Invalid(String),

    #[error("read offset {offset} is out of range (file is {len} bytes)")]
    OutOfRange { offset: usize, len: usize },

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error("socket error: {0}")]
    Io(#[from] io::Error),
}

impl ClientError {
    /// True when the server said the thing does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Rejected { status: Status::NotFound, .. })
    }
}

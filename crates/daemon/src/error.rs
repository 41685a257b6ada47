// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service-level errors and their mapping onto reply status codes.

use std::io;

use rfs_wire::{Status, WireError};

/// Failure of one request, carrying the message sent back to the client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ServiceError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    pub fn status(&self) -> Status {
        match self {
            ServiceError::BadRequest(_) => Status::BadRequest,
            ServiceError::NotFound(_) => Status::NotFound,
            ServiceError::Internal(_) => Status::InternalError,
        }
    }
}

impl From<io::Error> for ServiceError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ServiceError::NotFound(err.to_string()),
            _ => ServiceError::Internal(err.to_string()),
        }
    }
}

impl From<WireError> for ServiceError {
    fn from(err: WireError) -> Self {
        ServiceError::BadRequest(err.to_string())
    }
}

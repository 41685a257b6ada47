// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Codec error types.

use thiserror::Error;

use crate::operation::OperationKind;
use crate::value::ValueKind;

/// Everything that can go wrong while encoding or decoding a message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    /// Truncated input, over-long output, or a byte sequence that cannot
    /// mean anything in this protocol.
    #[error("malformed message: {0}")]
    Malformed(&'static str),

    #[error("unknown value type {0}")]
    UnknownValueType(u8),

    #[error("unknown operation {0}")]
    UnknownOperation(u8),

    /// A server-push operation arrived on the client-to-server path.
    #[error("unsupported inbound operation {0}")]
    UnsupportedInbound(OperationKind),

    /// An id-0 datagram carried something other than a server push.
    #[error("inbound {0} is not a server-push callback")]
    NotCallback(OperationKind),

    /// The declared arity in the header disagrees with the catalog.
    #[error("{kind} declares {declared} parameters, catalog says {expected}")]
    ArityMismatch {
        kind: OperationKind,
        declared: i32,
        expected: usize,
    },

    /// The attached parameter list disagrees with the catalog arity.
    #[error("{kind} takes {expected} parameters, got {actual}")]
    ParamCountMismatch {
        kind: OperationKind,
        actual: usize,
        expected: usize,
    },

    /// A parameter's value type disagrees with the catalog shape.
    #[error("{kind} parameter {position} must be {expected}")]
    ParamType {
        kind: OperationKind,
        position: usize,
        expected: ValueKind,
    },
}

/// A request decode failure, carrying the request id when the header was
/// readable so the reply can still reference it.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{source}")]
pub struct DecodeError {
    pub request_id: Option<i32>,
    #[source]
    pub source: WireError,
}

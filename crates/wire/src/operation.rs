// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The operation catalog: every request kind the protocol knows, with its
//! wire tag and parameter signature.

use std::fmt;

use crate::error::WireError;
use crate::value::ValueKind;

/// Every operation a request frame can name.
///
/// [`OperationKind::FileUpdated`] is the one callback: the daemon sends it to
/// subscribed clients and refuses it inbound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Empty,
    Read,
    Insert,
    GetAttr,
    ListDir,
    Touch,
    Register,
    Append,
    FileUpdated,
}

impl OperationKind {
    pub const fn tag(self) -> u8 {
        match self {
            OperationKind::Empty => 0,
            OperationKind::Read => 1,
            OperationKind::Insert => 2,
            OperationKind::GetAttr => 3,
            OperationKind::ListDir => 4,
            OperationKind::Touch => 5,
            OperationKind::Register => 6,
            OperationKind::Append => 7,
            OperationKind::FileUpdated => 8,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self, WireError> {
        match tag {
            0 => Ok(OperationKind::Empty),
            1 => Ok(OperationKind::Read),
            2 => Ok(OperationKind::Insert),
            3 => Ok(OperationKind::GetAttr),
            4 => Ok(OperationKind::ListDir),
            5 => Ok(OperationKind::Touch),
            6 => Ok(OperationKind::Register),
            7 => Ok(OperationKind::Append),
            8 => Ok(OperationKind::FileUpdated),
            other => Err(WireError::UnknownOperation(other)),
        }
    }

    /// Positional parameter signature, in wire order.
    pub const fn param_kinds(self) -> &'static [ValueKind] {
        match self {
            OperationKind::Empty => &[],
            OperationKind::Read => &[ValueKind::Text],
            OperationKind::Insert => &[ValueKind::Int32, ValueKind::Text, ValueKind::Bytes],
            OperationKind::GetAttr => &[ValueKind::Text],
            OperationKind::ListDir => &[ValueKind::Text],
            OperationKind::Touch => &[ValueKind::Text],
            OperationKind::Register => &[ValueKind::Int32, ValueKind::Text],
            OperationKind::Append => &[ValueKind::Text, ValueKind::Bytes],
            OperationKind::FileUpdated => &[ValueKind::Text, ValueKind::Int64, ValueKind::Bytes],
        }
    }

    pub const fn arity(self) -> usize {
        self.param_kinds().len()
    }

    /// True for operations that travel daemon-to-client only.
    pub const fn is_callback(self) -> bool {
        matches!(self, OperationKind::FileUpdated)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Empty => "EMPTY",
            OperationKind::Read => "READ",
            OperationKind::Insert => "INSERT",
            OperationKind::GetAttr => "GET_ATTR",
            OperationKind::ListDir => "LIST_DIR",
            OperationKind::Touch => "TOUCH",
            OperationKind::Register => "REGISTER",
            OperationKind::Append => "APPEND",
            OperationKind::FileUpdated => "FILE_UPDATED",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
#[path = "operation_tests.rs"]
mod tests;

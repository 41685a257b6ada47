// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire protocol for the UDP file service.
//!
//! Every message is one datagram of at most [`MAX_MESSAGE_BYTES`], encoded
//! positionally in big-endian byte order. A request is
//! `[i32 id][u8 operation][i32 arity][values...]`; a response is
//! `[i32 request id][u8 status][i32 count][values...]`. Each value is a
//! one-byte type tag followed by its payload; text and byte payloads carry
//! an i32 length prefix, integers are fixed width. There is no
//! fragmentation: a message that does not fit a datagram fails to encode.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod buffer;
mod error;
mod operation;
mod request;
mod response;
mod status;
mod value;

pub use buffer::{ByteReader, ByteWriter};
pub use error::{DecodeError, WireError};
pub use operation::OperationKind;
pub use request::{Request, CALLBACK_REQUEST_ID, UNPARSEABLE_REQUEST_ID};
pub use response::Response;
pub use status::Status;
pub use value::{Value, ValueKind};

/// Upper bound on an encoded message, and therefore on a datagram.
pub const MAX_MESSAGE_BYTES: usize = 4096;

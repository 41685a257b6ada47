// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! rfs daemon library
//!
//! Serves a directory tree over UDP: file reads and edits, directory
//! listings, and update callbacks pushed to registered clients. The request
//! handling stack is layered so invocation semantics (at-least-once vs
//! at-most-once) wrap the file operations without touching them.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod env;
pub mod error;
pub mod fault;
pub mod ops;
pub mod registry;
pub mod semantics;
pub mod server;
pub mod store;

pub use config::{Mode, ServerConfig};
pub use error::ServiceError;
pub use ops::Operations;
pub use semantics::{AtLeastOnce, AtMostOnce, Servicer};
pub use server::{Server, ServerError};
pub use store::FileStore;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rfs-core: shared building blocks for the rfs client and daemon.

pub mod clock;
pub mod paths;

pub use clock::{Clock, FakeClock, SystemClock};
pub use paths::normalize;

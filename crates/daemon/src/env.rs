// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

/// In-flight request cap (default 64, configurable via `RFS_MAX_INFLIGHT`).
pub fn max_inflight() -> usize {
    std::env::var("RFS_MAX_INFLIGHT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(64)
}

/// Completed-reply retention for at-most-once mode (default 4096,
/// configurable via `RFS_DEDUP_CAPACITY`).
pub fn dedup_capacity() -> usize {
    std::env::var("RFS_DEDUP_CAPACITY")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(4096)
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client-side copies of server files, with interval-based freshness.
//!
//! Every entry remembers when it was last validated against the server. A
//! lookup inside the freshness interval serves straight from memory; once
//! the interval has passed, the caller is expected to compare modification
//! times with the server before trusting the copy, then either replace it
//! or restart the window with [`Cache::mark_valid`].

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rfs_core::Clock;
use tracing::debug;

struct Entry {
    content: Vec<u8>,
    mtime_ms: i64,
    validated_at: Instant,
}

/// What a lookup found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedFile {
    pub content: Vec<u8>,
    /// The server's modification time when the content was obtained.
    pub mtime_ms: i64,
    /// Whether the entry is still inside its freshness interval.
    pub fresh: bool,
}

pub struct Cache<C> {
    entries: Mutex<HashMap<String, Entry>>,
    fresh_interval: Duration,
    clock: C,
}

impl<C: Clock> Cache<C> {
    pub fn new(fresh_interval: Duration, clock: C) -> Self {
        Self { entries: Mutex::new(HashMap::new()), fresh_interval, clock }
    }

    pub fn lookup(&self, path: &str) -> Option<CachedFile> {
        let entries = self.entries.lock();
        let entry = entries.get(path)?;
        let fresh = self.clock.now().duration_since(entry.validated_at) < self.fresh_interval;
        Some(CachedFile { content: entry.content.clone(), mtime_ms: entry.mtime_ms, fresh })
    }

    /// Store content obtained from the server, stamped with the server's
    /// modification time. Starts a fresh validation window.
    pub fn put(&self, path: &str, content: Vec<u8>, mtime_ms: i64) {
        debug!(%path, bytes = content.len(), mtime_ms, "cache update");
        let entry = Entry { content, mtime_ms, validated_at: self.clock.now() };
        self.entries.lock().insert(path.to_string(), entry);
    }

    /// Restart the freshness window after the server confirmed the copy is
    /// still current.
    pub fn mark_valid(&self, path: &str) {
        if let Some(entry) = self.entries.lock().get_mut(path) {
            entry.validated_at = self.clock.now();
        }
    }

    /// Forget a path, e.g. after writing through it.
    pub fn invalidate(&self, path: &str) {
        self.entries.lock().remove(path);
    }
}

#[cfg(test)]
#[path = "cache_tests.rs"]
mod tests;

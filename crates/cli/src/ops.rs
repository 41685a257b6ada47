// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed file operations with the client cache in front.
//!
//! Reads are served from the cache while the entry is inside its
//! freshness interval. A stale entry is revalidated by comparing
//! modification times with the server, which costs one GET_ATTR instead
//! of a full transfer when the file has not changed. Writes go straight
//! through and drop the cached copy.

use std::sync::Arc;

use async_trait::async_trait;
use rfs_core::{paths, Clock};
use tracing::debug;

use crate::cache::{Cache, CachedFile};
use crate::error::ClientError;

/// The remote operations a client issues, one method per request kind.
/// [`crate::proxy::Proxy`] is the wire implementation; tests substitute a
/// scripted one.
#[async_trait]
pub trait Stub: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, ClientError>;
    async fn insert(&self, path: &str, offset: i32, data: &[u8]) -> Result<(), ClientError>;
    async fn append(&self, path: &str, data: &[u8]) -> Result<(), ClientError>;
    async fn touch(&self, path: &str) -> Result<i64, ClientError>;
    async fn attrs(&self, path: &str) -> Result<(i64, i64), ClientError>;
    async fn list_dir(&self, path: &str) -> Result<Vec<String>, ClientError>;
    async fn register(&self, path: &str, interval_ms: i32) -> Result<(), ClientError>;
}

/// A byte range read through the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOutcome {
    pub bytes: Vec<u8>,
    /// True when the range ran past the end of the file and was cut short.
    pub truncated: bool,
}

pub struct FileOps<S, C> {
    stub: S,
    cache: Arc<Cache<C>>,
}

impl<S: Stub, C: Clock> FileOps<S, C> {
    pub fn new(stub: S, cache: Arc<Cache<C>>) -> Self {
        Self { stub, cache }
    }

    /// Read `count` bytes at `offset`.
    pub async fn read(
        &self,
        path: &str,
        offset: usize,
        count: usize,
    ) -> Result<ReadOutcome, ClientError> {
        let key = key(path)?;
        let content = self.content(&key).await?;
        slice(&content, offset, count)
    }

    /// Splice `data` into the file at `offset`, then drop the cached copy
    /// so the next read refetches.
    pub async fn write(&self, path: &str, offset: i32, data: &[u8]) -> Result<(), ClientError> {
        let key = key(path)?;
        self.stub.insert(&key, offset, data).await?;
        self.cache.invalidate(&key);
        Ok(())
    }

    pub async fn append(&self, path: &str, data: &[u8]) -> Result<(), ClientError> {
        let key = key(path)?;
        self.stub.append(&key, data).await?;
        self.cache.invalidate(&key);
        Ok(())
    }

    /// Create the file or refresh its timestamps. The content is untouched,
    /// so any cached copy stays usable.
    pub async fn touch(&self, path: &str) -> Result<i64, ClientError> {
        self.stub.touch(&key(path)?).await
    }

    pub async fn list_dir(&self, path: &str) -> Result<Vec<String>, ClientError> {
        self.stub.list_dir(&key(path)?).await
    }

    pub async fn attrs(&self, path: &str) -> Result<(i64, i64), ClientError> {
        self.stub.attrs(&key(path)?).await
    }

    pub async fn register(&self, path: &str, interval_ms: i32) -> Result<(), ClientError> {
        self.stub.register(&key(path)?, interval_ms).await
    }

    async fn content(&self, key: &str) -> Result<Vec<u8>, ClientError> {
        match self.cache.lookup(key) {
            Some(cached) if cached.fresh => {
                debug!(path = %key, "cache hit");
                Ok(cached.content)
            }
            Some(cached) => self.revalidate(key, cached).await,
            None => self.fill(key).await,
        }
    }

    async fn fill(&self, key: &str) -> Result<Vec<u8>, ClientError> {
        debug!(path = %key, "cache miss, fetching");
        let content = self.stub.fetch(key).await?;
        let (mtime_ms, _) = self.stub.attrs(key).await?;
        self.cache.put(key, content.clone(), mtime_ms);
        Ok(content)
    }

    /// The entry aged out of its freshness window: ask the server for the
    /// current modification time and refetch only if ours is behind.
    async fn revalidate(&self, key: &str, cached: CachedFile) -> Result<Vec<u8>, ClientError> {
        let (server_mtime_ms, _) = match self.stub.attrs(key).await {
            Ok(attrs) => attrs,
            Err(err) => {
                if err.is_not_found() {
                    self.cache.invalidate(key);
                }
                return Err(err);
            }
        };
        if server_mtime_ms > cached.mtime_ms {
            debug!(path = %key, "cached copy is behind the server, refetching");
            let content = self.stub.fetch(key).await?;
            self.cache.put(key, content.clone(), server_mtime_ms);
            Ok(content)
        } else {
            self.cache.mark_valid(key);
            Ok(cached.content)
        }
    }
}

/// Reject escaping paths before they reach the wire, with the same
/// spelling the server caches and notifies under.
fn key(path: &str) -> Result<String, ClientError> {
    paths::normalize(path)
        .ok_or_else(|| ClientError::Invalid(format!("path escapes the served root: {path}")))
}

fn slice(content: &[u8], offset: usize, count: usize) -> Result<ReadOutcome, ClientError> {
    let len = content.len();
    if offset >= len {
        return Err(ClientError::OutOfRange { offset, len });
    }
    let requested_end = offset.saturating_add(count);
    let truncated = requested_end > len;
    Ok(ReadOutcome { bytes: content[offset..requested_end.min(len)].to_vec(), truncated })
}

#[cfg(test)]
#[path = "ops_tests.rs"]
mod tests;

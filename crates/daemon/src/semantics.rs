// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Invocation semantics wrapped around the operation handlers.
//!
//! At-least-once hands every datagram straight to the handlers, so a
//! retried request runs again. At-most-once remembers the reply for each
//! (client, request id) pair and replays it for duplicates, executing the
//! handler once no matter how many retries arrive. A failed request is
//! never remembered: its retry executes again.

use std::net::SocketAddr;

use async_trait::async_trait;
use indexmap::IndexMap;
use parking_lot::Mutex;
use rfs_core::Clock;
use rfs_wire::{Request, Value};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::ServiceError;
use crate::ops::Operations;
use crate::registry::CallbackSink;

/// Request execution behind a chosen duplicate policy.
#[async_trait]
pub trait Servicer: Send + Sync + 'static {
    async fn handle(
        &self,
        request: &Request,
        client: SocketAddr,
    ) -> Result<Vec<Value>, ServiceError>;
}

/// Executes every request as it arrives. Duplicates run again, which is
/// invisible for idempotent operations and visible for the rest.
pub struct AtLeastOnce<S, C> {
    ops: Operations<S, C>,
}

impl<S, C> AtLeastOnce<S, C> {
    pub fn new(ops: Operations<S, C>) -> Self {
        Self { ops }
    }
}

#[async_trait]
impl<S: CallbackSink, C: Clock + 'static> Servicer for AtLeastOnce<S, C> {
    async fn handle(
        &self,
        request: &Request,
        client: SocketAddr,
    ) -> Result<Vec<Value>, ServiceError> {
        request.check_params()?;
        self.ops.dispatch(request, client).await
    }
}

/// Duplicate-detection key. Two clients may use the same ids freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct RequestKey {
    client: SocketAddr,
    request_id: i32,
}

enum CacheEntry {
    /// Another task is executing this request; wait on the channel, then
    /// look again.
    InFlight(watch::Receiver<()>),
    /// Settled successfully; duplicates get these values back.
    Done(Vec<Value>),
}

/// Wraps another servicer with duplicate suppression.
///
/// The reply cache is bounded. Once `capacity` settled replies are held the
/// oldest are dropped, and a very late retry of a dropped request executes
/// again. In-flight entries are never dropped.
pub struct AtMostOnce<H> {
    inner: H,
    cache: Mutex<IndexMap<RequestKey, CacheEntry>>,
    capacity: usize,
}

impl<H: Servicer> AtMostOnce<H> {
    pub fn new(inner: H, capacity: usize) -> Self {
        Self { inner, cache: Mutex::new(IndexMap::new()), capacity }
    }

    async fn execute(
        &self,
        request: &Request,
        client: SocketAddr,
        key: RequestKey,
        settled: watch::Sender<()>,
    ) -> Result<Vec<Value>, ServiceError> {
        let result = self.inner.handle(request, client).await;
        {
            let mut cache = self.cache.lock();
            match &result {
                Ok(values) => {
                    cache.insert(key, CacheEntry::Done(values.clone()));
                    self.evict_excess(&mut cache);
                }
                // Failures are not remembered; a retry executes again.
                Err(_) => {
                    cache.shift_remove(&key);
                }
            }
        }
        // Wake duplicates parked on the claim.
        let _ = settled.send(());
        result
    }

    /// Drop the oldest settled replies until the cache fits its bound.
    fn evict_excess(&self, cache: &mut IndexMap<RequestKey, CacheEntry>) {
        while cache.len() > self.capacity {
            let oldest_done =
                cache.iter().position(|(_, entry)| matches!(entry, CacheEntry::Done(_)));
            match oldest_done {
                Some(index) => {
                    cache.shift_remove_index(index);
                }
                None => return,
            }
        }
    }

    /// Remove an in-flight entry whose executor went away without settling,
    /// so one of the waiting duplicates can claim the request itself.
    fn clear_dead_claim(&self, key: &RequestKey) {
        let mut cache = self.cache.lock();
        if let Some(CacheEntry::InFlight(pending)) = cache.get(key) {
            if pending.has_changed().is_err() {
                cache.shift_remove(key);
            }
        }
    }
}

#[async_trait]
impl<H: Servicer> Servicer for AtMostOnce<H> {
    async fn handle(
        &self,
        request: &Request,
        client: SocketAddr,
    ) -> Result<Vec<Value>, ServiceError> {
        let key = RequestKey { client, request_id: request.id() };
        loop {
            // The guard must leave scope before any await or the future is
            // not `Send`: claim the request under the lock, await after.
            let claim = {
                let mut cache = self.cache.lock();
                match cache.get(&key) {
                    Some(CacheEntry::Done(values)) => {
                        info!(id = key.request_id, %client, "duplicate request, replaying reply");
                        return Ok(values.clone());
                    }
                    Some(CacheEntry::InFlight(pending)) => Ok(pending.clone()),
                    None => {
                        let (settled, pending) = watch::channel(());
                        cache.insert(key, CacheEntry::InFlight(pending));
                        Err(settled)
                    }
                }
            };
            let mut waiter = match claim {
                Ok(pending) => pending,
                Err(settled) => return self.execute(request, client, key, settled).await,
            };
            debug!(id = key.request_id, %client, "duplicate of an in-flight request, waiting");
            if waiter.changed().await.is_err() {
                self.clear_dead_claim(&key);
            }
        }
    }
}

#[cfg(test)]
#[path = "semantics_tests.rs"]
mod tests;

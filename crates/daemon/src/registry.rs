// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subscription registry and update callback delivery.
//!
//! Clients register interest in a file for a bounded interval; every
//! mutation of that file afterwards pushes a FILE_UPDATED datagram to the
//! registered address. Nothing runs on a timer: expired subscriptions are
//! swept lazily the next time their file changes.

use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use rfs_core::Clock;
use rfs_wire::Request;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

use crate::error::ServiceError;
use crate::fault;

/// Transport for FILE_UPDATED frames. The daemon pushes over its serving
/// socket; tests swap in a recording fake.
#[async_trait]
pub trait CallbackSink: Send + Sync + 'static {
    async fn push(&self, client: SocketAddr, frame: &[u8]) -> io::Result<()>;
}

/// Sends callback frames over the serving UDP socket, subject to the
/// configured injected loss.
pub struct UdpCallbackSink {
    socket: Arc<UdpSocket>,
    loss_prob: f64,
}

impl UdpCallbackSink {
    pub fn new(socket: Arc<UdpSocket>, loss_prob: f64) -> Self {
        Self { socket, loss_prob }
    }
}

#[async_trait]
impl CallbackSink for UdpCallbackSink {
    async fn push(&self, client: SocketAddr, frame: &[u8]) -> io::Result<()> {
        if fault::unlucky(self.loss_prob) {
            info!(%client, "update callback dropped by loss injection");
            return Ok(());
        }
        self.socket.send_to(frame, client).await?;
        Ok(())
    }
}

/// One client's interest in one file.
#[derive(Debug, Clone, Copy)]
struct Subscription {
    registered_at: Instant,
    ttl: Duration,
}

impl Subscription {
    fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.registered_at) > self.ttl
    }
}

/// Tracks which client addresses want update callbacks for which files.
///
/// Keys are root-relative paths as produced by the file store, so the path
/// a client registered under and the path a mutation reports always use
/// the same spelling.
pub struct Registry<S, C> {
    subscriptions: Mutex<HashMap<String, HashMap<SocketAddr, Subscription>>>,
    sink: S,
    clock: C,
}

impl<S: CallbackSink, C: Clock> Registry<S, C> {
    pub fn new(sink: S, clock: C) -> Self {
        Self { subscriptions: Mutex::new(HashMap::new()), sink, clock }
    }

    /// Record `client`'s interest in `path` for the next `interval_ms`
    /// milliseconds. Registering again replaces the previous window.
    pub fn register(
        &self,
        path: &str,
        client: SocketAddr,
        interval_ms: i32,
    ) -> Result<(), ServiceError> {
        if interval_ms < 0 {
            return Err(ServiceError::bad_request(format!(
                "monitoring interval must not be negative: {interval_ms}"
            )));
        }
        let subscription = Subscription {
            registered_at: self.clock.now(),
            ttl: Duration::from_millis(interval_ms as u64),
        };
        let mut subscriptions = self.subscriptions.lock();
        subscriptions.entry(path.to_string()).or_default().insert(client, subscription);
        info!(%path, %client, interval_ms, "registered for updates");
        Ok(())
    }

    /// Push a FILE_UPDATED callback to every live subscriber of `path`.
    ///
    /// Fire and forget: a push that fails is logged and the subscription
    /// kept, so the next mutation tries that client again.
    pub async fn notify(&self, path: &str, mtime_ms: i64, content: &[u8]) {
        let targets = self.live_subscribers(path);
        if targets.is_empty() {
            return;
        }
        let frame = match Request::file_updated(path, mtime_ms, content).encode() {
            Ok(frame) => frame,
            Err(err) => {
                warn!(%path, %err, "update callback does not fit a datagram, nothing sent");
                return;
            }
        };
        for client in targets {
            debug!(%path, %client, "pushing file update");
            if let Err(err) = self.sink.push(client, &frame).await {
                warn!(%path, %client, %err, "failed to push file update");
            }
        }
    }

    /// Live subscriber addresses for `path`, dropping expired entries on
    /// the way through.
    fn live_subscribers(&self, path: &str) -> Vec<SocketAddr> {
        let now = self.clock.now();
        let mut subscriptions = self.subscriptions.lock();
        let Some(per_file) = subscriptions.get_mut(path) else {
            return Vec::new();
        };
        per_file.retain(|client, subscription| {
            let live = !subscription.expired(now);
            if !live {
                debug!(%path, %client, "subscription expired");
            }
            live
        });
        if per_file.is_empty() {
            subscriptions.remove(path);
            return Vec::new();
        }
        per_file.keys().copied().collect()
    }

    #[cfg(test)]
    fn subscriber_count(&self, path: &str) -> usize {
        self.subscriptions.lock().get(path).map_or(0, HashMap::len)
    }
}


#[cfg(test)]
pub use fake::{FakeSink, PushCall};

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;

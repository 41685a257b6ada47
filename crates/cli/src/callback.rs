// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for the callback socket.
//!
//! Two kinds of datagrams arrive on that socket: FILE_UPDATED frames
//! pushed by the daemon, recognizable by the reserved request id in the
//! first four bytes, and replies to REGISTER requests, which were sent
//! from this socket so the daemon records its address. Updates are
//! applied to the cache; replies are forwarded to the proxy.

use std::sync::Arc;

use rfs_core::Clock;
use rfs_wire::{Request, Response, CALLBACK_REQUEST_ID, MAX_MESSAGE_BYTES};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::Cache;

pub fn spawn_listener<C: Clock + 'static>(
    socket: Arc<UdpSocket>,
    cache: Arc<Cache<C>>,
    register_replies: mpsc::Sender<Response>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut buf = vec![0u8; MAX_MESSAGE_BYTES];
        loop {
            let (len, from) = match socket.recv_from(&mut buf).await {
                Ok(received) => received,
                Err(err) => {
                    warn!(%err, "callback socket receive failed");
                    break;
                }
            };
            let datagram = &buf[..len];
            if is_callback(datagram) {
                match Request::decode_callback(datagram) {
                    Ok(update) => apply(&cache, &update),
                    Err(err) => warn!(%from, %err, "ignoring malformed callback"),
                }
            } else {
                match Response::decode(datagram) {
                    Ok(reply) => {
                        // The proxy waits on this channel during REGISTER.
                        if register_replies.send(reply).await.is_err() {
                            break;
                        }
                    }
                    Err(err) => warn!(%from, %err, "ignoring undecodable datagram"),
                }
            }
        }
        debug!("callback listener stopped");
    })
}

/// Daemon-initiated frames carry the reserved callback request id; request
/// ids issued by this client start at 1, so replies never collide with it.
fn is_callback(datagram: &[u8]) -> bool {
    datagram.len() >= 4
        && i32::from_be_bytes([datagram[0], datagram[1], datagram[2], datagram[3]])
            == CALLBACK_REQUEST_ID
}

fn apply<C: Clock>(cache: &Cache<C>, update: &Request) {
    if let Err(err) = update.check_params() {
        warn!(%err, "ignoring mistyped callback");
        return;
    }
    let (Ok(path), Ok(mtime_ms), Ok(data)) =
        (update.text_param(0), update.i64_param(1), update.bytes_param(2))
    else {
        return;
    };
    info!(%path, bytes = data.len(), "file updated on the server");
    cache.put(path, data.to_vec(), mtime_ms);
}

#[cfg(test)]
#[path = "callback_tests.rs"]
mod tests;

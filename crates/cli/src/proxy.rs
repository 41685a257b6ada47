// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request/reply plumbing over UDP.
//!
//! One proxy owns the connected request socket. REGISTER is the exception
//! to the ordinary send/receive cycle: it goes out through the shared
//! callback socket, because the source address the server sees on a
//! REGISTER is where it will push FILE_UPDATED frames, and those have to
//! land on the socket the listener task reads. Replies to REGISTER come
//! back on that socket too and reach us through a channel.
//!
//! A request is encoded once and the same frame is resent on every
//! attempt, so the server can recognize retries by id. Replies whose id
//! does not match the outstanding request are stale echoes of earlier
//! attempts and are skipped without consuming the attempt window.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use rfs_wire::{OperationKind, Request, Response, Value, MAX_MESSAGE_BYTES};
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::ops::Stub;

/// How long one attempt waits for a matching reply.
const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Send attempts per request before giving up.
const MAX_ATTEMPTS: u32 = 5;

pub struct Proxy {
    socket: UdpSocket,
    callback_socket: Arc<UdpSocket>,
    server: SocketAddr,
    register_replies: Mutex<mpsc::Receiver<Response>>,
    next_id: AtomicI32,
    loss_prob: f64,
    recv_timeout: Duration,
    max_attempts: u32,
}

impl Proxy {
    /// Bind a fresh request socket and connect it to the server. The
    /// callback socket is bound by the caller and shared with the
    /// listener task, which forwards REGISTER replies into the channel.
    pub async fn connect(
        server: SocketAddr,
        callback_socket: Arc<UdpSocket>,
        register_replies: mpsc::Receiver<Response>,
        loss_prob: f64,
    ) -> Result<Self, ClientError> {
        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.connect(server).await?;
        Ok(Self {
            socket,
            callback_socket,
            server,
            register_replies: Mutex::new(register_replies),
            next_id: AtomicI32::new(1),
            loss_prob,
            recv_timeout: RECV_TIMEOUT,
            max_attempts: MAX_ATTEMPTS,
        })
    }

    fn fresh_id(&self) -> i32 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Simulated loss of an outbound request.
    fn request_lost(&self) -> bool {
        if self.loss_prob <= 0.0 {
            return false;
        }
        if self.loss_prob >= 1.0 {
            return true;
        }
        rand::thread_rng().gen_bool(self.loss_prob)
    }

    /// Send a request and wait for its reply, retrying on silence.
    async fn invoke(&self, request: &Request) -> Result<Vec<Value>, ClientError> {
        let frame = request.encode()?;
        for attempt in 1..=self.max_attempts {
            if self.request_lost() {
                warn!(
                    op = %request.kind(),
                    id = request.id(),
                    attempt,
                    "request dropped by loss injection"
                );
            } else {
                self.socket.send(&frame).await?;
            }
            if let Some(response) = self.await_reply(request.id()).await? {
                return unpack(request.kind(), response);
            }
            debug!(op = %request.kind(), id = request.id(), attempt, "no reply in time, retrying");
        }
        Err(ClientError::Timeout { attempts: self.max_attempts })
    }

    /// Wait up to the receive timeout for the reply to `id`.
    async fn await_reply(&self, id: i32) -> Result<Option<Response>, ClientError> {
        let deadline = Instant::now() + self.recv_timeout;
        let mut buf = vec![0u8; MAX_MESSAGE_BYTES];
        loop {
            let len = match timeout_at(deadline, self.socket.recv(&mut buf)).await {
                Err(_) => return Ok(None),
                Ok(received) => received?,
            };
            match Response::decode(&buf[..len]) {
                Ok(response) if response.request_id() == id => return Ok(Some(response)),
                Ok(stale) => {
                    debug!(got = stale.request_id(), want = id, "skipping stale reply");
                }
                Err(err) => warn!(%err, "skipping undecodable reply"),
            }
        }
    }

    /// REGISTER travels through the callback socket so the server records
    /// that socket's address as the push target.
    async fn send_register(&self, path: &str, interval_ms: i32) -> Result<(), ClientError> {
        let request = Request::register(self.fresh_id(), interval_ms, path);
        let frame = request.encode()?;
        let mut replies = self.register_replies.lock().await;
        // Forwarded replies to earlier, abandoned attempts may still queue.
        while replies.try_recv().is_ok() {}
        for attempt in 1..=self.max_attempts {
            if self.request_lost() {
                warn!(id = request.id(), attempt, "register dropped by loss injection");
            } else {
                self.callback_socket.send_to(&frame, self.server).await?;
            }
            let deadline = Instant::now() + self.recv_timeout;
            loop {
                match timeout_at(deadline, replies.recv()).await {
                    Err(_) => break,
                    Ok(None) => {
                        return Err(ClientError::Invalid("callback listener stopped".into()));
                    }
                    Ok(Some(response)) if response.request_id() == request.id() => {
                        return unpack(request.kind(), response).map(|_| ());
                    }
                    Ok(Some(stale)) => {
                        debug!(
                            got = stale.request_id(),
                            want = request.id(),
                            "skipping stale register reply"
                        );
                    }
                }
            }
            debug!(id = request.id(), attempt, "no register reply in time, retrying");
        }
        Err(ClientError::Timeout { attempts: self.max_attempts })
    }
}

#[async_trait]
impl Stub for Proxy {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, ClientError> {
        let values = self.invoke(&Request::read(self.fresh_id(), path)).await?;
        match values.into_iter().next() {
            Some(Value::Bytes(content)) => Ok(content),
            _ => Err(ClientError::UnexpectedReply(OperationKind::Read)),
        }
    }

    async fn insert(&self, path: &str, offset: i32, data: &[u8]) -> Result<(), ClientError> {
        self.invoke(&Request::insert(self.fresh_id(), offset, path, data)).await?;
        Ok(())
    }

    async fn append(&self, path: &str, data: &[u8]) -> Result<(), ClientError> {
        self.invoke(&Request::append(self.fresh_id(), path, data)).await?;
        Ok(())
    }

    async fn touch(&self, path: &str) -> Result<i64, ClientError> {
        let values = self.invoke(&Request::touch(self.fresh_id(), path)).await?;
        match values.as_slice() {
            [Value::Int64(at)] => Ok(*at),
            _ => Err(ClientError::UnexpectedReply(OperationKind::Touch)),
        }
    }

    async fn attrs(&self, path: &str) -> Result<(i64, i64), ClientError> {
        let values = self.invoke(&Request::get_attr(self.fresh_id(), path)).await?;
        match values.as_slice() {
            [Value::Int64(mtime_ms), Value::Int64(atime_ms)] => Ok((*mtime_ms, *atime_ms)),
            _ => Err(ClientError::UnexpectedReply(OperationKind::GetAttr)),
        }
    }

    async fn list_dir(&self, path: &str) -> Result<Vec<String>, ClientError> {
        let values = self.invoke(&Request::list_dir(self.fresh_id(), path)).await?;
        values
            .into_iter()
            .map(|value| match value {
                Value::Text(name) => Ok(name),
                _ => Err(ClientError::UnexpectedReply(OperationKind::ListDir)),
            })
            .collect()
    }

    async fn register(&self, path: &str, interval_ms: i32) -> Result<(), ClientError> {
        self.send_register(path, interval_ms).await
    }
}

/// Split a reply into its values, or surface the server's rejection.
fn unpack(op: OperationKind, response: Response) -> Result<Vec<Value>, ClientError> {
    if response.status().is_ok() {
        return Ok(response.into_values());
    }
    let message = match response.values().first() {
        Some(Value::Text(text)) => text.clone(),
        _ => String::new(),
    };
    Err(ClientError::Rejected { op, status: response.status(), message })
}

#[cfg(test)]
#[path = "proxy_tests.rs"]
mod tests;

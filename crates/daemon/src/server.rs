// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! UDP intake loop.
//!
//! One task receives datagrams and hands each one to a spawned handler,
//! bounded by a semaphore so a burst cannot spawn without limit. Handlers
//! decode, run the servicer stack, and send the reply themselves; the
//! loop never waits on a handler.

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use rfs_core::SystemClock;
use rfs_wire::{
    OperationKind, Request, Response, Status, MAX_MESSAGE_BYTES, UNPARSEABLE_REQUEST_ID,
};
use thiserror::Error;
use tokio::net::UdpSocket;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::{Mode, ServerConfig};
use crate::fault;
use crate::ops::Operations;
use crate::registry::{Registry, UdpCallbackSink};
use crate::semantics::{AtLeastOnce, AtMostOnce, Servicer};
use crate::store::FileStore;

/// Errors that stop the daemon from starting or keep it from serving.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("served root {0} is not a directory")]
    RootNotDirectory(PathBuf),

    #[error("failed to bind UDP port {port}: {source}")]
    Bind { port: u16, source: io::Error },

    #[error("socket error: {0}")]
    Io(#[from] io::Error),
}

/// A bound UDP file service, ready to run.
pub struct Server {
    config: ServerConfig,
    socket: Arc<UdpSocket>,
    servicer: Arc<dyn Servicer>,
    inflight: Arc<Semaphore>,
    local_addr: SocketAddr,
}

impl Server {
    /// Bind the socket and assemble the handler stack for `config`.
    /// Port 0 asks the OS for a free port; [`Server::port`] reports it.
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        if !config.root.is_dir() {
            return Err(ServerError::RootNotDirectory(config.root.clone()));
        }
        let socket = UdpSocket::bind(("0.0.0.0", config.port))
            .await
            .map_err(|source| ServerError::Bind { port: config.port, source })?;
        let socket = Arc::new(socket);
        let local_addr = socket.local_addr()?;

        let store = FileStore::new(&config.root);
        let sink = UdpCallbackSink::new(Arc::clone(&socket), config.callback_loss);
        let registry = Arc::new(Registry::new(sink, SystemClock));
        let handlers = AtLeastOnce::new(Operations::new(store, registry, SystemClock));
        let servicer: Arc<dyn Servicer> = match config.mode {
            Mode::AtLeastOnce => Arc::new(handlers),
            Mode::AtMostOnce => Arc::new(AtMostOnce::new(handlers, config.dedup_capacity)),
        };
        let inflight = Arc::new(Semaphore::new(config.max_inflight));

        Ok(Server { config, socket, servicer, inflight, local_addr })
    }

    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Receive and dispatch datagrams until `shutdown` fires.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<(), ServerError> {
        info!(
            port = self.port(),
            root = %self.config.root.display(),
            mode = %self.config.mode,
            "serving",
        );
        let mut buf = vec![0u8; MAX_MESSAGE_BYTES];
        loop {
            // Take the concurrency permit first so a full house exerts
            // backpressure at the socket instead of a spawn pileup.
            let permit = tokio::select! {
                _ = shutdown.cancelled() => break,
                permit = Arc::clone(&self.inflight).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    // The semaphore is never closed.
                    Err(_) => break,
                },
            };
            let (len, client) = tokio::select! {
                _ = shutdown.cancelled() => break,
                received = self.socket.recv_from(&mut buf) => match received {
                    Ok(pair) => pair,
                    Err(err) => {
                        error!(%err, "receive failed");
                        continue;
                    }
                },
            };
            let datagram = buf[..len].to_vec();
            let socket = Arc::clone(&self.socket);
            let servicer = Arc::clone(&self.servicer);
            let response_loss = self.config.response_loss;
            tokio::spawn(async move {
                let _permit = permit;
                handle_datagram(&socket, servicer.as_ref(), &datagram, client, response_loss)
                    .await;
            });
        }
        info!("shutting down");
        Ok(())
    }
}

/// Decode one datagram, run it, and reply. Every reply, error replies
/// included, passes the same loss draw.
async fn handle_datagram(
    socket: &UdpSocket,
    servicer: &dyn Servicer,
    datagram: &[u8],
    client: SocketAddr,
    response_loss: f64,
) {
    let response = match Request::decode(datagram) {
        Ok(request) => {
            // EMPTY is the liveness probe; keep it out of the info log.
            if request.kind() == OperationKind::Empty {
                debug!(id = request.id(), %client, "received probe");
            } else {
                info!(op = %request.kind(), id = request.id(), %client, "received request");
            }
            match servicer.handle(&request, client).await {
                Ok(values) => Response::ok(request.id(), values),
                Err(err) => {
                    warn!(op = %request.kind(), id = request.id(), %client, %err, "request failed");
                    Response::error(request.id(), err.status(), err.to_string())
                }
            }
        }
        Err(err) => {
            warn!(%client, %err, "rejected undecodable datagram");
            let id = err.request_id.unwrap_or(UNPARSEABLE_REQUEST_ID);
            Response::error(id, Status::BadRequest, err.to_string())
        }
    };
    send_reply(socket, client, &response, response_loss).await;
}

async fn send_reply(
    socket: &UdpSocket,
    client: SocketAddr,
    response: &Response,
    loss_prob: f64,
) {
    let frame = match response.encode() {
        Ok(frame) => frame,
        Err(err) => {
            error!(id = response.request_id(), %err, "reply does not fit a datagram, nothing sent");
            return;
        }
    };
    if fault::unlucky(loss_prob) {
        info!(id = response.request_id(), %client, "reply dropped by loss injection");
        return;
    }
    if let Err(err) = socket.send_to(&frame, client).await {
        warn!(%client, %err, "failed to send reply");
    }
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;

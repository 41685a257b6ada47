// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rfs: interactive client for a remote file service.

mod cache;
mod callback;
mod error;
mod ops;
mod proxy;
mod repl;

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use rfs_core::SystemClock;
use tokio::net::{lookup_host, UdpSocket};
use tokio::sync::mpsc;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::cache::Cache;
use crate::ops::FileOps;
use crate::proxy::Proxy;

#[derive(Debug, Parser)]
#[command(name = "rfs", version, about = "Interactive client for a remote file service")]
struct Args {
    /// Server host name or address.
    host: String,

    /// Server UDP port.
    port: u16,

    /// How long a cached file stays fresh without revalidation, in
    /// milliseconds. Zero revalidates on every read.
    #[arg(short = 'f', long = "fresh-interval-ms", default_value_t = 10_000)]
    fresh_interval_ms: u64,

    /// Probability that an outbound request is dropped before sending,
    /// for exercising retries.
    #[arg(
        short = 'l',
        long = "loss-prob",
        value_parser = parse_probability,
        default_value_t = 0.0
    )]
    loss_prob: f64,
}

/// Clap value parser for loss probabilities.
fn parse_probability(s: &str) -> Result<f64, String> {
    let p: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if !(0.0..=1.0).contains(&p) {
        return Err(format!("probability must be between 0 and 1, got {p}"));
    }
    Ok(p)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let server = resolve(&args.host, args.port).await?;
    let callback_socket = Arc::new(
        UdpSocket::bind("0.0.0.0:0").await.context("failed to bind the callback socket")?,
    );
    let cache = Arc::new(Cache::new(Duration::from_millis(args.fresh_interval_ms), SystemClock));

    let (replies_tx, replies_rx) = mpsc::channel(16);
    callback::spawn_listener(callback_socket.clone(), cache.clone(), replies_tx);

    let proxy = Proxy::connect(server, callback_socket, replies_rx, args.loss_prob)
        .await
        .context("failed to open a socket to the server")?;
    let ops = FileOps::new(proxy, cache);

    println!("connected to {server}");
    repl::run(&ops).await?;
    Ok(())
}

async fn resolve(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    let mut addrs =
        lookup_host((host, port)).await.with_context(|| format!("cannot resolve {host}:{port}"))?;
    addrs.next().ok_or_else(|| anyhow::anyhow!("no address for {host}:{port}"))
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var("RFS_LOG")
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

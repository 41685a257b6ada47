// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `rfsd` entry point: parse arguments, bind, announce readiness, serve.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rfs_daemon::config::parse_probability;
use rfs_daemon::{Mode, Server, ServerConfig, ServerError};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "rfsd", version, about = "UDP remote file service daemon")]
struct Args {
    /// Port to listen on; 0 picks a free one
    port: u16,

    /// Directory served to clients
    root: PathBuf,

    /// Invocation semantics for request handling
    #[arg(short = 'm', long, value_enum)]
    mode: Mode,

    /// Probability that a reply is dropped instead of sent
    #[arg(short = 'l', long = "loss-prob", value_parser = parse_probability, default_value_t = 0.0)]
    loss_prob: f64,

    /// Probability that an update callback is dropped instead of sent
    #[arg(long, value_parser = parse_probability, default_value_t = 0.0)]
    callback_loss_prob: f64,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    match serve(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn serve(args: Args) -> Result<(), ServerError> {
    let mut config = ServerConfig::new(args.port, args.root, args.mode);
    config.response_loss = args.loss_prob;
    config.callback_loss = args.callback_loss_prob;
    let server = Server::bind(config).await?;

    // Spawning parents (tests, scripts) read this line to learn the port.
    // Logs go to stderr, so stdout carries nothing else.
    println!("READY port={}", server.port());

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received");
            trigger.cancel();
        }
    });

    server.run(shutdown).await
}

fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var("RFS_LOG")
        .from_env_lossy();
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

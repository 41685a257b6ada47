// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon runtime configuration.

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;

use crate::env;

/// Invocation semantics applied to every request the daemon handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Re-execute duplicates. Fine for idempotent traffic, visible on
    /// mutations when a retry lands after a lost reply.
    #[value(name = "ALO", alias = "alo")]
    AtLeastOnce,
    /// Execute once per (client, request id); duplicates replay the
    /// remembered reply.
    #[value(name = "AMO", alias = "amo")]
    AtMostOnce,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::AtLeastOnce => "ALO",
            Mode::AtMostOnce => "AMO",
        };
        f.write_str(name)
    }
}

/// Everything the server needs to run, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub root: PathBuf,
    pub mode: Mode,
    /// Probability a reply is dropped instead of sent.
    pub response_loss: f64,
    /// Probability an update callback is dropped instead of sent.
    pub callback_loss: f64,
    pub max_inflight: usize,
    pub dedup_capacity: usize,
}

impl ServerConfig {
    pub fn new(port: u16, root: impl Into<PathBuf>, mode: Mode) -> Self {
        ServerConfig {
            port,
            root: root.into(),
            mode,
            response_loss: 0.0,
            callback_loss: 0.0,
            max_inflight: env::max_inflight(),
            dedup_capacity: env::dedup_capacity(),
        }
    }
}

/// Clap value parser for loss probabilities.
pub fn parse_probability(s: &str) -> Result<f64, String> {
    let p: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if !(0.0..=1.0).contains(&p) {
        return Err(format!("probability must be between 0 and 1, got {p}"));
    }
    Ok(p)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

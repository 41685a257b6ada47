// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The interactive prompt.
//!
//! Results go to stdout, complaints to stderr, so piped transcripts stay
//! clean. Data arguments run to the end of the line; interior runs of
//! whitespace are collapsed to single spaces.

use std::io;
use std::io::Write;

use rfs_core::Clock;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error::ClientError;
use crate::ops::{FileOps, Stub};

const HELP: &str = "\
Commands:
  read <path> <offset> <count>     read bytes from a file
  write <path> <offset> <data...>  insert data into a file at offset
  append <path> <data...>          append data to a file
  touch <path>                     create a file or refresh its timestamps
  ls [path]                        list a directory
  attr <path>                      show modification and access times
  register <path> <interval-ms>    watch a file for updates
  help                             show this help
  exit                             leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Read { path: String, offset: usize, count: usize },
    Write { path: String, offset: i32, data: String },
    Append { path: String, data: String },
    Touch { path: String },
    List { path: String },
    Attr { path: String },
    Register { path: String, interval_ms: i32 },
    Help,
    Exit,
}

impl Command {
    /// Parse one input line. Blank lines parse to `None`.
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&verb, args)) = tokens.split_first() else {
            return Ok(None);
        };
        let command = match verb {
            "read" => match args {
                [path, offset, count] => Command::Read {
                    path: (*path).to_string(),
                    offset: parse_number(offset, "offset")?,
                    count: parse_number(count, "count")?,
                },
                _ => return Err(usage("read <path> <offset> <count>")),
            },
            "write" => match args {
                [path, offset, data @ ..] if !data.is_empty() => Command::Write {
                    path: (*path).to_string(),
                    offset: parse_number(offset, "offset")?,
                    data: data.join(" "),
                },
                _ => return Err(usage("write <path> <offset> <data...>")),
            },
            "append" => match args {
                [path, data @ ..] if !data.is_empty() => {
                    Command::Append { path: (*path).to_string(), data: data.join(" ") }
                }
                _ => return Err(usage("append <path> <data...>")),
            },
            "touch" => match args {
                [path] => Command::Touch { path: (*path).to_string() },
                _ => return Err(usage("touch <path>")),
            },
            "ls" => match args {
                [] => Command::List { path: ".".to_string() },
                [path] => Command::List { path: (*path).to_string() },
                _ => return Err(usage("ls [path]")),
            },
            "attr" => match args {
                [path] => Command::Attr { path: (*path).to_string() },
                _ => return Err(usage("attr <path>")),
            },
            "register" => match args {
                [path, interval] => Command::Register {
                    path: (*path).to_string(),
                    interval_ms: parse_number(interval, "interval")?,
                },
                _ => return Err(usage("register <path> <interval-ms>")),
            },
            "help" => Command::Help,
            "exit" | "quit" => Command::Exit,
            other => return Err(format!("unknown command: {other} (try `help`)")),
        };
        Ok(Some(command))
    }
}

fn parse_number<T: std::str::FromStr>(token: &str, what: &str) -> Result<T, String> {
    token.parse().map_err(|_| format!("{what} must be a number, got `{token}`"))
}

fn usage(text: &str) -> String {
    format!("usage: {text}")
}

/// Read lines from stdin until exit or end of input.
pub async fn run<S: Stub, C: Clock>(ops: &FileOps<S, C>) -> io::Result<()> {
    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else { break };
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };
        if matches!(command, Command::Exit) {
            break;
        }
        if let Err(err) = execute(ops, command).await {
            eprintln!("error: {err}");
        }
    }
    Ok(())
}

fn prompt() -> io::Result<()> {
    print!("rfs> ");
    io::stdout().flush()
}

async fn execute<S: Stub, C: Clock>(
    ops: &FileOps<S, C>,
    command: Command,
) -> Result<(), ClientError> {
    match command {
        Command::Read { path, offset, count } => {
            let outcome = ops.read(&path, offset, count).await?;
            if outcome.truncated {
                eprintln!("note: read past end of file, result truncated");
            }
            println!("{}", String::from_utf8_lossy(&outcome.bytes));
        }
        Command::Write { path, offset, data } => {
            ops.write(&path, offset, data.as_bytes()).await?;
            println!("wrote {} bytes into {path}", data.len());
        }
        Command::Append { path, data } => {
            ops.append(&path, data.as_bytes()).await?;
            println!("appended {} bytes to {path}", data.len());
        }
        Command::Touch { path } => {
            let at = ops.touch(&path).await?;
            println!("touched {path} at {}", format_epoch_ms(at));
        }
        Command::List { path } => {
            for name in ops.list_dir(&path).await? {
                println!("{name}");
            }
        }
        Command::Attr { path } => {
            let (mtime_ms, atime_ms) = ops.attrs(&path).await?;
            println!("modified: {}", format_epoch_ms(mtime_ms));
            println!("accessed: {}", format_epoch_ms(atime_ms));
        }
        Command::Register { path, interval_ms } => {
            ops.register(&path, interval_ms).await?;
            println!("watching {path} for {interval_ms} ms");
        }
        Command::Help => println!("{HELP}"),
        Command::Exit => {}
    }
    Ok(())
}

fn format_epoch_ms(ms: i64) -> String {
    match chrono::DateTime::<chrono::Utc>::from_timestamp_millis(ms) {
        Some(at) => at.to_rfc3339(),
        None => format!("{ms} ms"),
    }
}

#[cfg(test)]
#[path = "repl_tests.rs"]
mod tests;

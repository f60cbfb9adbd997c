// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command surface (spec §4.7).
//!
//! The seven fixed, line-oriented commands (`deploy`, `start`, `stop`, `delete`,
//! `list containers`, `list nodes`, `quit`) don't need a full shell grammar, so
//! this is a minimal whitespace-tokenizing dispatcher. `deploy <path>` is the one
//! command that reaches outside the core: it reads and parses a configuration
//! record from disk (spec §1 keeps the declarative parser itself out of scope, so
//! this reads plain `serde_json`), then calls placement, then the container index.

use std::path::Path;

use corral_core::{Clock, ContainerConfig};
use thiserror::Error;

use crate::placement;
use crate::Coordinator;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("unknown command {0:?}")]
    UnknownCommand(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("failed to read config file {path:?}: {source}")]
    ConfigRead { path: String, source: std::io::Error },
    #[error("failed to parse config file {path:?}: {source}")]
    ConfigParse { path: String, source: serde_json::Error },
    #[error("no candidate worker for placement")]
    NoCandidate,
    #[error(transparent)]
    Index(#[from] corral_registry::IndexError),
}

/// Outcome of one command, rendered by the binary's REPL loop.
pub enum Outcome {
    Deployed(corral_core::ContainerId),
    Started,
    Stopped,
    Deleted,
    Containers(Vec<corral_core::ContainerRecord>),
    Nodes(Vec<corral_core::WorkerRecord>),
    Quit,
}

/// Parse and run one command line against shared coordinator state.
pub fn dispatch<C: Clock>(ctx: &Coordinator<C>, line: &str) -> Result<Outcome, ShellError> {
    let mut words = line.split_whitespace();
    match words.next() {
        Some("deploy") => {
            let path = words.next().ok_or(ShellError::Usage("deploy <path>"))?;
            deploy(ctx, path)
        }
        Some("start") => {
            let id = words.next().ok_or(ShellError::Usage("start <id>"))?;
            ctx.index.start(&ctx.registry, id)?;
            Ok(Outcome::Started)
        }
        Some("stop") => {
            let id = words.next().ok_or(ShellError::Usage("stop <id>"))?;
            ctx.index.stop(&ctx.registry, id)?;
            Ok(Outcome::Stopped)
        }
        Some("delete") => {
            let id = words.next().ok_or(ShellError::Usage("delete <id>"))?;
            ctx.index.delete(&ctx.registry, id)?;
            Ok(Outcome::Deleted)
        }
        Some("list") => match words.next() {
            Some("containers") => Ok(Outcome::Containers(ctx.index.list())),
            Some("nodes") => Ok(Outcome::Nodes(ctx.registry.snapshot())),
            _ => Err(ShellError::Usage("list containers | list nodes")),
        },
        Some("quit") => Ok(Outcome::Quit),
        Some(other) => Err(ShellError::UnknownCommand(other.to_string())),
        None => Err(ShellError::UnknownCommand(String::new())),
    }
}

fn deploy<C: Clock>(ctx: &Coordinator<C>, path: &str) -> Result<Outcome, ShellError> {
    let text = std::fs::read_to_string(Path::new(path))
        .map_err(|source| ShellError::ConfigRead { path: path.to_string(), source })?;
    let config: ContainerConfig = serde_json::from_str(&text)
        .map_err(|source| ShellError::ConfigParse { path: path.to_string(), source })?;

    let snapshot = ctx.registry.snapshot();
    let now_ms = ctx.now_ms();
    let worker_id =
        placement::select(&snapshot, now_ms, ctx.liveness_window_ms).ok_or(ShellError::NoCandidate)?;

    let id = ctx.index.deploy(&ctx.registry, worker_id, config, now_ms)?;
    Ok(Outcome::Deployed(id))
}

#[cfg(test)]
#[path = "shell_tests.rs"]
mod tests;

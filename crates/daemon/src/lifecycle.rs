// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shutdown wiring (spec §2 SUPPLEMENT, §6: "SIGINT and SIGTERM trigger graceful
//! shutdown of listening sockets and connection close").
//!
//! Cancellation here is cooperative: a flag the acceptor loop checks between
//! `accept()` calls, paired with dropping the listener itself to unblock any task
//! still waiting on it. `corral-daemon` has no WAL or snapshot to flush on the way
//! out — shutdown is just "stop accepting, let in-flight sessions drain."

use tokio_util::sync::CancellationToken;
use tracing::info;

/// A clonable shutdown flag shared by the acceptor loop and the command surface.
#[derive(Clone, Default)]
pub struct ShutdownHandle {
    token: CancellationToken,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self { token: CancellationToken::new() }
    }

    /// True once shutdown has been requested.
    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Request shutdown; idempotent.
    pub fn request(&self) {
        self.token.cancel();
    }

    /// Resolve once shutdown has been requested, for use in a `tokio::select!`
    /// alongside `TcpListener::accept` in the acceptor loop.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }
}

/// Spawn a task that requests shutdown on SIGINT or SIGTERM (spec §6).
#[cfg(unix)]
pub fn install_signal_handlers(shutdown: ShutdownHandle) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let mut sigint = match signal(SignalKind::interrupt()) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGINT handler");
                return;
            }
        };
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                return;
            }
        };

        tokio::select! {
            _ = sigint.recv() => info!("received SIGINT; shutting down"),
            _ = sigterm.recv() => info!("received SIGTERM; shutting down"),
        }
        shutdown.request();
    });
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;

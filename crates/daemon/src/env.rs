// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the coordinator (spec §6
//! "[AMBIENT] Process entry points").

use std::time::Duration;

/// This coordinator's own sender id on the wire (spec §4.1's `sender_id` field, for
/// messages the coordinator itself originates rather than relays).
pub const COORDINATOR_ID: &str = "coordinator";

/// `CORRAL_LISTEN_ADDR`, default `0.0.0.0:8888` (spec §6 CLI default port).
pub fn listen_addr() -> String {
    std::env::var("CORRAL_LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8888".to_string())
}

/// `CORRAL_LIVENESS_WINDOW_MS`, default 30,000 (spec §3 invariant 4, §4.4).
pub fn liveness_window() -> Duration {
    std::env::var("CORRAL_LIVENESS_WINDOW_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(30))
}

/// `CORRAL_HEARTBEAT_MS`, default 10,000 (spec §4.6; advertised to workers, not
/// enforced by the coordinator itself).
pub fn heartbeat_period() -> Duration {
    std::env::var("CORRAL_HEARTBEAT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(10))
}

/// `CORRAL_WORKER_CAPACITY`, default 256 (spec §4.2).
pub fn worker_capacity() -> usize {
    std::env::var("CORRAL_WORKER_CAPACITY").ok().and_then(|s| s.parse().ok()).unwrap_or(256)
}

/// `CORRAL_CONTAINER_CAPACITY`, default 1024 (spec §7).
pub fn container_capacity() -> usize {
    std::env::var("CORRAL_CONTAINER_CAPACITY").ok().and_then(|s| s.parse().ok()).unwrap_or(1024)
}

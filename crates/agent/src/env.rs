// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the worker agent; see
//! `corral_daemon::env` for the coordinator side.

use std::time::Duration;

/// The coordinator's well-known id on the wire (spec §4.1's `sender_id`/
/// `recipient_id` fields address the coordinator by this fixed string; matches
/// `corral_daemon::env::COORDINATOR_ID`).
pub const COORDINATOR_ID: &str = "coordinator";

/// `CORRAL_HEARTBEAT_MS`, default 10,000 (spec §4.6).
pub fn heartbeat_period() -> Duration {
    std::env::var("CORRAL_HEARTBEAT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(10))
}

/// `CORRAL_WORKER_MAX_CONTAINERS`, default 32 — advertised to the coordinator as
/// this worker's `ResourceSample::capacity` (spec §3).
pub fn max_containers() -> u32 {
    std::env::var("CORRAL_WORKER_MAX_CONTAINERS").ok().and_then(|s| s.parse().ok()).unwrap_or(32)
}

/// `CORRAL_WORKER_ADVERTISE_PORT`, default 0 — the port field of this worker's
/// REGISTER payload (spec §4.1: `"<hostname> <ip> <port>"`). This agent has no
/// listener of its own (all traffic rides the one outbound connection it opens
/// to the coordinator), so the default is purely informational.
pub fn advertise_port() -> u16 {
    std::env::var("CORRAL_WORKER_ADVERTISE_PORT").ok().and_then(|s| s.parse().ok()).unwrap_or(0)
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container identity, configuration, and the coordinator's authoritative record.

use crate::worker::WorkerId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

crate::define_string_id! {
    /// Globally unique id, `<workerId>_<name>` (spec §3).
    pub struct ContainerId;
}

impl ContainerId {
    /// Build the canonical id for a container on a worker.
    pub fn derive(worker_id: &WorkerId, name: &str) -> Self {
        Self::new(format!("{}_{}", worker_id.as_str(), name))
    }
}

/// Lifecycle state of a container, as tracked by the coordinator (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerState {
    Stopped,
    Starting,
    Running,
    Stopping,
    Error,
}

crate::simple_display! {
    ContainerState {
        Stopped => "stopped",
        Starting => "starting",
        Running => "running",
        Stopping => "stopping",
        Error => "error",
    }
}

/// The configuration a deploy intent carries (spec §3, §6).
///
/// `environment`/`mounts`/`network` are carried opaquely: the declarative config parser
/// that produces them is out of scope (spec §1), including its documented quirk of
/// returning an empty value for nested mappings (spec §9) — this type does not validate
/// or reject an empty value for any of these fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerConfig {
    pub name: String,
    pub image: String,
    pub cpu_limit: u32,
    pub memory_limit_mb: u32,
    pub privileged: bool,
    #[serde(default)]
    pub environment: HashMap<String, String>,
    #[serde(default)]
    pub mounts: Vec<String>,
    #[serde(default)]
    pub network: String,
}

/// The coordinator's authoritative record for one container (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerRecord {
    pub id: ContainerId,
    pub name: String,
    pub owner: WorkerId,
    pub state: ContainerState,
    pub config: ContainerConfig,
    pub created_at_ms: u64,
    pub started_at_ms: Option<u64>,
}

impl ContainerRecord {
    pub fn new(owner: WorkerId, config: ContainerConfig, now_ms: u64) -> Self {
        let id = ContainerId::derive(&owner, &config.name);
        Self {
            id,
            name: config.name.clone(),
            owner,
            state: ContainerState::Starting,
            config,
            created_at_ms: now_ms,
            started_at_ms: None,
        }
    }
}

#[cfg(test)]
#[path = "container_tests.rs"]
mod tests;

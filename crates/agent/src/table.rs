// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker's local container table (spec §4.6): this worker's own view of the
//! containers it hosts, keyed by name. Distinct from (and not synchronized with)
//! the coordinator's container index — the two are reconciled only via
//! CONTAINER_STATUS reports and intent commands over the wire (spec §4.3, §4.5).

use std::collections::HashMap;

use corral_core::{ContainerId, ContainerRecord, ContainerState, WorkerId};
use parking_lot::Mutex;

pub struct ContainerTable {
    owner: WorkerId,
    inner: Mutex<HashMap<String, ContainerRecord>>,
}

impl ContainerTable {
    pub fn new(owner: WorkerId) -> Self {
        Self { owner, inner: Mutex::new(HashMap::new()) }
    }

    /// Insert a freshly created container in `Stopped` state (spec §4.6: DEPLOY
    /// success "append to local container table (state Stopped)").
    pub fn insert_stopped(&self, config: corral_core::ContainerConfig, now_ms: u64) -> ContainerRecord {
        let mut record = ContainerRecord::new(self.owner.clone(), config, now_ms);
        record.state = ContainerState::Stopped;
        self.inner.lock().insert(record.name.clone(), record.clone());
        record
    }

    pub fn get(&self, name: &str) -> Option<ContainerRecord> {
        self.inner.lock().get(name).cloned()
    }

    pub fn remove(&self, name: &str) -> Option<ContainerRecord> {
        self.inner.lock().remove(name)
    }

    /// Update a container's state in place, returning the updated record.
    pub fn set_state(&self, name: &str, state: ContainerState) -> Option<ContainerRecord> {
        let mut inner = self.inner.lock();
        let record = inner.get_mut(name)?;
        record.state = state;
        Some(record.clone())
    }

    /// Like [`Self::set_state`] but also stamps `started_at_ms` (spec §4.6: START
    /// success "set Running and started-at=now").
    pub fn mark_started(&self, name: &str, now_ms: u64) -> Option<ContainerRecord> {
        let mut inner = self.inner.lock();
        let record = inner.get_mut(name)?;
        record.state = ContainerState::Running;
        record.started_at_ms = Some(now_ms);
        Some(record.clone())
    }

    pub fn len(&self) -> u32 {
        self.inner.lock().len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn list(&self) -> Vec<ContainerRecord> {
        self.inner.lock().values().cloned().collect()
    }

    pub fn id_for(&self, name: &str) -> ContainerId {
        ContainerId::derive(&self.owner, name)
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Container index: the coordinator's authoritative directory of deployed
//! containers (spec §4.5).
//!
//! Each method that must emit a wire message first resolves the owning worker's
//! connection handle through the registry *without* holding the index's lock, then
//! reacquires the index lock to perform the send and the local state transition
//! together. This keeps the registry and index locks from ever being held at once
//! (spec §5) while still serializing each container's lifecycle transitions against
//! concurrent callers (spec §4.5: "this serializes lifecycle transitions per
//! container and prevents racing deletes").

use std::collections::HashMap;

use corral_core::{ContainerConfig, ContainerId, ContainerRecord, ContainerState, WorkerId};
use corral_wire::{Envelope, Tag};
use parking_lot::Mutex;
use tracing::warn;

use crate::error::IndexError;
use crate::worker_registry::WorkerRegistry;

struct Inner {
    containers: HashMap<ContainerId, ContainerRecord>,
}

/// The coordinator's authoritative container directory, independently locked from
/// the worker registry (spec §4.5, §5).
pub struct ContainerIndex {
    inner: Mutex<Inner>,
    capacity: usize,
    sender_id: String,
}

impl ContainerIndex {
    /// `capacity` is the maximum number of container records (spec §4.5/§7: 1024).
    /// `sender_id` is the coordinator's own id, stamped as `sender_id` on every
    /// envelope the index emits.
    pub fn new(capacity: usize, sender_id: impl Into<String>) -> Self {
        Self { inner: Mutex::new(Inner { containers: HashMap::new() }), capacity, sender_id: sender_id.into() }
    }

    /// Deploy a new container onto `worker_id` (spec §4.5).
    ///
    /// On send failure the index is left untouched and `Unreachable` is returned;
    /// on success the record is inserted with `Starting` state and a mirror entry
    /// is appended to the worker's local view in the registry.
    pub fn deploy(
        &self,
        registry: &WorkerRegistry,
        worker_id: WorkerId,
        config: ContainerConfig,
        now_ms: u64,
    ) -> Result<ContainerId, IndexError> {
        let connection = registry.find_connection(worker_id.as_str()).ok_or(IndexError::Unreachable)?;
        let record = ContainerRecord::new(worker_id.clone(), config.clone(), now_ms);
        let envelope = Envelope::deploy(&self.sender_id, worker_id.as_str(), &config)
            .map_err(|_| IndexError::Unreachable)?;

        {
            let mut inner = self.inner.lock();
            if inner.containers.len() >= self.capacity {
                return Err(IndexError::Capacity);
            }
            if connection.send(envelope).is_err() {
                return Err(IndexError::Unreachable);
            }
            inner.containers.insert(record.id.clone(), record.clone());
        }

        registry.add_container(worker_id.as_str(), record.id.as_str());
        Ok(record.id)
    }

    /// Transition a container through a START/STOP/DELETE command (spec §4.5).
    fn transition(
        &self,
        registry: &WorkerRegistry,
        container_id: &str,
        tag: Tag,
        next_state: Option<ContainerState>,
    ) -> Result<(), IndexError> {
        let (owner, name) = {
            let inner = self.inner.lock();
            let record = inner.containers.get(container_id).ok_or(IndexError::Unknown)?;
            (record.owner.clone(), record.name.clone())
        };
        let connection = registry.find_connection(owner.as_str()).ok_or(IndexError::Unreachable)?;
        let envelope = Envelope::name_command(tag, &self.sender_id, owner.as_str(), &name);

        let mut inner = self.inner.lock();
        let record = inner.containers.get_mut(container_id).ok_or(IndexError::Unknown)?;
        if connection.send(envelope).is_err() {
            return Err(IndexError::Unreachable);
        }
        if let Some(state) = next_state {
            record.state = state;
        }
        Ok(())
    }

    /// `start`: local intent transitions to `Starting` ahead of the worker's ACK;
    /// the subsequent CONTAINER_STATUS report is the reconciling truth (spec §4.5).
    pub fn start(&self, registry: &WorkerRegistry, container_id: &str) -> Result<(), IndexError> {
        self.transition(registry, container_id, Tag::Start, Some(ContainerState::Starting))
    }

    /// `stop`: local intent transitions to `Stopping` (spec §4.5).
    pub fn stop(&self, registry: &WorkerRegistry, container_id: &str) -> Result<(), IndexError> {
        self.transition(registry, container_id, Tag::Stop, Some(ContainerState::Stopping))
    }

    /// `delete`: removes the index entry even when the worker cannot be reached —
    /// best-effort, on the premise the worker reconciles on reconnect (spec §4.5,
    /// §9 Open Questions; this repo does not implement that reconnect-time
    /// reconciliation — see DESIGN.md).
    pub fn delete(&self, registry: &WorkerRegistry, container_id: &str) -> Result<(), IndexError> {
        let (owner, name) = {
            let inner = self.inner.lock();
            let record = inner.containers.get(container_id).ok_or(IndexError::Unknown)?;
            (record.owner.clone(), record.name.clone())
        };

        let connection = registry.find_connection(owner.as_str());

        // Send and remove under one index-lock acquisition (spec §5: "send messages
        // *while holding* the index lock ... serializes lifecycle transitions per
        // container and prevents racing deletes"). A concurrent `delete` for the
        // same id serializes on this lock and finds the entry already gone.
        let mut inner = self.inner.lock();
        if inner.containers.get(container_id).is_none() {
            return Err(IndexError::Unknown);
        }
        match connection {
            Some(connection) => {
                let envelope = Envelope::name_command(Tag::Delete, &self.sender_id, owner.as_str(), &name);
                if connection.send(envelope).is_err() {
                    warn!(container_id, %owner, "DELETE send failed; removing index entry anyway");
                }
            }
            None => {
                warn!(container_id, %owner, "worker unreachable for DELETE; removing index entry anyway");
            }
        }
        inner.containers.remove(container_id);
        drop(inner);

        registry.remove_container(owner.as_str(), container_id);
        Ok(())
    }

    /// Overwrite the index entry named by `record.id` with a worker's reported
    /// state (spec §4.3, §8: "a CONTAINER_STATUS message ... overwrites the
    /// container index state for that id").
    pub fn report_status(&self, record: ContainerRecord) {
        self.inner.lock().containers.insert(record.id.clone(), record);
    }

    /// Current state for a container id, or `None` for an unknown id (spec §4.5,
    /// §8: `status(id) = Error` maps to "unknown" here; callers render that kind).
    pub fn status(&self, container_id: &str) -> Option<ContainerState> {
        self.inner.lock().containers.get(container_id).map(|r| r.state)
    }

    pub fn get(&self, container_id: &str) -> Option<ContainerRecord> {
        self.inner.lock().containers.get(container_id).cloned()
    }

    pub fn list(&self) -> Vec<ContainerRecord> {
        self.inner.lock().containers.values().cloned().collect()
    }
}

#[cfg(test)]
#[path = "container_index_tests.rs"]
mod tests;

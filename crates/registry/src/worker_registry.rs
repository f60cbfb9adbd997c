// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker registry: the process-wide directory of known workers (spec §4.2).

use std::collections::HashMap;

use corral_core::{WorkerId, WorkerRecord, WorkerState};
use corral_wire::Envelope;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::error::RegistryError;

/// Send side of a worker's connection; the session handler's writer task owns the
/// receiving end and serializes writes onto the socket (spec §5: "per-worker
/// connection write — serialized by the session handler").
pub type ConnectionHandle = mpsc::UnboundedSender<Envelope>;

struct Entry {
    record: WorkerRecord,
    connection: Option<ConnectionHandle>,
}

struct Inner {
    workers: HashMap<WorkerId, Entry>,
}

/// The coordinator's directory of known workers and their last observed state.
///
/// All methods are serialized under one `parking_lot::Mutex`; `snapshot` returns a
/// by-value copy so placement decisions never interleave with a registry mutation
/// (spec §3 invariant 6, §5).
pub struct WorkerRegistry {
    inner: Mutex<Inner>,
    capacity: usize,
}

impl WorkerRegistry {
    /// `capacity` is the maximum number of distinct worker ids (spec §4.2: 256).
    pub fn new(capacity: usize) -> Self {
        Self { inner: Mutex::new(Inner { workers: HashMap::new() }), capacity }
    }

    /// Create or update a worker record. Re-registration with an existing id
    /// updates the record in place rather than duplicating it (spec §3 invariant 1).
    #[allow(clippy::too_many_arguments)]
    pub fn upsert(
        &self,
        id: WorkerId,
        hostname: String,
        ip: String,
        port: u16,
        connection: Option<ConnectionHandle>,
        now_ms: u64,
    ) -> Result<(), RegistryError> {
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.workers.get_mut(&id) {
            entry.record.hostname = hostname;
            entry.record.ip = ip;
            entry.record.port = port;
            entry.record.state = WorkerState::Connected;
            entry.record.last_heartbeat_ms = now_ms;
            if connection.is_some() {
                entry.connection = connection;
            }
            return Ok(());
        }

        if inner.workers.len() >= self.capacity {
            return Err(RegistryError::Capacity);
        }

        let record = WorkerRecord::new(id.clone(), hostname, ip, port, now_ms);
        inner.workers.insert(id, Entry { record, connection });
        Ok(())
    }

    /// Attach (or replace) the connection handle for an already-registered worker.
    pub fn bind_connection(&self, id: &str, connection: ConnectionHandle) -> Result<(), RegistryError> {
        let mut inner = self.inner.lock();
        let entry = inner.workers.get_mut(id).ok_or(RegistryError::Unknown)?;
        entry.connection = Some(connection);
        Ok(())
    }

    pub fn find(&self, id: &str) -> Option<WorkerRecord> {
        self.inner.lock().workers.get(id).map(|e| e.record.clone())
    }

    /// Clone out the send handle for a worker's connection, without holding the
    /// registry lock any longer than the clone itself.
    pub fn find_connection(&self, id: &str) -> Option<ConnectionHandle> {
        self.inner.lock().workers.get(id).and_then(|e| e.connection.clone())
    }

    pub fn remove(&self, id: &str) {
        self.inner.lock().workers.remove(id);
    }

    /// A consistent by-value copy of every worker record, suitable for placement
    /// decisions taken outside the registry's lock (spec §3 invariant 6).
    pub fn snapshot(&self) -> Vec<WorkerRecord> {
        self.inner.lock().workers.values().map(|e| e.record.clone()).collect()
    }

    /// Record a heartbeat: marks the worker live, updates its resource sample, and
    /// resets `last_heartbeat_ms` (spec §4.2).
    pub fn touch(
        &self,
        id: &str,
        sample: corral_core::ResourceSample,
        now_ms: u64,
    ) -> Result<(), RegistryError> {
        let mut inner = self.inner.lock();
        let entry = inner.workers.get_mut(id).ok_or(RegistryError::Unknown)?;
        entry.record.state = WorkerState::Connected;
        entry.record.sample = sample;
        entry.record.last_heartbeat_ms = now_ms;
        Ok(())
    }

    /// Move a worker to `Disconnected` and drop its connection handle; the record
    /// itself is retained for inspection (spec §3, §4.2).
    pub fn close_connection(&self, id: &str) {
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.workers.get_mut(id) {
            entry.record.state = WorkerState::Disconnected;
            entry.connection = None;
        }
    }

    /// Append a container id to a worker's local view (spec §4.5: "mirror entry").
    pub fn add_container(&self, worker_id: &str, container_id: &str) {
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.workers.get_mut(worker_id) {
            if !entry.record.containers.iter().any(|c| c == container_id) {
                entry.record.containers.push(container_id.to_string());
            }
        }
    }

    /// Remove a container id from a worker's local view (spec §4.5: delete).
    pub fn remove_container(&self, worker_id: &str, container_id: &str) {
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.workers.get_mut(worker_id) {
            entry.record.containers.retain(|c| c != container_id);
        }
    }
}

#[cfg(test)]
#[path = "worker_registry_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The local container runtime driver (spec §1, §4.6, §6).
//!
//! The driver itself — invoking the host container runtime and sampling host
//! metrics — is an out-of-scope collaborator; the core only consumes it through
//! this trait (spec §1: "described only by the interfaces the core consumes"),
//! bounded `Clone + Send + Sync + 'static` so a real implementation and a fake
//! one can share the same call sites.

use async_trait::async_trait;
use corral_core::ContainerConfig;
use thiserror::Error;

/// A host resource sample as the driver observes it (spec §1: "sample host
/// resource metrics"). Container count and capacity are bookkeeping the agent
/// itself tracks, not the driver (spec §3's `ResourceSample` combines both).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HostSample {
    pub cpu_pct: f64,
    pub mem_pct: f64,
    pub disk_pct: f64,
}

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("runtime failure: {0}")]
    RuntimeFailure(String),
}

/// The interface the worker agent consumes to create/start/stop/destroy
/// containers and to sample host resource metrics (spec §4.6).
#[async_trait]
pub trait ContainerDriver: Clone + Send + Sync + 'static {
    async fn create(&self, config: &ContainerConfig) -> Result<(), DriverError>;
    async fn start(&self, name: &str) -> Result<(), DriverError>;
    async fn stop(&self, name: &str) -> Result<(), DriverError>;
    async fn destroy(&self, name: &str) -> Result<(), DriverError>;
    async fn sample(&self) -> HostSample;
    /// The maximum number of containers this worker will host (spec §3's
    /// `ResourceSample::capacity`, advertised to the coordinator in HEARTBEAT).
    fn capacity(&self) -> u32;
}

/// An in-memory stand-in for the real host runtime (spec §4.6 SUPPLEMENT). No
/// cgroups, namespaces, or image pulls are modeled — only the trait's call shape
/// and a recorded call log, state held behind a `parking_lot::Mutex`.
#[derive(Clone)]
pub struct SimulatedDriver {
    inner: std::sync::Arc<parking_lot::Mutex<SimState>>,
    capacity: u32,
}

struct SimState {
    containers: std::collections::HashSet<String>,
    calls: Vec<DriverCall>,
    fail_create: bool,
}

/// One recorded driver invocation, for test assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    Create(String),
    Start(String),
    Stop(String),
    Destroy(String),
}

impl SimulatedDriver {
    pub fn new(capacity: u32) -> Self {
        Self {
            inner: std::sync::Arc::new(parking_lot::Mutex::new(SimState {
                containers: std::collections::HashSet::new(),
                calls: Vec::new(),
                fail_create: false,
            })),
            capacity,
        }
    }

    /// Every recorded call, in order, for test assertions.
    pub fn calls(&self) -> Vec<DriverCall> {
        self.inner.lock().calls.clone()
    }

    /// Make the next `create` call fail, to exercise `RuntimeFailure` handling.
    pub fn fail_next_create(&self) {
        self.inner.lock().fail_create = true;
    }

    fn container_count(&self) -> u32 {
        self.inner.lock().containers.len() as u32
    }
}

#[async_trait]
impl ContainerDriver for SimulatedDriver {
    async fn create(&self, config: &ContainerConfig) -> Result<(), DriverError> {
        let mut inner = self.inner.lock();
        inner.calls.push(DriverCall::Create(config.name.clone()));
        if inner.fail_create {
            inner.fail_create = false;
            return Err(DriverError::RuntimeFailure(format!("simulated create failure for {}", config.name)));
        }
        inner.containers.insert(config.name.clone());
        Ok(())
    }

    async fn start(&self, name: &str) -> Result<(), DriverError> {
        let mut inner = self.inner.lock();
        inner.calls.push(DriverCall::Start(name.to_string()));
        if !inner.containers.contains(name) {
            return Err(DriverError::RuntimeFailure(format!("no such container {name}")));
        }
        Ok(())
    }

    async fn stop(&self, name: &str) -> Result<(), DriverError> {
        let mut inner = self.inner.lock();
        inner.calls.push(DriverCall::Stop(name.to_string()));
        if !inner.containers.contains(name) {
            return Err(DriverError::RuntimeFailure(format!("no such container {name}")));
        }
        Ok(())
    }

    async fn destroy(&self, name: &str) -> Result<(), DriverError> {
        let mut inner = self.inner.lock();
        inner.calls.push(DriverCall::Destroy(name.to_string()));
        inner.containers.remove(name);
        Ok(())
    }

    async fn sample(&self) -> HostSample {
        // Utilization drifts with how packed this worker is, loosely modeling a
        // real host: an idle worker reports near-zero, a full one reports high.
        let load = f64::from(self.container_count()) / f64::from(self.capacity.max(1));
        HostSample { cpu_pct: (load * 80.0).min(100.0), mem_pct: (load * 60.0).min(100.0), disk_pct: 10.0 }
    }

    fn capacity(&self) -> u32 {
        self.capacity
    }
}

#[cfg(test)]
#[path = "driver_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! corral-registry: the coordinator's worker registry and container index
//! (spec §4.2, §4.5).
//!
//! Both structures are guarded by their own `parking_lot::Mutex`, independently of
//! each other (spec §5: "acquiring both locks is forbidden"). Callers that need
//! both — chiefly the container index, which must look up a worker's connection
//! handle to emit a command — acquire the registry's lock, clone what they need out
//! of it, release it, and only then acquire the index's lock.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod container_index;
mod error;
mod worker_registry;

pub use container_index::ContainerIndex;
pub use error::{IndexError, RegistryError};
pub use worker_registry::{ConnectionHandle, WorkerRegistry};

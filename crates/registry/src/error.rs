// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error kinds for the registry and container index (spec §7).

use corral_core::CoreError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Registry is at the 256-worker capacity (spec §3, §8 Boundaries).
    #[error("worker registry is full")]
    Capacity,
    /// No worker record exists for the given id.
    #[error("unknown worker id")]
    Unknown,
}

impl From<RegistryError> for CoreError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::Capacity => CoreError::Capacity,
            RegistryError::Unknown => CoreError::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IndexError {
    /// Container index is at the 1024-entry capacity.
    #[error("container index is full")]
    Capacity,
    /// No container record exists for the given id.
    #[error("unknown container id")]
    Unknown,
    /// The owning worker has no live connection to send the command over.
    #[error("owning worker is unreachable")]
    Unreachable,
}

impl From<IndexError> for CoreError {
    fn from(e: IndexError) -> Self {
        match e {
            IndexError::Capacity => CoreError::Capacity,
            IndexError::Unknown => CoreError::Unknown,
            IndexError::Unreachable => CoreError::Transport,
        }
    }
}

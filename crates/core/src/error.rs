// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The error taxonomy shared by every crate in the control plane (spec §7).
//!
//! This is a taxonomy of *kinds*, not a single catch-all type: each crate defines its
//! own `thiserror` error enum at its boundary and converts into or out of [`CoreError`]
//! where a caller needs the kind without the crate-specific detail.

use thiserror::Error;

/// A control-plane error kind, independent of which crate raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Short read/write, framing mismatch, or peer closed (spec §7).
    #[error("transport error")]
    Transport,
    /// Placement found no eligible worker (spec §7).
    #[error("no candidate worker for placement")]
    NoCandidate,
    /// Referenced container id or worker id does not exist (spec §7).
    #[error("unknown id")]
    Unknown,
    /// Registry or container index is full (spec §7).
    #[error("capacity exceeded")]
    Capacity,
    /// The local driver failed to create/start/stop/destroy a container (spec §7).
    #[error("runtime failure")]
    RuntimeFailure,
    /// A REGISTER payload or configuration record could not be parsed (spec §7).
    #[error("malformed payload")]
    Malformed,
}

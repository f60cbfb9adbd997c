// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message framing for the coordinator<->worker control plane (spec §4.1).
//!
//! Wire format: one fixed 8,192-byte binary record per message. Short reads and
//! short writes are fatal to the connection — there is no resynchronization.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod envelope;
mod error;
mod payload;
mod tag;

pub use envelope::{read_message, write_message, Envelope, DATA_SIZE, ENVELOPE_SIZE};
pub use error::ProtocolError;
pub use tag::Tag;

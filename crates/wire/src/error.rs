// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Framing and payload errors (spec §7: `Transport`, `Malformed`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The peer closed the connection before a full envelope arrived.
    #[error("connection closed")]
    ConnectionClosed,

    /// A read or write returned fewer bytes than the fixed envelope size.
    #[error("short read/write: framing mismatch")]
    Truncated,

    /// The envelope's declared `data_length` exceeds the payload region.
    #[error("declared payload length {0} exceeds the {1}-byte payload region")]
    PayloadTooLarge(u32, usize),

    /// A header or payload field could not be parsed.
    #[error("malformed message: {0}")]
    Malformed(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

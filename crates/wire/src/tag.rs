// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The closed set of message tags (spec §4.1).

use crate::error::ProtocolError;

/// Tag of a message envelope; fixes the interpretation of the envelope's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Tag {
    Register = 0,
    Heartbeat = 1,
    Deploy = 2,
    Start = 3,
    Stop = 4,
    Delete = 5,
    ContainerStatus = 6,
    NodeStatus = 7,
    Error = 8,
    Ack = 9,
}

impl Tag {
    pub fn from_u32(value: u32) -> Result<Self, ProtocolError> {
        match value {
            0 => Ok(Tag::Register),
            1 => Ok(Tag::Heartbeat),
            2 => Ok(Tag::Deploy),
            3 => Ok(Tag::Start),
            4 => Ok(Tag::Stop),
            5 => Ok(Tag::Delete),
            6 => Ok(Tag::ContainerStatus),
            7 => Ok(Tag::NodeStatus),
            8 => Ok(Tag::Error),
            9 => Ok(Tag::Ack),
            other => Err(ProtocolError::Malformed(format!("unknown tag {other}"))),
        }
    }
}

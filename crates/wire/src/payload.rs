// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tag-specific payload encoding (spec §4.1 table).
//!
//! REGISTER and the name-carrying tags (START/STOP/DELETE/ACK/ERROR) are raw
//! (ASCII/UTF-8) byte strings; everything else is a `serde_json` record inside the
//! envelope's `data` region.

use corral_core::{ContainerConfig, ContainerRecord, ResourceSample};

use crate::envelope::Envelope;
use crate::error::ProtocolError;
use crate::tag::Tag;

impl Envelope {
    /// `REGISTER "<hostname> <ip> <port>"` (spec §4.1).
    pub fn register(sender_id: &str, recipient_id: &str, hostname: &str, ip: &str, port: u16) -> Self {
        let data = format!("{hostname} {ip} {port}").into_bytes();
        Envelope::new(Tag::Register, sender_id, recipient_id, data)
    }

    /// Parse a REGISTER payload into `(hostname, ip, port)`.
    pub fn parse_register(&self) -> Result<(String, String, u16), ProtocolError> {
        let text = std::str::from_utf8(&self.data)
            .map_err(|e| ProtocolError::Malformed(format!("REGISTER payload is not UTF-8: {e}")))?;
        let mut parts = text.split_whitespace();
        let hostname = parts.next().ok_or_else(|| ProtocolError::Malformed("missing hostname".into()))?;
        let ip = parts.next().ok_or_else(|| ProtocolError::Malformed("missing ip".into()))?;
        let port = parts
            .next()
            .ok_or_else(|| ProtocolError::Malformed("missing port".into()))?
            .parse::<u16>()
            .map_err(|e| ProtocolError::Malformed(format!("bad port: {e}")))?;
        Ok((hostname.to_string(), ip.to_string(), port))
    }

    /// `HEARTBEAT` carrying a resource sample record.
    pub fn heartbeat(sender_id: &str, recipient_id: &str, sample: &ResourceSample) -> Result<Self, ProtocolError> {
        let data = serde_json::to_vec(sample)
            .map_err(|e| ProtocolError::Malformed(format!("failed to encode resource sample: {e}")))?;
        Ok(Envelope::new(Tag::Heartbeat, sender_id, recipient_id, data))
    }

    pub fn parse_heartbeat(&self) -> Result<ResourceSample, ProtocolError> {
        serde_json::from_slice(&self.data)
            .map_err(|e| ProtocolError::Malformed(format!("bad resource sample: {e}")))
    }

    /// `DEPLOY` carrying a container configuration record.
    pub fn deploy(sender_id: &str, recipient_id: &str, config: &ContainerConfig) -> Result<Self, ProtocolError> {
        let data = serde_json::to_vec(config)
            .map_err(|e| ProtocolError::Malformed(format!("failed to encode container config: {e}")))?;
        Ok(Envelope::new(Tag::Deploy, sender_id, recipient_id, data))
    }

    pub fn parse_deploy(&self) -> Result<ContainerConfig, ProtocolError> {
        serde_json::from_slice(&self.data)
            .map_err(|e| ProtocolError::Malformed(format!("bad container config: {e}")))
    }

    /// `START`/`STOP`/`DELETE` carrying an unterminated container name.
    pub fn name_command(tag: Tag, sender_id: &str, recipient_id: &str, name: &str) -> Self {
        debug_assert!(matches!(tag, Tag::Start | Tag::Stop | Tag::Delete));
        Envelope::new(tag, sender_id, recipient_id, name.as_bytes().to_vec())
    }

    pub fn parse_name(&self) -> Result<String, ProtocolError> {
        String::from_utf8(self.data.clone())
            .map_err(|e| ProtocolError::Malformed(format!("name payload is not UTF-8: {e}")))
    }

    /// `CONTAINER_STATUS` carrying the worker's view of one container record.
    pub fn container_status(sender_id: &str, recipient_id: &str, record: &ContainerRecord) -> Result<Self, ProtocolError> {
        let data = serde_json::to_vec(record)
            .map_err(|e| ProtocolError::Malformed(format!("failed to encode container record: {e}")))?;
        Ok(Envelope::new(Tag::ContainerStatus, sender_id, recipient_id, data))
    }

    pub fn parse_container_status(&self) -> Result<ContainerRecord, ProtocolError> {
        serde_json::from_slice(&self.data)
            .map_err(|e| ProtocolError::Malformed(format!("bad container record: {e}")))
    }

    /// `ACK`/`ERROR` carrying a short UTF-8 message.
    pub fn text(tag: Tag, sender_id: &str, recipient_id: &str, message: &str) -> Self {
        debug_assert!(matches!(tag, Tag::Ack | Tag::Error));
        Envelope::new(tag, sender_id, recipient_id, message.as_bytes().to_vec())
    }

    pub fn parse_text(&self) -> Result<String, ProtocolError> {
        String::from_utf8(self.data.clone())
            .map_err(|e| ProtocolError::Malformed(format!("text payload is not UTF-8: {e}")))
    }
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;

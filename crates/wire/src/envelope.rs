// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The fixed 8,192-byte wire record (spec §4.1, §6).
//!
//! Layout: `tag` (4 bytes) + `sender_id` (256 bytes, NUL-terminated) +
//! `recipient_id` (256 bytes, NUL-terminated) + `data_length` (4 bytes) + `data`
//! (remainder). One record is one message; a short read or short write is fatal to
//! the connection (spec §4.1, §7 `Transport`).

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::ProtocolError;
use crate::tag::Tag;

const ID_FIELD_SIZE: usize = 256;
const TAG_FIELD_SIZE: usize = 4;
const LENGTH_FIELD_SIZE: usize = 4;
const HEADER_SIZE: usize = TAG_FIELD_SIZE + 2 * ID_FIELD_SIZE + LENGTH_FIELD_SIZE;

/// Total on-wire size of one envelope (spec §6: "exactly 8,192 bytes").
pub const ENVELOPE_SIZE: usize = 8192;

/// Usable payload size after the fixed header (spec §4.1: "~7 KiB after headers").
pub const DATA_SIZE: usize = ENVELOPE_SIZE - HEADER_SIZE;

/// One self-describing request/response record (spec §4.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub tag: Tag,
    pub sender_id: String,
    pub recipient_id: String,
    pub data: Vec<u8>,
}

impl Envelope {
    /// Build an envelope, silently truncating `data` to [`DATA_SIZE`] (spec §4.1:
    /// "payload truncation on send is silent to the byte limit").
    pub fn new(tag: Tag, sender_id: impl Into<String>, recipient_id: impl Into<String>, mut data: Vec<u8>) -> Self {
        data.truncate(DATA_SIZE);
        Self { tag, sender_id: sender_id.into(), recipient_id: recipient_id.into(), data }
    }

    /// Encode into the fixed-size on-wire representation.
    pub fn encode(&self) -> Result<[u8; ENVELOPE_SIZE], ProtocolError> {
        let mut buf = [0u8; ENVELOPE_SIZE];
        buf[0..TAG_FIELD_SIZE].copy_from_slice(&(self.tag as u32).to_ne_bytes());

        write_id_field(&mut buf[TAG_FIELD_SIZE..TAG_FIELD_SIZE + ID_FIELD_SIZE], &self.sender_id)?;
        let recipient_offset = TAG_FIELD_SIZE + ID_FIELD_SIZE;
        write_id_field(&mut buf[recipient_offset..recipient_offset + ID_FIELD_SIZE], &self.recipient_id)?;

        let length_offset = recipient_offset + ID_FIELD_SIZE;
        let data_len = self.data.len().min(DATA_SIZE);
        buf[length_offset..length_offset + LENGTH_FIELD_SIZE]
            .copy_from_slice(&(data_len as u32).to_ne_bytes());

        let data_offset = length_offset + LENGTH_FIELD_SIZE;
        buf[data_offset..data_offset + data_len].copy_from_slice(&self.data[..data_len]);

        Ok(buf)
    }

    /// Decode from the fixed-size on-wire representation.
    pub fn decode(buf: &[u8; ENVELOPE_SIZE]) -> Result<Self, ProtocolError> {
        let tag_value = u32::from_ne_bytes([buf[0], buf[1], buf[2], buf[3]]);
        let tag = Tag::from_u32(tag_value)?;

        let sender_id = read_id_field(&buf[TAG_FIELD_SIZE..TAG_FIELD_SIZE + ID_FIELD_SIZE])?;
        let recipient_offset = TAG_FIELD_SIZE + ID_FIELD_SIZE;
        let recipient_id = read_id_field(&buf[recipient_offset..recipient_offset + ID_FIELD_SIZE])?;

        let length_offset = recipient_offset + ID_FIELD_SIZE;
        let l = length_offset;
        let data_length = u32::from_ne_bytes([buf[l], buf[l + 1], buf[l + 2], buf[l + 3]]);
        if data_length as usize > DATA_SIZE {
            return Err(ProtocolError::PayloadTooLarge(data_length, DATA_SIZE));
        }

        let data_offset = length_offset + LENGTH_FIELD_SIZE;
        let data = buf[data_offset..data_offset + data_length as usize].to_vec();

        Ok(Self { tag, sender_id, recipient_id, data })
    }
}

fn write_id_field(field: &mut [u8], id: &str) -> Result<(), ProtocolError> {
    let bytes = id.as_bytes();
    if bytes.len() >= ID_FIELD_SIZE {
        return Err(ProtocolError::Malformed(format!(
            "id {id:?} does not fit in the {ID_FIELD_SIZE}-byte field"
        )));
    }
    field[..bytes.len()].copy_from_slice(bytes);
    // Remainder of `field` is already zeroed (NUL), matching "NUL-terminated".
    Ok(())
}

fn read_id_field(field: &[u8]) -> Result<String, ProtocolError> {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8(field[..end].to_vec())
        .map_err(|e| ProtocolError::Malformed(format!("id field is not valid UTF-8: {e}")))
}

/// Read exactly one envelope. A short read is fatal to the connection: if the peer
/// closes before any bytes arrive this is [`ProtocolError::ConnectionClosed`]; a
/// partial record is [`ProtocolError::Truncated`] (spec §4.1, §7 `Transport`).
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Envelope, ProtocolError> {
    let mut buf = [0u8; ENVELOPE_SIZE];
    let mut read_total = 0usize;
    while read_total < ENVELOPE_SIZE {
        let n = reader.read(&mut buf[read_total..]).await?;
        if n == 0 {
            return Err(if read_total == 0 {
                ProtocolError::ConnectionClosed
            } else {
                ProtocolError::Truncated
            });
        }
        read_total += n;
    }
    Envelope::decode(&buf)
}

/// Write exactly one envelope. A short write is fatal to the connection.
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    envelope: &Envelope,
) -> Result<(), ProtocolError> {
    let buf = envelope.encode()?;
    writer.write_all(&buf).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session handler: one task per accepted connection (spec §4.3).
//!
//! Split reader/writer, generic over the stream halves, reading one message and
//! dispatching by tag. The handler never blocks placement: placement only ever
//! reads a registry snapshot (spec §4.4).

use corral_core::{Clock, WorkerId};
use corral_wire::{read_message, write_message, Envelope, ProtocolError, Tag};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::env::COORDINATOR_ID;
use crate::Coordinator;

/// Own one connection until end of stream, updating the registry and container
/// index as messages arrive (spec §4.3).
///
/// `R`/`W` are generic over the stream halves so the same logic drives a real TCP
/// socket or, in tests, an in-memory duplex pipe.
pub async fn handle_connection<C, R, W>(ctx: Coordinator<C>, reader: R, writer: W)
where
    C: Clock,
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Envelope>();

    // One writer per connection serializes every write onto the socket (spec §5:
    // "per-worker connection write — serialized by the session handler").
    let writer_task = tokio::spawn(async move {
        let mut writer = writer;
        while let Some(envelope) = rx.recv().await {
            if write_message(&mut writer, &envelope).await.is_err() {
                break;
            }
        }
    });

    let mut reader = reader;
    let mut bound_id: Option<WorkerId> = None;

    loop {
        match read_message(&mut reader).await {
            Ok(envelope) => dispatch(&ctx, &tx, &mut bound_id, envelope),
            Err(ProtocolError::ConnectionClosed) => {
                debug!("connection closed cleanly");
                break;
            }
            Err(e) => {
                warn!(error = %e, "transport error on session; terminating connection");
                break;
            }
        }
    }

    if let Some(id) = bound_id {
        ctx.registry.close_connection(id.as_str());
    }
    drop(tx);
    let _ = writer_task.await;
}

fn dispatch<C: Clock>(
    ctx: &Coordinator<C>,
    tx: &mpsc::UnboundedSender<Envelope>,
    bound_id: &mut Option<WorkerId>,
    envelope: Envelope,
) {
    match envelope.tag {
        Tag::Register => handle_register(ctx, tx, bound_id, &envelope),
        Tag::Heartbeat => handle_heartbeat(ctx, &envelope),
        Tag::ContainerStatus => handle_container_status(ctx, &envelope),
        Tag::Error => {
            warn!(sender = %envelope.sender_id, message = ?envelope.parse_text(), "worker reported an error");
        }
        _ => {
            debug!(tag = ?envelope.tag, sender = %envelope.sender_id, "unexpected message on session; ignoring");
        }
    }
}

fn handle_register<C: Clock>(
    ctx: &Coordinator<C>,
    tx: &mpsc::UnboundedSender<Envelope>,
    bound_id: &mut Option<WorkerId>,
    envelope: &Envelope,
) {
    let Ok((hostname, ip, port)) = envelope.parse_register() else {
        let reply = Envelope::text(Tag::Error, COORDINATOR_ID, &envelope.sender_id, "malformed register payload");
        let _ = tx.send(reply);
        return;
    };

    let id = WorkerId::new(envelope.sender_id.clone());
    let now_ms = ctx.now_ms();
    match ctx.registry.upsert(id.clone(), hostname, ip, port, Some(tx.clone()), now_ms) {
        Ok(()) => {
            *bound_id = Some(id.clone());
            info!(worker = %id, "worker registered");
            let reply = Envelope::text(Tag::Ack, COORDINATOR_ID, id.as_str(), "registered");
            let _ = tx.send(reply);
        }
        Err(e) => {
            warn!(worker = %id, error = %e, "registration rejected");
            let reply = Envelope::text(Tag::Error, COORDINATOR_ID, id.as_str(), &e.to_string());
            let _ = tx.send(reply);
        }
    }
}

fn handle_heartbeat<C: Clock>(ctx: &Coordinator<C>, envelope: &Envelope) {
    let Ok(sample) = envelope.parse_heartbeat() else {
        debug!(sender = %envelope.sender_id, "malformed heartbeat payload; ignoring");
        return;
    };
    let now_ms = ctx.now_ms();
    if let Err(e) = ctx.registry.touch(&envelope.sender_id, sample, now_ms) {
        debug!(sender = %envelope.sender_id, error = %e, "heartbeat from unregistered worker");
    }
}

fn handle_container_status<C: Clock>(ctx: &Coordinator<C>, envelope: &Envelope) {
    match envelope.parse_container_status() {
        Ok(record) => {
            debug!(container = %record.id, state = %record.state, "container status reported");
            ctx.index.report_status(record);
        }
        Err(e) => {
            debug!(sender = %envelope.sender_id, error = %e, "malformed container status; ignoring");
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker agent's connection lifecycle (spec §4.6).
//!
//! One task owns the writer and serializes every write from an `mpsc` channel
//! (spec §5: "per-worker connection write — serialized by ... the agent"), while
//! the heartbeat loop and the command loop run as independent tasks that both
//! hold a sender into that channel.

use std::sync::Arc;
use std::time::Duration;

use corral_core::{Clock, ContainerState, ResourceSample, WorkerId};
use corral_wire::{read_message, write_message, Envelope, ProtocolError, Tag};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::driver::ContainerDriver;
use crate::env::COORDINATOR_ID;
use crate::table::ContainerTable;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Transport(#[from] ProtocolError),
    #[error("registration rejected: {0}")]
    Registration(String),
}

/// Shared state for one agent connection: the driver, the local container
/// table, and the knobs governing the heartbeat loop (spec §4.6).
pub struct AgentContext<D: ContainerDriver, C: Clock> {
    pub node_id: String,
    pub driver: D,
    pub clock: C,
    pub table: Arc<ContainerTable>,
    pub heartbeat_period_ms: u64,
}

impl<D: ContainerDriver, C: Clock> AgentContext<D, C> {
    pub fn new(node_id: String, driver: D, clock: C, heartbeat_period_ms: u64) -> Self {
        let table = Arc::new(ContainerTable::new(WorkerId::new(node_id.clone())));
        Self { node_id, driver, clock, table, heartbeat_period_ms }
    }
}

impl<D: ContainerDriver, C: Clock> Clone for AgentContext<D, C> {
    fn clone(&self) -> Self {
        Self {
            node_id: self.node_id.clone(),
            driver: self.driver.clone(),
            clock: self.clock.clone(),
            table: Arc::clone(&self.table),
            heartbeat_period_ms: self.heartbeat_period_ms,
        }
    }
}

/// Derive this worker's stable node id (spec §4.6: `<hostname>_<pid>`).
pub fn derive_node_id(hostname: &str, pid: u32) -> String {
    format!("{hostname}_{pid}")
}

/// Send REGISTER and wait for ACK (spec §4.6). On a non-ACK reply or a transport
/// error, the caller should exit non-zero (spec §6).
pub async fn register<R, W>(
    reader: &mut R,
    writer: &mut W,
    node_id: &str,
    hostname: &str,
    ip: &str,
    port: u16,
) -> Result<(), AgentError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let envelope = Envelope::register(node_id, COORDINATOR_ID, hostname, ip, port);
    write_message(writer, &envelope).await?;
    let reply = read_message(reader).await?;
    match reply.tag {
        Tag::Ack => Ok(()),
        Tag::Error => Err(AgentError::Registration(reply.parse_text().unwrap_or_default())),
        other => Err(AgentError::Registration(format!("unexpected reply tag {other:?}"))),
    }
}

/// Run the heartbeat loop and the command loop over an already-registered
/// connection until the coordinator closes it (spec §4.6). Returns once both
/// activities have stopped.
pub async fn run<D, C, R, W>(ctx: AgentContext<D, C>, reader: R, writer: W)
where
    D: ContainerDriver,
    C: Clock,
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Envelope>();

    let writer_task = tokio::spawn(async move {
        let mut writer = writer;
        while let Some(envelope) = rx.recv().await {
            if write_message(&mut writer, &envelope).await.is_err() {
                break;
            }
        }
    });

    let heartbeat_task = tokio::spawn(run_heartbeat_loop(ctx.clone(), tx.clone()));

    let mut reader = reader;
    run_command_loop(&ctx, &mut reader, &tx).await;

    heartbeat_task.abort();
    drop(tx);
    let _ = writer_task.await;
}

async fn run_heartbeat_loop<D: ContainerDriver, C: Clock>(ctx: AgentContext<D, C>, tx: mpsc::UnboundedSender<Envelope>) {
    let mut interval = tokio::time::interval(Duration::from_millis(ctx.heartbeat_period_ms.max(1)));
    interval.tick().await; // first tick fires immediately; consume it so period is the first real gap
    loop {
        interval.tick().await;
        let host = ctx.driver.sample().await;
        let sample = ResourceSample {
            cpu_pct: host.cpu_pct,
            mem_pct: host.mem_pct,
            disk_pct: host.disk_pct,
            container_count: ctx.table.len(),
            capacity: ctx.driver.capacity(),
        };
        match Envelope::heartbeat(&ctx.node_id, COORDINATOR_ID, &sample) {
            Ok(envelope) => {
                // Send errors are logged, not fatal (spec §4.6).
                if tx.send(envelope).is_err() {
                    warn!(node = %ctx.node_id, "heartbeat send failed; connection writer has stopped");
                }
            }
            Err(e) => warn!(node = %ctx.node_id, error = %e, "failed to encode heartbeat"),
        }
    }
}

async fn run_command_loop<D: ContainerDriver, C: Clock, R: AsyncRead + Unpin>(
    ctx: &AgentContext<D, C>,
    reader: &mut R,
    tx: &mpsc::UnboundedSender<Envelope>,
) {
    loop {
        match read_message(reader).await {
            Ok(envelope) => dispatch_command(ctx, tx, envelope).await,
            Err(ProtocolError::ConnectionClosed) => {
                debug!(node = %ctx.node_id, "coordinator closed the connection");
                break;
            }
            Err(e) => {
                warn!(node = %ctx.node_id, error = %e, "transport error on agent connection; terminating");
                break;
            }
        }
    }
}

async fn dispatch_command<D: ContainerDriver, C: Clock>(
    ctx: &AgentContext<D, C>,
    tx: &mpsc::UnboundedSender<Envelope>,
    envelope: Envelope,
) {
    match envelope.tag {
        Tag::Deploy => handle_deploy(ctx, tx, &envelope).await,
        Tag::Start => handle_start(ctx, tx, &envelope).await,
        Tag::Stop => handle_stop(ctx, tx, &envelope).await,
        Tag::Delete => handle_delete(ctx, tx, &envelope).await,
        _ => debug!(tag = ?envelope.tag, "unexpected message on agent connection; ignoring"),
    }
}

fn reply_ack<D: ContainerDriver, C: Clock>(ctx: &AgentContext<D, C>, tx: &mpsc::UnboundedSender<Envelope>, message: &str) {
    let _ = tx.send(Envelope::text(Tag::Ack, &ctx.node_id, COORDINATOR_ID, message));
}

fn reply_error<D: ContainerDriver, C: Clock>(ctx: &AgentContext<D, C>, tx: &mpsc::UnboundedSender<Envelope>, message: &str) {
    let _ = tx.send(Envelope::text(Tag::Error, &ctx.node_id, COORDINATOR_ID, message));
}

async fn handle_deploy<D: ContainerDriver, C: Clock>(
    ctx: &AgentContext<D, C>,
    tx: &mpsc::UnboundedSender<Envelope>,
    envelope: &Envelope,
) {
    let Ok(config) = envelope.parse_deploy() else {
        reply_error(ctx, tx, "malformed deploy payload");
        return;
    };
    let name = config.name.clone();
    match ctx.driver.create(&config).await {
        Ok(()) => {
            let record = ctx.table.insert_stopped(config, ctx.clock.epoch_ms());
            // The coordinator's intent transition left this container at `Starting`
            // (spec §4.5); report the worker's actual `Stopped` state so the index
            // reconciles (spec §4.3: CONTAINER_STATUS is the reconciling truth).
            if let Ok(status) = Envelope::container_status(&ctx.node_id, COORDINATOR_ID, &record) {
                let _ = tx.send(status);
            }
            reply_ack(ctx, tx, "deployed");
        }
        Err(e) => {
            warn!(container = %name, error = %e, "driver failed to create container");
            reply_error(ctx, tx, "deployment failed");
        }
    }
}

async fn handle_start<D: ContainerDriver, C: Clock>(
    ctx: &AgentContext<D, C>,
    tx: &mpsc::UnboundedSender<Envelope>,
    envelope: &Envelope,
) {
    let Ok(name) = envelope.parse_name() else {
        reply_error(ctx, tx, "malformed start payload");
        return;
    };
    ctx.table.set_state(&name, ContainerState::Starting);
    match ctx.driver.start(&name).await {
        Ok(()) => {
            if let Some(record) = ctx.table.mark_started(&name, ctx.clock.epoch_ms()) {
                if let Ok(status) = Envelope::container_status(&ctx.node_id, COORDINATOR_ID, &record) {
                    let _ = tx.send(status);
                }
            }
            reply_ack(ctx, tx, "started");
        }
        Err(e) => {
            warn!(container = %name, error = %e, "driver failed to start container");
            ctx.table.set_state(&name, ContainerState::Error);
            reply_error(ctx, tx, "start failed");
        }
    }
}

async fn handle_stop<D: ContainerDriver, C: Clock>(
    ctx: &AgentContext<D, C>,
    tx: &mpsc::UnboundedSender<Envelope>,
    envelope: &Envelope,
) {
    let Ok(name) = envelope.parse_name() else {
        reply_error(ctx, tx, "malformed stop payload");
        return;
    };
    ctx.table.set_state(&name, ContainerState::Stopping);
    match ctx.driver.stop(&name).await {
        Ok(()) => {
            if let Some(record) = ctx.table.set_state(&name, ContainerState::Stopped) {
                if let Ok(status) = Envelope::container_status(&ctx.node_id, COORDINATOR_ID, &record) {
                    let _ = tx.send(status);
                }
            }
            reply_ack(ctx, tx, "stopped");
        }
        Err(e) => {
            warn!(container = %name, error = %e, "driver failed to stop container");
            reply_error(ctx, tx, "stop failed");
        }
    }
}

async fn handle_delete<D: ContainerDriver, C: Clock>(
    ctx: &AgentContext<D, C>,
    tx: &mpsc::UnboundedSender<Envelope>,
    envelope: &Envelope,
) {
    let Ok(name) = envelope.parse_name() else {
        reply_error(ctx, tx, "malformed delete payload");
        return;
    };
    ctx.table.remove(&name);
    match ctx.driver.destroy(&name).await {
        Ok(()) => reply_ack(ctx, tx, "deleted"),
        Err(e) => {
            warn!(container = %name, error = %e, "driver failed to destroy container");
            reply_error(ctx, tx, "delete failed");
        }
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;

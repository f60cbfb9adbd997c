// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness for the workspace-level end-to-end scenarios (spec §8).
//!
//! Each scenario runs a real coordinator (`corral_daemon::session::handle_connection`
//! behind a loopback `TcpListener`, `corral_daemon::shell::dispatch` as the in-process
//! command surface, exactly as spec §4.7's data-flow diagram has it) against one or
//! more [`FakeWorker`]s: a scripted stand-in that speaks the wire protocol directly
//! instead of running the real `corral_agent` heartbeat/command loops, so a test
//! controls exactly when a heartbeat or status report lands without waiting on real
//! wall-clock timing. `corral_agent`'s own loops are exercised by its unit tests
//! (`crates/agent/src/agent_tests.rs`); this harness plays the role a spawned worker
//! process would, without needing a second binary under test.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use corral_core::{ContainerRecord, FakeClock, ResourceSample};
use corral_daemon::{session, Coordinator};
use corral_registry::{ContainerIndex, WorkerRegistry};
use corral_wire::{read_message, write_message, Envelope, Tag};
use tokio::net::{TcpListener, TcpStream};

pub const COORDINATOR_ID: &str = "coordinator";

/// A running coordinator: registry, container index, and an acceptor loop bound
/// to a loopback port. Time is a [`FakeClock`] the test advances explicitly,
/// exactly as `crates/daemon/src/*_tests.rs` already does for unit tests.
pub struct Cluster {
    pub ctx: Coordinator<FakeClock>,
    pub addr: SocketAddr,
}

impl Cluster {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind loopback listener");
        let addr = listener.local_addr().expect("listener has a local address");
        let ctx = Coordinator::new(
            Arc::new(WorkerRegistry::new(256)),
            Arc::new(ContainerIndex::new(1024, COORDINATOR_ID)),
            FakeClock::new(),
            30_000,
        );

        let accept_ctx = ctx.clone();
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, _peer)) => {
                        let (reader, writer) = stream.into_split();
                        tokio::spawn(session::handle_connection(accept_ctx.clone(), reader, writer));
                    }
                    Err(_) => break,
                }
            }
        });

        Self { ctx, addr }
    }

    /// Advance the coordinator's clock, for liveness-window scenarios.
    pub fn advance_clock(&self, duration: Duration) {
        self.ctx.clock.advance(duration);
    }
}

/// A scripted worker connection (spec §4.1 wire protocol, driven directly).
pub struct FakeWorker {
    pub id: String,
    stream: TcpStream,
}

impl FakeWorker {
    /// Connect and complete the REGISTER/ACK handshake (spec §4.6).
    pub async fn register(cluster: &Cluster, id: &str, hostname: &str, ip: &str, port: u16) -> Self {
        let mut stream = TcpStream::connect(cluster.addr).await.expect("connect to coordinator");
        let envelope = Envelope::register(id, COORDINATOR_ID, hostname, ip, port);
        write_message(&mut stream, &envelope).await.expect("send REGISTER");
        let reply = read_message(&mut stream).await.expect("read REGISTER reply");
        assert_eq!(reply.tag, Tag::Ack, "registration should be acknowledged");
        Self { id: id.to_string(), stream }
    }

    pub async fn heartbeat(&mut self, sample: ResourceSample) {
        let envelope = Envelope::heartbeat(&self.id, COORDINATOR_ID, &sample).expect("encode heartbeat");
        write_message(&mut self.stream, &envelope).await.expect("send heartbeat");
    }

    /// Read the next message the coordinator sent this worker (e.g. DEPLOY).
    pub async fn recv(&mut self) -> Envelope {
        read_message(&mut self.stream).await.expect("read message from coordinator")
    }

    pub async fn ack(&mut self, message: &str) {
        let envelope = Envelope::text(Tag::Ack, &self.id, COORDINATOR_ID, message);
        write_message(&mut self.stream, &envelope).await.expect("send ack");
    }

    pub async fn report_status(&mut self, record: ContainerRecord) {
        let envelope = Envelope::container_status(&self.id, COORDINATOR_ID, &record).expect("encode status");
        write_message(&mut self.stream, &envelope).await.expect("send status");
    }

    /// Drop the connection, simulating a crashed or killed worker process
    /// (spec §8 scenario 5, §3: "connection close alone moves it to Disconnected").
    pub async fn disconnect(self) {
        drop(self.stream);
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

/// Poll a condition until it holds or a short budget elapses, for assertions that
/// depend on a spawned session task having processed a message.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(condition(), "condition did not become true within the test's polling budget");
}

pub fn write_config_file(json: &str) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut file = tempfile::NamedTempFile::new().expect("create temp config file");
    file.write_all(json.as_bytes()).expect("write config file");
    file
}

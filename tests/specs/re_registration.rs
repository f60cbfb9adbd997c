// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! spec §8 scenario 6: a worker that reconnects with the same id updates
//! its existing registry record in place rather than duplicating it, and its
//! prior containers remain associated with it.

use corral_core::{ResourceSample, WorkerState};
use corral_daemon::shell;

use crate::support::{wait_until, write_config_file, Cluster, FakeWorker};

#[tokio::test]
async fn re_registration_updates_the_existing_record_in_place() {
    let cluster = Cluster::start().await;

    let mut a = FakeWorker::register(&cluster, "A", "boxA", "10.0.0.1", 9000).await;
    a.heartbeat(ResourceSample { cpu_pct: 0.0, mem_pct: 0.0, disk_pct: 0.0, container_count: 0, capacity: 4 }).await;
    wait_until(|| cluster.ctx.registry.find("A").is_some_and(|r| r.sample.capacity == 4)).await;

    let config = write_config_file(
        r#"{"name":"web","image":"ubuntu:20.04","cpu_limit":1,"memory_limit_mb":256,"privileged":false}"#,
    );
    let Ok(shell::Outcome::Deployed(id)) = shell::dispatch(&cluster.ctx, &format!("deploy {}", config.path().display()))
    else {
        panic!("expected deploy to place the container on worker A");
    };
    assert_eq!(id.as_str(), "A_web");

    a.disconnect().await;
    wait_until(|| cluster.ctx.registry.find("A").is_some_and(|r| r.state == WorkerState::Disconnected)).await;

    // Same id, new connection: re-registers in place rather than duplicating.
    let mut a_again = FakeWorker::register(&cluster, "A", "boxA", "10.0.0.1", 9001).await;
    wait_until(|| cluster.ctx.registry.find("A").is_some_and(|r| r.state == WorkerState::Connected)).await;
    let record = cluster.ctx.registry.find("A").expect("A is still the only record for this id");
    assert_eq!(record.port, 9001);
    assert!(record.containers.iter().any(|c| c == "A_web"), "prior container stays associated with A");

    a_again.heartbeat(ResourceSample { cpu_pct: 0.0, mem_pct: 0.0, disk_pct: 0.0, container_count: 1, capacity: 4 }).await;
    wait_until(|| cluster.ctx.registry.find("A").is_some_and(|r| r.sample.container_count == 1)).await;

    let Ok(shell::Outcome::Nodes(nodes)) = shell::dispatch(&cluster.ctx, "list nodes") else {
        panic!("expected a node listing");
    };
    assert_eq!(nodes.iter().filter(|n| n.id.as_str() == "A").count(), 1, "no duplicate record for A");
}

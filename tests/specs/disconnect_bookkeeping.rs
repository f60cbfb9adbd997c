// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! spec §8 scenario 5: closing a worker's connection alone moves it to
//! `Disconnected` and takes it out of placement, but its container records
//! are left exactly as last reported.

use corral_core::{ResourceSample, WorkerState};
use corral_daemon::shell;

use crate::support::{wait_until, write_config_file, Cluster, FakeWorker};

#[tokio::test]
async fn disconnect_excludes_worker_from_placement_but_keeps_its_containers() {
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
    let _ = a.recv().await; // the DEPLOY command itself; left unacknowledged on purpose

    a.disconnect().await;
    wait_until(|| cluster.ctx.registry.find("A").is_some_and(|r| r.state == WorkerState::Disconnected)).await;

    let Ok(shell::Outcome::Containers(containers)) = shell::dispatch(&cluster.ctx, "list containers") else {
        panic!("expected a container listing");
    };
    assert!(containers.iter().any(|c| c.id.as_str() == "A_web"));

    let Ok(shell::Outcome::Nodes(nodes)) = shell::dispatch(&cluster.ctx, "list nodes") else {
        panic!("expected a node listing");
    };
    let node_a = nodes.iter().find(|n| n.id.as_str() == "A").expect("A is still in the registry");
    assert_eq!(node_a.state, WorkerState::Disconnected);

    // A second worker is the only live candidate now; the new container must land on it.
    let mut b = FakeWorker::register(&cluster, "B", "boxB", "10.0.0.2", 9000).await;
    b.heartbeat(ResourceSample { cpu_pct: 0.0, mem_pct: 0.0, disk_pct: 0.0, container_count: 0, capacity: 4 }).await;
    wait_until(|| cluster.ctx.registry.find("B").is_some_and(|r| r.sample.capacity == 4)).await;

    let second_config = write_config_file(
        r#"{"name":"db","image":"ubuntu:20.04","cpu_limit":1,"memory_limit_mb":256,"privileged":false}"#,
    );
    let Ok(shell::Outcome::Deployed(id)) =
        shell::dispatch(&cluster.ctx, &format!("deploy {}", second_config.path().display()))
    else {
        panic!("expected deploy to find worker B");
    };
    assert_eq!(id.as_str(), "B_db");
}

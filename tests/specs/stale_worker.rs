// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! spec §8 scenario 2: a worker whose heartbeat has gone stale past the
//! 30 s liveness window is ineligible for placement even if its last known
//! utilization was better than a live peer's.

use std::time::Duration;

use corral_core::ResourceSample;
use corral_daemon::shell;

use crate::support::{wait_until, write_config_file, Cluster, FakeWorker};

#[tokio::test]
async fn deploy_skips_a_worker_whose_heartbeat_has_gone_stale() {
    let cluster = Cluster::start().await;

    let mut a = FakeWorker::register(&cluster, "A", "boxA", "10.0.0.1", 9000).await;
    a.heartbeat(ResourceSample { cpu_pct: 50.0, mem_pct: 50.0, disk_pct: 50.0, container_count: 0, capacity: 10 }).await;

    let mut b = FakeWorker::register(&cluster, "B", "boxB", "10.0.0.2", 9000).await;
    b.heartbeat(ResourceSample { cpu_pct: 10.0, mem_pct: 10.0, disk_pct: 10.0, container_count: 0, capacity: 10 }).await;

    wait_until(|| cluster.ctx.registry.find("A").is_some_and(|r| r.sample.capacity == 10)).await;
    wait_until(|| cluster.ctx.registry.find("B").is_some_and(|r| r.sample.capacity == 10)).await;

    // B stops heartbeating; A keeps going. 31s pass, so only B is stale.
    cluster.advance_clock(Duration::from_secs(31));
    a.heartbeat(ResourceSample { cpu_pct: 50.0, mem_pct: 50.0, disk_pct: 50.0, container_count: 0, capacity: 10 }).await;
    wait_until(|| cluster.ctx.registry.find("A").is_some_and(|r| r.last_heartbeat_ms == cluster.ctx.now_ms())).await;

    let config = write_config_file(
        r#"{"name":"web","image":"ubuntu:20.04","cpu_limit":1,"memory_limit_mb":256,"privileged":false}"#,
    );
    let Ok(shell::Outcome::Deployed(id)) = shell::dispatch(&cluster.ctx, &format!("deploy {}", config.path().display()))
    else {
        panic!("expected deploy to find A still eligible");
    };
    assert_eq!(id.as_str(), "A_web");
}

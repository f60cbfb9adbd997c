// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! spec §8 scenario 4: a worker at full capacity is never a placement
//! candidate, even when its utilization otherwise scores better.

use corral_core::ResourceSample;
use corral_daemon::shell;

use crate::support::{wait_until, write_config_file, Cluster, FakeWorker};

#[tokio::test]
async fn deploy_skips_a_worker_that_is_at_capacity() {
    let cluster = Cluster::start().await;

    let mut a = FakeWorker::register(&cluster, "A", "boxA", "10.0.0.1", 9000).await;
    a.heartbeat(ResourceSample { cpu_pct: 10.0, mem_pct: 10.0, disk_pct: 10.0, container_count: 50, capacity: 50 }).await;

    let mut b = FakeWorker::register(&cluster, "B", "boxB", "10.0.0.2", 9000).await;
    b.heartbeat(ResourceSample { cpu_pct: 90.0, mem_pct: 90.0, disk_pct: 90.0, container_count: 49, capacity: 50 }).await;

    wait_until(|| cluster.ctx.registry.find("A").is_some_and(|r| r.sample.container_count == 50)).await;
    wait_until(|| cluster.ctx.registry.find("B").is_some_and(|r| r.sample.container_count == 49)).await;

    let config = write_config_file(
        r#"{"name":"web","image":"ubuntu:20.04","cpu_limit":1,"memory_limit_mb":256,"privileged":false}"#,
    );
    let Ok(shell::Outcome::Deployed(id)) = shell::dispatch(&cluster.ctx, &format!("deploy {}", config.path().display()))
    else {
        panic!("expected deploy to fall back to the worker with spare capacity");
    };
    assert_eq!(id.as_str(), "B_web");
}

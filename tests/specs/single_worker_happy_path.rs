// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! spec §8 scenario 1: single-worker happy path.

use corral_core::ResourceSample;
use corral_daemon::shell;

use crate::support::{wait_until, write_config_file, Cluster, FakeWorker};

#[tokio::test]
async fn deploy_start_stop_delete_on_the_only_worker() {
    let cluster = Cluster::start().await;
    let mut worker = FakeWorker::register(&cluster, "A", "box1", "10.0.0.5", 9000).await;
    worker.heartbeat(ResourceSample { cpu_pct: 0.0, mem_pct: 0.0, disk_pct: 0.0, container_count: 0, capacity: 4 }).await;
    wait_until(|| cluster.ctx.registry.find("A").is_some_and(|r| r.sample.capacity == 4)).await;

    let config = write_config_file(
        r#"{"name":"web","image":"ubuntu:20.04","cpu_limit":2,"memory_limit_mb":512,"privileged":false}"#,
    );
    let Ok(shell::Outcome::Deployed(id)) = shell::dispatch(&cluster.ctx, &format!("deploy {}", config.path().display()))
    else {
        panic!("expected deploy to place the container on worker A");
    };
    assert_eq!(id.as_str(), "A_web");
    assert_eq!(cluster.ctx.index.status("A_web"), Some(corral_core::ContainerState::Starting));

    // The worker actually creates the container (in `Stopped` state) and reports
    // it back as CONTAINER_STATUS before ACKing the DEPLOY (spec §4.3, §4.6).
    let deploy_command = worker.recv().await;
    assert_eq!(deploy_command.tag, corral_wire::Tag::Deploy);
    let config = deploy_command.parse_deploy().unwrap();
    assert_eq!(config.name, "web");
    let created = corral_core::ContainerRecord::new(corral_core::WorkerId::new("A"), config, cluster.ctx.now_ms());
    let mut created = created;
    created.state = corral_core::ContainerState::Stopped;
    worker.report_status(created).await;
    worker.ack("deployed").await;

    wait_until(|| cluster.ctx.index.status("A_web") == Some(corral_core::ContainerState::Stopped)).await;

    let Ok(shell::Outcome::Started) = shell::dispatch(&cluster.ctx, "start A_web") else {
        panic!("expected start to succeed");
    };
    assert_eq!(cluster.ctx.index.status("A_web"), Some(corral_core::ContainerState::Starting));

    let start_command = worker.recv().await;
    assert_eq!(start_command.tag, corral_wire::Tag::Start);
    let mut running = cluster.ctx.index.get("A_web").unwrap();
    running.state = corral_core::ContainerState::Running;
    running.started_at_ms = Some(cluster.ctx.now_ms());
    worker.report_status(running).await;
    worker.ack("started").await;
    wait_until(|| cluster.ctx.index.status("A_web") == Some(corral_core::ContainerState::Running)).await;

    let Ok(shell::Outcome::Stopped) = shell::dispatch(&cluster.ctx, "stop A_web") else {
        panic!("expected stop to succeed");
    };
    let stop_command = worker.recv().await;
    assert_eq!(stop_command.tag, corral_wire::Tag::Stop);
    let mut stopped = cluster.ctx.index.get("A_web").unwrap();
    stopped.state = corral_core::ContainerState::Stopped;
    worker.report_status(stopped).await;
    worker.ack("stopped").await;
    wait_until(|| cluster.ctx.index.status("A_web") == Some(corral_core::ContainerState::Stopped)).await;

    let Ok(shell::Outcome::Deleted) = shell::dispatch(&cluster.ctx, "delete A_web") else {
        panic!("expected delete to succeed");
    };
    let delete_command = worker.recv().await;
    assert_eq!(delete_command.tag, corral_wire::Tag::Delete);
    worker.ack("deleted").await;

    assert_eq!(cluster.ctx.index.status("A_web"), None);
    let Ok(shell::Outcome::Containers(containers)) = shell::dispatch(&cluster.ctx, "list containers") else {
        panic!("expected a container listing");
    };
    assert!(containers.is_empty());
}

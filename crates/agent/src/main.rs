// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `corral-worker`: the worker agent binary (spec §6).
//!
//! `corral-worker <coordinator_ip> <coordinator_port>` connects to the
//! coordinator, registers, and services heartbeat and lifecycle commands until
//! the connection ends or a signal requests shutdown. Exit codes: 1 on a bad
//! argument, connection failure, or registration failure; this binary otherwise
//! runs until terminated (spec §6: "0 never").

use corral_agent::{derive_node_id, env, register, run, AgentContext, SimulatedDriver};
use corral_core::SystemClock;
use tokio::net::TcpStream;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    let (ip, port) = match parse_args() {
        Ok(addr) => addr,
        Err(message) => {
            eprintln!("{message}");
            std::process::exit(1);
        }
    };

    let _log_guard = setup_logging();

    let hostname = gethostname::gethostname().to_string_lossy().into_owned();
    let node_id = derive_node_id(&hostname, std::process::id());

    let stream = match TcpStream::connect((ip.as_str(), port)).await {
        Ok(stream) => stream,
        Err(e) => {
            eprintln!("error: failed to connect to {ip}:{port}: {e}");
            std::process::exit(1);
        }
    };
    let advertise_ip = stream.local_addr().map(|a| a.ip().to_string()).unwrap_or_else(|_| ip.clone());
    let (mut reader, mut writer) = stream.into_split();

    if let Err(e) = register(&mut reader, &mut writer, &node_id, &hostname, &advertise_ip, env::advertise_port()).await {
        eprintln!("error: registration failed: {e}");
        std::process::exit(1);
    }
    info!(%node_id, coordinator = %format!("{ip}:{port}"), "registered with coordinator");

    let ctx = AgentContext::new(node_id, SimulatedDriver::new(env::max_containers()), SystemClock, env::heartbeat_period().as_millis() as u64);

    tokio::select! {
        _ = run(ctx, reader, writer) => {
            info!("connection to coordinator ended");
        }
        _ = wait_for_shutdown_signal() => {
            info!("shutdown requested");
        }
    }

    // This binary never exits 0 (spec §6: "0 never"); it only stops by signal or
    // by losing its connection to the coordinator, both non-zero.
    std::process::exit(1);
}

fn parse_args() -> Result<(String, u16), String> {
    let mut args = std::env::args().skip(1);
    let ip = args.next().ok_or_else(usage)?;
    let port = args
        .next()
        .ok_or_else(usage)?
        .parse::<u16>()
        .map_err(|_| "error: invalid coordinator port".to_string())?;
    if args.next().is_some() {
        return Err(usage());
    }
    Ok((ip, port))
}

fn usage() -> String {
    "usage: corral-worker <coordinator_ip> <coordinator_port>".to_string()
}

#[cfg(unix)]
async fn wait_for_shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let sigint = signal(SignalKind::interrupt());
    let sigterm = signal(SignalKind::terminate());
    let (mut sigint, mut sigterm) = match (sigint, sigterm) {
        (Ok(a), Ok(b)) => (a, b),
        (Err(e), _) | (_, Err(e)) => {
            error!(error = %e, "failed to install signal handlers; shutdown signal disabled");
            std::future::pending::<()>().await;
            return;
        }
    };
    tokio::select! {
        _ = sigint.recv() => {}
        _ = sigterm.recv() => {}
    }
}

fn setup_logging() -> tracing_appender::non_blocking::WorkerGuard {
    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stderr());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(non_blocking)).init();
    guard
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `corrald`: the coordinator binary (spec §6).
//!
//! `corrald [--port PORT]` binds the listening socket, accepts one session per
//! connecting worker, and runs the interactive command surface on stdin at a
//! `coordinator> ` prompt. Exit codes: 0 on a clean `quit`, 1 on a bad port
//! argument or listen failure (spec §6).

use std::net::SocketAddr;
use std::sync::Arc;

use corral_core::SystemClock;
use corral_daemon::{env, lifecycle, session, shell, Coordinator};
use corral_registry::{ContainerIndex, WorkerRegistry};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() {
    let addr = match resolve_listen_addr() {
        Ok(addr) => addr,
        Err(message) => {
            eprintln!("{message}");
            std::process::exit(1);
        }
    };

    let _log_guard = setup_logging();

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("error: failed to listen on {addr}: {e}");
            std::process::exit(1);
        }
    };
    info!(%addr, "corrald listening");

    let ctx = Coordinator::new(
        Arc::new(WorkerRegistry::new(env::worker_capacity())),
        Arc::new(ContainerIndex::new(env::container_capacity(), env::COORDINATOR_ID)),
        SystemClock,
        env::liveness_window().as_millis() as u64,
    );

    let shutdown = lifecycle::ShutdownHandle::new();
    lifecycle::install_signal_handlers(shutdown.clone());

    let acceptor = tokio::spawn(run_acceptor(ctx.clone(), listener, shutdown.clone()));

    run_command_surface(&ctx, &shutdown).await;

    shutdown.request();
    let _ = acceptor.await;
    info!("corrald stopped");
}

fn resolve_listen_addr() -> Result<SocketAddr, String> {
    let mut args = std::env::args().skip(1);
    let mut port_override: Option<u16> = None;
    while let Some(arg) = args.next() {
        if arg == "--port" {
            let value = args.next().ok_or_else(|| "error: --port requires a value".to_string())?;
            port_override =
                Some(value.parse::<u16>().map_err(|_| format!("error: invalid --port value {value:?}"))?);
        } else {
            return Err(format!("error: unexpected argument {arg:?}\nusage: corrald [--port PORT]"));
        }
    }

    let mut addr: SocketAddr = env::listen_addr()
        .parse()
        .map_err(|e| format!("error: invalid CORRAL_LISTEN_ADDR: {e}"))?;
    if let Some(port) = port_override {
        addr.set_port(port);
    }
    Ok(addr)
}

async fn run_acceptor<C: corral_core::Clock>(
    ctx: Coordinator<C>,
    listener: TcpListener,
    shutdown: lifecycle::ShutdownHandle,
) {
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        info!(%peer, "accepted worker connection");
                        let (reader, writer) = stream.into_split();
                        let ctx = ctx.clone();
                        tokio::spawn(session::handle_connection(ctx, reader, writer));
                    }
                    Err(e) => error!(error = %e, "accept failed"),
                }
            }
            _ = shutdown.cancelled() => {
                info!("acceptor loop stopping");
                break;
            }
        }
    }
}

async fn run_command_surface<C: corral_core::Clock>(ctx: &Coordinator<C>, shutdown: &lifecycle::ShutdownHandle) {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        if stdout.write_all(b"coordinator> ").await.is_err() || stdout.flush().await.is_err() {
            break;
        }

        tokio::select! {
            line = lines.next_line() => {
                match line {
                    Ok(Some(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        match shell::dispatch(ctx, &line) {
                            Ok(shell::Outcome::Quit) => break,
                            Ok(outcome) => print_outcome(outcome).await,
                            Err(e) => {
                                let _ = stdout.write_all(format!("error: {e}\n").as_bytes()).await;
                            }
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        error!(error = %e, "failed to read command");
                        break;
                    }
                }
            }
            _ = shutdown.cancelled() => break,
        }
    }
}

async fn print_outcome(outcome: shell::Outcome) {
    let mut stdout = tokio::io::stdout();
    let rendered = match outcome {
        shell::Outcome::Deployed(id) => format!("deployed {id}\n"),
        shell::Outcome::Started => "started\n".to_string(),
        shell::Outcome::Stopped => "stopped\n".to_string(),
        shell::Outcome::Deleted => "deleted\n".to_string(),
        shell::Outcome::Containers(containers) => {
            let mut out = String::new();
            for c in containers {
                out.push_str(&format!("{}\t{}\t{}\n", c.id, c.state, c.owner));
            }
            out
        }
        shell::Outcome::Nodes(nodes) => {
            let mut out = String::new();
            for n in nodes {
                out.push_str(&format!("{}\t{}\t{}:{}\n", n.id, n.state, n.ip, n.port));
            }
            out
        }
        // The caller intercepts `Quit` before reaching here; nothing to render.
        shell::Outcome::Quit => String::new(),
    };
    let _ = stdout.write_all(rendered.as_bytes()).await;
}

fn setup_logging() -> tracing_appender::non_blocking::WorkerGuard {
    let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stderr());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(filter).with(fmt::layer().with_writer(non_blocking)).init();
    guard
}

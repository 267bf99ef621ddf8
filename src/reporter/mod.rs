//! Reporting layer boundary.
//!
//! The core hands the reporting implementation the full instruction, the
//! intake receiver, and the shutdown token; what it serves is its own
//! business. [`SummaryReporter`] is the shipped implementation: a JSON
//! committee summary answered on the reporter port and on every handed-off
//! intake connection.

#![allow(missing_docs)]

use std::collections::BTreeMap;
use std::io::{self, Write as _};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use serde::Serialize;

use crate::core::errors::Result;
use crate::daemon::WatchContext;
use crate::daemon::shutdown::ShutdownToken;
use crate::logger::EventLog;
use crate::roster::Instruction;

/// Reporting layer contract: runs on its own thread for the lifetime of
/// the service, consuming intake connections until the token cancels or
/// the intake side hangs up.
pub trait Reporter {
    fn run(&self, ctx: &WatchContext, intake: &Receiver<TcpStream>, token: &ShutdownToken);
}

/// How often the reporter re-checks its listener and the token between
/// intake receives.
const DRAIN_POLL: Duration = Duration::from_millis(50);

const DEFAULT_WRITE_TIMEOUT_SECS: u64 = 10;

/// Minimal roster-summary reporter.
#[derive(Debug, Default)]
pub struct SummaryReporter;

#[derive(Serialize)]
struct Summary<'a> {
    #[serde(rename = "target-chain")]
    chain: &'a str,
    #[serde(rename = "node-count")]
    node_count: usize,
    shards: BTreeMap<u32, ShardSummary<'a>>,
}

#[derive(Serialize)]
struct ShardSummary<'a> {
    #[serde(rename = "source-file")]
    source_file: String,
    members: &'a [String],
}

impl Reporter for SummaryReporter {
    fn run(&self, ctx: &WatchContext, intake: &Receiver<TcpStream>, token: &ShutdownToken) {
        let log = &ctx.log;
        let payload = match render_summary(&ctx.instruction) {
            Ok(payload) => payload,
            Err(err) => {
                log.error("reporter", &format!("summary render failed: {err}"));
                "{}".to_string()
            }
        };
        let write_timeout = Duration::from_secs(
            ctx.instruction
                .config
                .performance
                .http_timeout
                .unwrap_or(DEFAULT_WRITE_TIMEOUT_SECS),
        );

        let http = self.bind_http(ctx);

        loop {
            if token.is_cancelled() {
                log.info("reporter", "shutdown token cancelled; stopping reporter");
                break;
            }
            if let Some(listener) = http.as_ref() {
                match listener.accept() {
                    Ok((conn, _peer)) => {
                        respond(log, conn, &payload, write_timeout);
                    }
                    Err(err) if err.kind() == io::ErrorKind::WouldBlock => {}
                    Err(err) => {
                        log.debug("reporter", &format!("transient accept failure: {err}"));
                    }
                }
            }
            match intake.recv_timeout(DRAIN_POLL) {
                Ok(conn) => {
                    respond(log, conn, &payload, write_timeout);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    log.warn("reporter", "intake queue hung up; stopping reporter");
                    break;
                }
            }
        }
    }
}

impl SummaryReporter {
    /// Binds the reporting server's own port. A bind failure here does
    /// not take the daemon down; the reporter keeps draining the intake
    /// queue so acceptance never stalls on a missing consumer.
    fn bind_http(&self, ctx: &WatchContext) -> Option<TcpListener> {
        let port = ctx.instruction.config.http_reporter.port?;
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        match TcpListener::bind(addr) {
            Ok(listener) => match listener.set_nonblocking(true) {
                Ok(()) => {
                    ctx.log
                        .info("reporter", &format!("serving roster summary on {addr}"));
                    Some(listener)
                }
                Err(err) => {
                    ctx.log
                        .error("reporter", &format!("cannot configure {addr}: {err}"));
                    None
                }
            },
            Err(err) => {
                ctx.log
                    .error("reporter", &format!("cannot bind {addr}: {err}"));
                None
            }
        }
    }
}

fn render_summary(instruction: &Instruction) -> Result<String> {
    let shards = instruction
        .committees
        .iter()
        .map(|(&id, committee)| {
            (
                id,
                ShardSummary {
                    source_file: committee.source_file.display().to_string(),
                    members: &committee.members,
                },
            )
        })
        .collect();
    let summary = Summary {
        chain: &instruction.config.network_config.target_chain,
        node_count: instruction.node_count(),
        shards,
    };
    Ok(serde_json::to_string(&summary)?)
}

fn respond(
    log: &EventLog,
    mut conn: TcpStream,
    payload: &str,
    write_timeout: Duration,
) {
    if let Err(err) = conn.set_write_timeout(Some(write_timeout)) {
        log.debug("reporter", &format!("cannot set write timeout: {err}"));
    }
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{payload}",
        payload.len()
    );
    if let Err(err) = conn.write_all(response.as_bytes()) {
        let who = conn
            .peer_addr()
            .map_or_else(|_| "unknown peer".to_string(), |peer| peer.to_string());
        log.debug("reporter", &format!("write to {who} failed: {err}"));
    }
}

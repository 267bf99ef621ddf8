//! Service lifecycle: listener setup, concurrent intake and reporting,
//! and shutdown on an injected cause.
//!
//! One [`Service`] instance serves exactly one run. The lifecycle blocks
//! on the shutdown-cause channel — in production fed by
//! `daemon::signals::subscribe`, in tests fed directly — and owns the
//! single cancellation of the shared token.

#![allow(missing_docs)]

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, bounded};
use parking_lot::Mutex;

use crate::core::errors::{Result, WatchdogError};
use crate::daemon::WatchContext;
use crate::daemon::intake::{self, INTAKE_QUEUE_DEPTH};
use crate::daemon::shutdown::{ShutdownCause, ShutdownToken};
use crate::reporter::Reporter;

/// Lifecycle phases. No phase is re-entrant; `Binding` moves straight to
/// `Stopped` when the listener cannot be bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Binding,
    Running,
    ShuttingDown,
    Stopped,
}

/// How a run ended. Both are clean shutdowns; the CLI maps them to exit
/// status and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Stopped by an operator interrupt.
    Interrupted,
    /// Stopped by a termination signal.
    Terminated,
}

/// The watchdog's network-service lifecycle.
pub struct Service {
    ctx: WatchContext,
    reporter: Arc<dyn Reporter + Send + Sync>,
    phase: Arc<Mutex<Phase>>,
}

impl Service {
    #[must_use]
    pub fn new(ctx: WatchContext, reporter: Arc<dyn Reporter + Send + Sync>) -> Self {
        Self {
            ctx,
            reporter,
            phase: Arc::new(Mutex::new(Phase::Idle)),
        }
    }

    /// Current lifecycle phase. Observable from other threads.
    #[must_use]
    pub fn phase(&self) -> Phase {
        *self.phase.lock()
    }

    /// Binds the intake listener on `http-reporter.port + 1`, starts the
    /// intake loop and the reporting layer, then blocks until a cause
    /// arrives on `shutdown`. The first cause wins; the token is
    /// cancelled exactly once, by this thread.
    pub fn run(&self, shutdown: &Receiver<ShutdownCause>) -> Result<RunOutcome> {
        {
            let mut phase = self.phase.lock();
            if *phase != Phase::Idle {
                return Err(WatchdogError::Runtime {
                    details: "service lifecycle is single-use; construct a new Service".to_string(),
                });
            }
            *phase = Phase::Binding;
        }
        let addr = self.intake_addr()?;
        let listener = match TcpListener::bind(addr) {
            Ok(listener) => listener,
            Err(source) => {
                self.set_phase(Phase::Stopped);
                return Err(WatchdogError::Bind { addr, source });
            }
        };
        if let Err(source) = listener.set_nonblocking(true) {
            self.set_phase(Phase::Stopped);
            return Err(WatchdogError::Bind { addr, source });
        }

        let token = ShutdownToken::new();
        let (tx, rx) = bounded::<TcpStream>(INTAKE_QUEUE_DEPTH);

        let intake_handle = {
            let log = self.ctx.log.clone();
            let loop_token = token.clone();
            spawn_named("swd-intake", move || {
                intake::accept_loop(&log, &listener, &tx, &loop_token);
            })?
        };

        let reporter_handle = {
            let reporter = Arc::clone(&self.reporter);
            let ctx = self.ctx.clone();
            let run_token = token.clone();
            match spawn_named("swd-reporter", move || {
                reporter.run(&ctx, &rx, &run_token);
            }) {
                Ok(handle) => handle,
                Err(err) => {
                    token.cancel();
                    join_quietly(&self.ctx, "intake", intake_handle);
                    self.set_phase(Phase::Stopped);
                    return Err(err);
                }
            }
        };

        self.set_phase(Phase::Running);
        self.ctx.log.info(
            "service",
            &format!("accepting report connections on {addr}"),
        );

        let received = shutdown.recv();
        self.set_phase(Phase::ShuttingDown);
        token.cancel();
        join_quietly(&self.ctx, "intake", intake_handle);
        join_quietly(&self.ctx, "reporter", reporter_handle);
        self.set_phase(Phase::Stopped);

        match received {
            Ok(ShutdownCause::Interrupt) => {
                self.ctx.log.info("service", "stopped: operator interrupt");
                Ok(RunOutcome::Interrupted)
            }
            Ok(ShutdownCause::Terminate) => {
                self.ctx.log.info("service", "stopped: termination signal");
                Ok(RunOutcome::Terminated)
            }
            Err(_) => Err(WatchdogError::ChannelClosed {
                component: "shutdown",
            }),
        }
    }

    /// The raw intake listener lives one port above the reporting server.
    fn intake_addr(&self) -> Result<SocketAddr> {
        let reporter_port = self
            .ctx
            .instruction
            .config
            .http_reporter
            .port
            .ok_or_else(|| WatchdogError::InvalidConfig {
                details: "Missing port under http-reporter in config".to_string(),
            })?;
        let intake_port =
            reporter_port
                .checked_add(1)
                .ok_or_else(|| WatchdogError::InvalidConfig {
                    details: format!(
                        "http-reporter port {reporter_port} leaves no room for the intake listener"
                    ),
                })?;
        Ok(SocketAddr::from(([0, 0, 0, 0], intake_port)))
    }

    fn set_phase(&self, phase: Phase) {
        *self.phase.lock() = phase;
    }
}

fn spawn_named(
    name: &str,
    body: impl FnOnce() + Send + 'static,
) -> Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name(name.to_string())
        .spawn(body)
        .map_err(|err| WatchdogError::Runtime {
            details: format!("cannot spawn {name} thread: {err}"),
        })
}

fn join_quietly(ctx: &WatchContext, component: &str, handle: JoinHandle<()>) {
    if handle.join().is_err() {
        ctx.log.error(component, "thread panicked during shutdown");
    }
}

//! Service-lifecycle scenarios: bind conflicts, token-driven shutdown,
//! and the end-to-end report path.

mod common;

use std::io::Read as _;
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, bounded};
use shard_watchdog::daemon::WatchContext;
use shard_watchdog::daemon::service::{Phase, RunOutcome, Service};
use shard_watchdog::daemon::shutdown::{ShutdownCause, ShutdownToken};
use shard_watchdog::logger::EventLog;
use shard_watchdog::reporter::{Reporter, SummaryReporter};
use shard_watchdog::roster::build_instruction;

/// Reporting stand-in that only drains the intake queue.
struct DrainReporter {
    started: Arc<AtomicBool>,
}

impl Reporter for DrainReporter {
    fn run(&self, _ctx: &WatchContext, intake: &Receiver<TcpStream>, token: &ShutdownToken) {
        self.started.store(true, Ordering::SeqCst);
        loop {
            if token.is_cancelled() {
                break;
            }
            match intake.recv_timeout(Duration::from_millis(20)) {
                Ok(conn) => drop(conn),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }
}

fn free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("ephemeral bind");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    port
}

/// Two adjacent free ports (reporter, intake) for tests that bind both.
fn adjacent_free_ports() -> (u16, u16) {
    for _ in 0..64 {
        let lower = TcpListener::bind("127.0.0.1:0").expect("ephemeral bind");
        let port = lower.local_addr().expect("local addr").port();
        let Some(next) = port.checked_add(1) else {
            continue;
        };
        if let Ok(upper) = TcpListener::bind(("0.0.0.0", next)) {
            drop(upper);
            drop(lower);
            return (port, next);
        }
    }
    panic!("no adjacent free port pair found");
}

fn wait_until(what: &str, condition: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(10));
    }
}

/// Connects with retries; the reporter binds its listener on its own
/// thread, slightly after the lifecycle reports `Running`.
fn connect_with_retry(port: u16) -> TcpStream {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        match TcpStream::connect(("127.0.0.1", port)) {
            Ok(conn) => return conn,
            Err(err) => {
                assert!(
                    Instant::now() < deadline,
                    "timed out connecting to port {port}: {err}"
                );
                thread::sleep(Duration::from_millis(10));
            }
        }
    }
}

/// A context whose intake listener will land on `intake_port`.
fn context_for(intake_port: u16) -> WatchContext {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = common::config_with_files(&dir, &[("shard0.txt", &["10.0.0.1"])]);
    config.http_reporter.port = Some(intake_port - 1);
    let log = EventLog::stderr_only();
    let instruction = build_instruction(&log, config).expect("fixture roster builds");
    WatchContext::new(log, instruction)
}

fn wait_for_phase(service: &Service, phase: Phase) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while service.phase() != phase {
        assert!(
            Instant::now() < deadline,
            "timed out waiting for phase {phase:?}, currently {:?}",
            service.phase()
        );
        thread::sleep(Duration::from_millis(10));
    }
}

fn run_and_stop(cause: ShutdownCause) -> RunOutcome {
    let intake_port = free_port();
    let ctx = context_for(intake_port);
    let started = Arc::new(AtomicBool::new(false));
    let service = Arc::new(Service::new(
        ctx,
        Arc::new(DrainReporter {
            started: Arc::clone(&started),
        }),
    ));

    let (tx, rx) = bounded(1);
    let runner = Arc::clone(&service);
    let handle = thread::spawn(move || runner.run(&rx));

    wait_for_phase(&service, Phase::Running);
    wait_until("reporter start", || started.load(Ordering::SeqCst));

    // The intake listener is live: a client can connect and is drained.
    let conn = TcpStream::connect(("127.0.0.1", intake_port)).expect("intake accepts");
    drop(conn);

    tx.send(cause).expect("lifecycle is listening");
    let outcome = handle
        .join()
        .expect("service thread exits")
        .expect("clean shutdown");

    assert_eq!(service.phase(), Phase::Stopped);
    assert!(
        TcpStream::connect(("127.0.0.1", intake_port)).is_err(),
        "intake listener is closed after shutdown"
    );
    outcome
}

#[test]
fn interrupt_reports_the_operator_interrupted_outcome() {
    assert_eq!(run_and_stop(ShutdownCause::Interrupt), RunOutcome::Interrupted);
}

#[test]
fn terminate_reports_the_killed_outcome() {
    assert_eq!(run_and_stop(ShutdownCause::Terminate), RunOutcome::Terminated);
}

#[test]
fn occupied_port_fails_before_anything_starts() {
    let occupied = TcpListener::bind("0.0.0.0:0").expect("occupy a port");
    let intake_port = occupied.local_addr().expect("local addr").port();
    let ctx = context_for(intake_port);

    let started = Arc::new(AtomicBool::new(false));
    let service = Service::new(
        ctx,
        Arc::new(DrainReporter {
            started: Arc::clone(&started),
        }),
    );

    let (_tx, rx) = bounded::<ShutdownCause>(1);
    let err = service.run(&rx).expect_err("bind conflict is fatal");
    assert_eq!(err.code(), "SWD-3001");
    assert_eq!(service.phase(), Phase::Stopped);
    assert!(
        !started.load(Ordering::SeqCst),
        "reporter must not start on bind failure"
    );
}

#[test]
fn a_service_instance_is_single_use() {
    let intake_port = free_port();
    let ctx = context_for(intake_port);
    let service = Arc::new(Service::new(
        ctx,
        Arc::new(DrainReporter {
            started: Arc::new(AtomicBool::new(false)),
        }),
    ));

    let (tx, rx) = bounded(1);
    let runner = Arc::clone(&service);
    let handle = thread::spawn(move || runner.run(&rx));
    wait_for_phase(&service, Phase::Running);
    tx.send(ShutdownCause::Interrupt).expect("lifecycle is listening");
    handle
        .join()
        .expect("service thread exits")
        .expect("clean shutdown");

    let (_tx2, rx2) = bounded::<ShutdownCause>(1);
    let err = service.run(&rx2).expect_err("second run is rejected");
    assert_eq!(err.code(), "SWD-3900");
}

#[test]
fn summary_reporter_answers_intake_connections() {
    let (reporter_port, intake_port) = adjacent_free_ports();
    let ctx = context_for(intake_port);
    assert_eq!(
        ctx.instruction.config.http_reporter.port,
        Some(reporter_port)
    );
    let service = Arc::new(Service::new(ctx, Arc::new(SummaryReporter)));

    let (tx, rx) = bounded(1);
    let runner = Arc::clone(&service);
    let handle = thread::spawn(move || runner.run(&rx));
    wait_for_phase(&service, Phase::Running);

    let mut conn = TcpStream::connect(("127.0.0.1", intake_port)).expect("intake accepts");
    conn.set_read_timeout(Some(Duration::from_secs(5)))
        .expect("read timeout");
    let mut response = String::new();
    conn.read_to_string(&mut response).expect("read response");
    assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");
    assert!(response.contains("10.0.0.1:9500"), "{response}");
    assert!(response.contains("\"node-count\":1"), "{response}");
    drop(conn);

    // The reporter's own HTTP port serves the same summary.
    let mut conn = connect_with_retry(reporter_port);
    conn.set_read_timeout(Some(Duration::from_secs(5)))
        .expect("read timeout");
    let mut response = String::new();
    conn.read_to_string(&mut response).expect("read response");
    assert!(response.contains("\"target-chain\":\"mainnet\""), "{response}");
    drop(conn);

    tx.send(ShutdownCause::Interrupt).expect("lifecycle is listening");
    let outcome = handle
        .join()
        .expect("service thread exits")
        .expect("clean shutdown");
    assert_eq!(outcome, RunOutcome::Interrupted);
}

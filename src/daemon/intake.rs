//! Connection intake: accepts inbound report connections and hands each
//! one to the reporting layer over a bounded queue, in acceptance order.

use std::io;
use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use crossbeam_channel::Sender;

use crate::daemon::shutdown::ShutdownToken;
use crate::logger::EventLog;

/// Hand-off queue depth. A full queue blocks the send and therefore
/// throttles acceptance; connections are never dropped.
pub const INTAKE_QUEUE_DEPTH: usize = 100;

/// How often the loop re-checks the token while no connection is pending.
const ACCEPT_POLL: Duration = Duration::from_millis(50);

/// Accept loop over a listener in non-blocking mode.
///
/// Runs until the token is cancelled or the reporting layer drops its
/// receiver. Accept failures other than `WouldBlock` are treated as
/// transient and retried; each one is recorded as a debug event so a
/// persistent fault is at least greppable.
pub fn accept_loop(
    log: &EventLog,
    listener: &TcpListener,
    queue: &Sender<TcpStream>,
    token: &ShutdownToken,
) {
    loop {
        if token.is_cancelled() {
            log.info("intake", "shutdown token cancelled; stopping intake");
            break;
        }
        match listener.accept() {
            Ok((conn, peer)) => {
                // The listener is non-blocking; accepted sockets must not
                // inherit that mode or the reporter's reads would spin.
                if let Err(err) = conn.set_nonblocking(false) {
                    log.debug("intake", &format!("cannot reset socket mode: {err}"));
                }
                log.debug("intake", &format!("accepted report connection from {peer}"));
                if queue.send(conn).is_err() {
                    log.warn("intake", "report queue closed; stopping intake");
                    break;
                }
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(ACCEPT_POLL);
            }
            Err(err) => {
                log.debug("intake", &format!("transient accept failure: {err}"));
            }
        }
    }
}

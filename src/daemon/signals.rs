//! OS signal subscription: forwards the first interrupt or termination
//! signal as a [`ShutdownCause`].
//!
//! Business logic never sees a signal. The watcher thread translates the
//! OS event into a cause on a channel, and the service lifecycle owns the
//! actual cancellation; tests feed the same channel directly.

use crossbeam_channel::{Receiver, bounded};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;

use crate::core::errors::{Result, WatchdogError};
use crate::daemon::shutdown::ShutdownCause;

/// Registers SIGINT and SIGTERM handlers and returns the channel the
/// first received signal arrives on. The watcher thread exits after
/// forwarding once.
pub fn subscribe() -> Result<Receiver<ShutdownCause>> {
    let mut signals = Signals::new([SIGINT, SIGTERM]).map_err(|err| WatchdogError::Runtime {
        details: format!("signal subscription failed: {err}"),
    })?;
    let (tx, rx) = bounded(1);
    std::thread::Builder::new()
        .name("swd-signals".to_string())
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                let _ = tx.send(cause_for(signal));
            }
        })
        .map_err(|err| WatchdogError::Runtime {
            details: format!("cannot spawn signal watcher: {err}"),
        })?;
    Ok(rx)
}

const fn cause_for(signal: i32) -> ShutdownCause {
    if signal == SIGINT {
        ShutdownCause::Interrupt
    } else {
        ShutdownCause::Terminate
    }
}

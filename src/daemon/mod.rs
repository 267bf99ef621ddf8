//! Daemon subsystem: service lifecycle, connection intake, shutdown
//! token, signal handling.

pub mod intake;
pub mod service;
pub mod shutdown;

#[cfg(feature = "daemon")]
pub mod signals;

use std::sync::Arc;

use crate::logger::EventLog;
use crate::roster::Instruction;

/// Everything the running daemon shares: the event log and the read-only
/// monitoring instruction. Passed explicitly to each component; there are
/// no process-wide singletons.
#[derive(Debug, Clone)]
pub struct WatchContext {
    pub log: EventLog,
    pub instruction: Arc<Instruction>,
}

impl WatchContext {
    #[must_use]
    pub fn new(log: EventLog, instruction: Instruction) -> Self {
        Self {
            log,
            instruction: Arc::new(instruction),
        }
    }
}

//! Explicit cancellation shared by the daemon's concurrent activities.

#![allow(missing_docs)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Why the daemon is being asked to stop. Both causes produce identical
/// shutdown behavior; they differ only in the reported outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownCause {
    /// Operator interrupt (SIGINT / Ctrl-C).
    Interrupt,
    /// Termination request (SIGTERM).
    Terminate,
}

/// Cooperative shutdown flag shared by the lifecycle, the intake loop,
/// and the reporting layer. Cancellation is one-way and idempotent.
#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    cancelled: Arc<AtomicBool>,
}

impl ShutdownToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

//! JSONL event sink: append-only structured records, mirrored to stderr.
//!
//! There is no process-wide logger. An [`EventLog`] handle is constructed
//! once at startup and passed explicitly to every component that emits
//! events. When the log file cannot be opened or a write fails, the sink
//! degrades to stderr-only rather than taking the daemon down.

#![allow(missing_docs)]

use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::Serialize;

/// Event severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Serialize)]
struct Record<'a> {
    ts: String,
    level: Level,
    component: &'a str,
    message: &'a str,
}

/// Cheap-to-clone logging handle; clones share one sink.
#[derive(Debug, Clone)]
pub struct EventLog {
    file: Arc<Mutex<Option<File>>>,
    echo_stderr: bool,
}

impl EventLog {
    /// Log to stderr only. The default for `swd check` and for tests.
    #[must_use]
    pub fn stderr_only() -> Self {
        Self {
            file: Arc::new(Mutex::new(None)),
            echo_stderr: true,
        }
    }

    /// Append JSONL records to `path`, mirroring each record to stderr.
    /// Falls back to stderr-only when the file cannot be opened.
    #[must_use]
    pub fn to_file(path: &Path) -> Self {
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => Self {
                file: Arc::new(Mutex::new(Some(file))),
                echo_stderr: true,
            },
            Err(err) => {
                let log = Self::stderr_only();
                log.warn(
                    "logger",
                    &format!(
                        "cannot open {}: {err}; logging to stderr only",
                        path.display()
                    ),
                );
                log
            }
        }
    }

    pub fn debug(&self, component: &str, message: &str) {
        self.emit(Level::Debug, component, message);
    }

    pub fn info(&self, component: &str, message: &str) {
        self.emit(Level::Info, component, message);
    }

    pub fn warn(&self, component: &str, message: &str) {
        self.emit(Level::Warn, component, message);
    }

    pub fn error(&self, component: &str, message: &str) {
        self.emit(Level::Error, component, message);
    }

    fn emit(&self, level: Level, component: &str, message: &str) {
        let record = Record {
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            level,
            component,
            message,
        };
        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };
        let mut guard = self.file.lock();
        if let Some(file) = guard.as_mut() {
            if writeln!(file, "{line}").is_err() {
                // Degrade once; subsequent events go to stderr only.
                *guard = None;
            }
        }
        drop(guard);
        if self.echo_stderr {
            eprintln!("{line}");
        }
    }
}

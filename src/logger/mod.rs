//! Structured event logging: JSONL append-only with stderr mirroring and
//! graceful degradation.

pub mod jsonl;

pub use jsonl::{EventLog, Level};

//! Shard watchdog: supervises the node committees of a sharded blockchain
//! network.
//!
//! The crate loads an operator-authored configuration, validates it,
//! assembles the per-shard committee roster from distribution files, and
//! runs a long-lived service that accepts report connections until an
//! interrupt or termination signal arrives.

pub mod core;
pub mod daemon;
pub mod logger;
pub mod reporter;
pub mod roster;

#[cfg(feature = "cli")]
pub mod cli_app;

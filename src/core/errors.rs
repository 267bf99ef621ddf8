//! SWD-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, WatchdogError>;

/// Top-level error type for the shard watchdog.
///
/// Every variant that can surface during startup is terminal: the daemon
/// never starts with a partial configuration or a partial roster.
#[derive(Debug, Error)]
pub enum WatchdogError {
    #[error("[SWD-1001] invalid configuration:\n{details}")]
    InvalidConfig { details: String },

    #[error("[SWD-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[SWD-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[SWD-2001] malformed shard id in {path}: {details}")]
    MalformedShardId { path: PathBuf, details: String },

    #[error("[SWD-2002] shard id {id} derived from both {first} and {second}")]
    ShardIdCollision {
        id: u32,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("[SWD-2003] distribution file scan failure for {path}: {source}")]
    RosterScan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[SWD-2004] duplicate node membership across committees:\n{}", records.join("\n"))]
    DuplicateMembership { records: Vec<String> },

    #[error("[SWD-2005] empty roster: the distribution files yield no nodes to monitor")]
    EmptyRoster,

    #[error("[SWD-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[SWD-3001] cannot bind report listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("[SWD-3002] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[SWD-3003] channel closed in component {component}")]
    ChannelClosed { component: &'static str },

    #[error("[SWD-3900] runtime failure: {details}")]
    Runtime { details: String },
}

impl WatchdogError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "SWD-1001",
            Self::MissingConfig { .. } => "SWD-1002",
            Self::ConfigParse { .. } => "SWD-1003",
            Self::MalformedShardId { .. } => "SWD-2001",
            Self::ShardIdCollision { .. } => "SWD-2002",
            Self::RosterScan { .. } => "SWD-2003",
            Self::DuplicateMembership { .. } => "SWD-2004",
            Self::EmptyRoster => "SWD-2005",
            Self::Serialization { .. } => "SWD-2101",
            Self::Bind { .. } => "SWD-3001",
            Self::Io { .. } => "SWD-3002",
            Self::ChannelClosed { .. } => "SWD-3003",
            Self::Runtime { .. } => "SWD-3900",
        }
    }

    /// Whether the failure is tied to operator input (config or
    /// distribution files) rather than the runtime environment.
    #[must_use]
    pub const fn is_operator_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfig { .. }
                | Self::MissingConfig { .. }
                | Self::ConfigParse { .. }
                | Self::MalformedShardId { .. }
                | Self::ShardIdCollision { .. }
                | Self::RosterScan { .. }
                | Self::DuplicateMembership { .. }
                | Self::EmptyRoster
        )
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<toml::de::Error> for WatchdogError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}

impl From<serde_json::Error> for WatchdogError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

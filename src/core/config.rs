//! Operator configuration model: strict TOML document mirroring the
//! watchdog's config sections.
//!
//! Required numeric fields deserialize as `Option` so an absent key is
//! distinguishable from a written zero; both are rejected by
//! [`crate::core::validate`], with distinct messages. Unknown keys
//! anywhere in the document are a load-time error.

#![allow(missing_docs)]

use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::errors::{Result, WatchdogError};

/// Root of the operator's configuration document. Immutable after load.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", default)]
pub struct Config {
    pub auth: Auth,
    pub network_config: Network,
    pub inspect_schedule: InspectSchedule,
    pub performance: Performance,
    pub http_reporter: HttpReporter,
    pub shard_health_reporting: ShardHealthReporting,
    pub node_distribution: NodeDistribution,
}

/// Credentials consumed by the alerting collaborator; carried as data only.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", default)]
pub struct Auth {
    pub pagerduty: PagerDuty,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", default)]
pub struct PagerDuty {
    pub event_service_key: String,
}

/// Target chain and the public RPC port joined to each roster hostname.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", default)]
pub struct Network {
    pub target_chain: String,
    pub public_rpc: Option<u16>,
}

/// Health-inspection intervals, in seconds.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", default)]
pub struct InspectSchedule {
    pub block_header: Option<u64>,
    pub node_metadata: Option<u64>,
    pub cx_pending: Option<u64>,
    pub cross_link: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", default)]
pub struct Performance {
    pub num_workers: Option<u64>,
    pub http_timeout: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", default)]
pub struct HttpReporter {
    pub port: Option<u16>,
}

/// Per-metric warning thresholds consumed by the alerting collaborator.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", default)]
pub struct ShardHealthReporting {
    pub consensus: Consensus,
    pub cx_pending: CxPending,
    pub cross_link: CrossLink,
    pub shard_height: ShardHeight,
    pub connectivity: Connectivity,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", default)]
pub struct Consensus {
    pub interval: Option<u64>,
    pub warning: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", default)]
pub struct CxPending {
    pub pending_limit: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", default)]
pub struct CrossLink {
    pub warning: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", default)]
pub struct ShardHeight {
    pub tolerance: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", default)]
pub struct Connectivity {
    pub tolerance: Option<u64>,
}

/// One distribution file per shard, each listing bare hostnames.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case", default)]
pub struct NodeDistribution {
    pub machine_ip_list: Vec<PathBuf>,
}

impl Config {
    /// Reads and strict-parses the configuration document at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                WatchdogError::MissingConfig {
                    path: path.to_path_buf(),
                }
            } else {
                WatchdogError::io(path, err)
            }
        })?;
        let config = toml::from_str(&raw)?;
        Ok(config)
    }

    /// Annotated sample document for `swd sample-config`.
    #[must_use]
    pub const fn sample() -> &'static str {
        SAMPLE
    }
}

const SAMPLE: &str = r#"# Sample shard watchdog configuration.
# Every key shown here is required unless noted; unknown keys are rejected.

[auth.pagerduty]
# Consumed by the alerting integration; may be left empty when unused.
event-service-key = ""

[network-config]
target-chain = "mainnet"
# Port joined to every hostname in the distribution files.
public-rpc = 9500

[inspect-schedule]
# Seconds between inspections of each metric.
block-header = 15
node-metadata = 30
cx-pending = 30
cross-link = 60

[performance]
num-workers = 32
http-timeout = 10

[http-reporter]
# The watchdog also listens on port + 1 for raw report connections.
port = 8080

[shard-health-reporting.consensus]
interval = 10
warning = 60

[shard-health-reporting.cx-pending]
pending-limit = 100

[shard-health-reporting.cross-link]
warning = 300

[shard-health-reporting.shard-height]
tolerance = 10

[shard-health-reporting.connectivity]
tolerance = 5

[node-distribution]
# One file per shard; the file stem's final character is the shard id.
machine-ip-list = ["nodes/shard0.txt", "nodes/shard1.txt"]
"#;

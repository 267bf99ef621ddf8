//! Configuration sanity checking.
//!
//! Collects every missing or invalid field and every nonexistent
//! distribution file into one ordered report, so the operator sees all
//! problems in a single run instead of one per restart.

use crate::core::config::Config;
use crate::core::errors::{Result, WatchdogError};

/// Validates `config`, aggregating all failures into one
/// [`WatchdogError::InvalidConfig`].
pub fn validate(config: &Config) -> Result<()> {
    let failures = collect_failures(config);
    if failures.is_empty() {
        Ok(())
    } else {
        Err(WatchdogError::InvalidConfig {
            details: failures.join("\n"),
        })
    }
}

/// The ordered failure list backing [`validate`]. Exposed so callers can
/// render partial diagnostics (e.g. `swd check`) without string-splitting
/// the error.
#[must_use]
pub fn collect_failures(config: &Config) -> Vec<String> {
    let mut failures = Vec::new();

    require(
        &mut failures,
        config.network_config.public_rpc.map(u64::from),
        "public-rpc",
        "network-config",
    );
    require(
        &mut failures,
        config.inspect_schedule.block_header,
        "block-header",
        "inspect-schedule",
    );
    require(
        &mut failures,
        config.inspect_schedule.node_metadata,
        "node-metadata",
        "inspect-schedule",
    );
    require(
        &mut failures,
        config.inspect_schedule.cx_pending,
        "cx-pending",
        "inspect-schedule",
    );
    require(
        &mut failures,
        config.inspect_schedule.cross_link,
        "cross-link",
        "inspect-schedule",
    );
    require(
        &mut failures,
        config.performance.num_workers,
        "num-workers",
        "performance",
    );
    require(
        &mut failures,
        config.performance.http_timeout,
        "http-timeout",
        "performance",
    );
    require(
        &mut failures,
        config.http_reporter.port.map(u64::from),
        "port",
        "http-reporter",
    );
    require(
        &mut failures,
        config.shard_health_reporting.consensus.interval,
        "interval",
        "shard-health-reporting.consensus",
    );
    require(
        &mut failures,
        config.shard_health_reporting.consensus.warning,
        "warning",
        "shard-health-reporting.consensus",
    );
    require(
        &mut failures,
        config.shard_health_reporting.cx_pending.pending_limit,
        "pending-limit",
        "shard-health-reporting.cx-pending",
    );
    require(
        &mut failures,
        config.shard_health_reporting.cross_link.warning,
        "warning",
        "shard-health-reporting.cross-link",
    );
    require(
        &mut failures,
        config.shard_health_reporting.shard_height.tolerance,
        "tolerance",
        "shard-health-reporting.shard-height",
    );
    require(
        &mut failures,
        config.shard_health_reporting.connectivity.tolerance,
        "tolerance",
        "shard-health-reporting.connectivity",
    );

    for file in &config.node_distribution.machine_ip_list {
        if !file.exists() {
            failures.push(format!("File not found: {}", file.display()));
        }
    }

    failures
}

fn require(failures: &mut Vec<String>, value: Option<u64>, key: &str, section: &str) {
    match value {
        None => failures.push(format!("Missing {key} under {section} in config")),
        Some(0) => failures.push(format!(
            "Zero is not a valid {key} under {section} in config"
        )),
        Some(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::{collect_failures, validate};
    use crate::core::config::Config;
    use std::io::Write as _;

    fn filled_config() -> Config {
        let mut config = Config::default();
        config.network_config.public_rpc = Some(9500);
        config.inspect_schedule.block_header = Some(15);
        config.inspect_schedule.node_metadata = Some(30);
        config.inspect_schedule.cx_pending = Some(30);
        config.inspect_schedule.cross_link = Some(60);
        config.performance.num_workers = Some(32);
        config.performance.http_timeout = Some(10);
        config.http_reporter.port = Some(8080);
        config.shard_health_reporting.consensus.interval = Some(10);
        config.shard_health_reporting.consensus.warning = Some(60);
        config.shard_health_reporting.cx_pending.pending_limit = Some(100);
        config.shard_health_reporting.cross_link.warning = Some(300);
        config.shard_health_reporting.shard_height.tolerance = Some(10);
        config.shard_health_reporting.connectivity.tolerance = Some(5);
        config
    }

    #[test]
    fn filled_config_passes() {
        validate(&filled_config()).expect("fully populated config is valid");
    }

    #[test]
    fn empty_config_reports_every_required_field() {
        let failures = collect_failures(&Config::default());
        assert_eq!(failures.len(), 14, "one entry per required field: {failures:?}");
        assert!(failures.iter().any(|f| f.contains("public-rpc")));
        assert!(failures.iter().any(|f| f.contains("block-header")));
        assert!(
            failures
                .iter()
                .any(|f| f.contains("pending-limit") && f.contains("cx-pending"))
        );
        assert!(
            failures
                .iter()
                .any(|f| f.contains("tolerance") && f.contains("connectivity"))
        );
    }

    #[test]
    fn one_missing_field_is_not_suppressed_by_others() {
        let mut config = filled_config();
        config.performance.http_timeout = None;
        let failures = collect_failures(&config);
        assert_eq!(
            failures,
            vec!["Missing http-timeout under performance in config".to_string()]
        );
    }

    #[test]
    fn zero_and_absent_produce_distinct_messages() {
        let mut config = filled_config();
        config.performance.num_workers = Some(0);
        config.performance.http_timeout = None;
        let failures = collect_failures(&config);
        assert!(
            failures
                .iter()
                .any(|f| f == "Zero is not a valid num-workers under performance in config")
        );
        assert!(
            failures
                .iter()
                .any(|f| f == "Missing http-timeout under performance in config")
        );
    }

    #[test]
    fn missing_distribution_file_is_reported_by_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let present = dir.path().join("shard0.txt");
        let mut file = std::fs::File::create(&present).expect("fixture file");
        writeln!(file, "10.0.0.1").expect("write fixture");
        let absent = dir.path().join("shard1.txt");

        let mut config = filled_config();
        config.node_distribution.machine_ip_list = vec![present, absent.clone()];
        let failures = collect_failures(&config);
        assert_eq!(
            failures,
            vec![format!("File not found: {}", absent.display())]
        );
    }
}

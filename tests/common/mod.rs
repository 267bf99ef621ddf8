//! Shared fixtures: fully populated configs and on-disk distribution files.

#![allow(dead_code)] // each integration suite uses its own subset

use std::fs;
use std::path::{Path, PathBuf};

use shard_watchdog::core::config::Config;
use tempfile::TempDir;

/// A config with every required field populated and no distribution
/// files; tests add their own.
pub fn filled_config() -> Config {
    let mut config = Config::default();
    config.network_config.target_chain = "mainnet".to_string();
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

/// Writes one distribution file, one host per line.
pub fn write_distribution(dir: &Path, name: &str, hosts: &[&str]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, hosts.join("\n")).expect("write distribution file");
    path
}

/// A filled config whose distribution list points at freshly written
/// files inside `dir`.
pub fn config_with_files(dir: &TempDir, files: &[(&str, &[&str])]) -> Config {
    let mut config = filled_config();
    config.node_distribution.machine_ip_list = files
        .iter()
        .map(|(name, hosts)| write_distribution(dir.path(), name, hosts))
        .collect();
    config
}

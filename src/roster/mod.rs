//! Roster assembly: turns per-shard distribution files into a validated,
//! deduplicated committee map.
//!
//! Shard ids are encoded as the final character of each distribution
//! file's stem (a single decimal digit). Every construction failure is
//! terminal; a partial roster is never accepted.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead as _, BufReader};
use std::path::{Path, PathBuf};

use crate::core::config::Config;
use crate::core::errors::{Result, WatchdogError};
use crate::logger::EventLog;

/// Node addresses belonging to one shard, plus the file they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committee {
    pub source_file: PathBuf,
    pub members: Vec<String>,
}

/// The complete monitoring order: operator configuration plus the
/// committee map. Built once at startup; read-only for the rest of the
/// process lifetime. Rebuilding requires a restart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub config: Config,
    pub committees: BTreeMap<u32, Committee>,
}

impl Instruction {
    /// Total number of monitored nodes across all committees.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.committees.values().map(|c| c.members.len()).sum()
    }
}

/// Builds the [`Instruction`] for a validated configuration.
///
/// Fails on an unreadable or unnameable distribution file, on two files
/// mapping to the same shard id, on any address appearing in more than
/// one committee, and on an aggregate roster with no nodes at all.
pub fn build_instruction(log: &EventLog, config: Config) -> Result<Instruction> {
    let rpc_port = config
        .network_config
        .public_rpc
        .ok_or_else(|| WatchdogError::InvalidConfig {
            details: "Missing public-rpc under network-config in config".to_string(),
        })?;

    let mut committees = BTreeMap::new();
    for file in &config.node_distribution.machine_ip_list {
        let id = shard_id(file)?;
        let members = scan_members(file, rpc_port)?;
        let committee = Committee {
            source_file: file.clone(),
            members,
        };
        if let Some(previous) = committees.insert(id, committee) {
            return Err(WatchdogError::ShardIdCollision {
                id,
                first: previous.source_file,
                second: file.clone(),
            });
        }
    }

    let duplicates = duplicate_records(&committees);
    if !duplicates.is_empty() {
        return Err(WatchdogError::DuplicateMembership {
            records: duplicates,
        });
    }

    let instruction = Instruction { config, committees };
    if instruction.node_count() == 0 {
        return Err(WatchdogError::EmptyRoster);
    }

    log.info(
        "roster",
        &format!(
            "assembled {} committees covering {} nodes",
            instruction.committees.len(),
            instruction.node_count()
        ),
    );
    Ok(instruction)
}

/// Shard id convention: the file stem's final character, as a decimal
/// digit. Operators must name distribution files accordingly.
fn shard_id(path: &Path) -> Result<u32> {
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();
    stem.chars()
        .last()
        .and_then(|last| last.to_digit(10))
        .ok_or_else(|| WatchdogError::MalformedShardId {
            path: path.to_path_buf(),
            details: format!("file stem {stem:?} must end in a decimal shard digit"),
        })
}

/// Line-scans one distribution file. Each non-empty line is a bare host,
/// joined with the configured public RPC port.
fn scan_members(path: &Path, rpc_port: u16) -> Result<Vec<String>> {
    let file = File::open(path).map_err(|source| WatchdogError::RosterScan {
        path: path.to_path_buf(),
        source,
    })?;
    let mut members = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|source| WatchdogError::RosterScan {
            path: path.to_path_buf(),
            source,
        })?;
        let host = line.trim();
        if host.is_empty() {
            continue;
        }
        members.push(format!("{host}:{rpc_port}"));
    }
    Ok(members)
}

/// Cross-committee duplicate index. Each collision contributes two
/// records, `"<shard-id>: <address>"`, one for the colliding shard and
/// one for the shard that owned the address first.
fn duplicate_records(committees: &BTreeMap<u32, Committee>) -> Vec<String> {
    let mut owners: BTreeMap<&str, u32> = BTreeMap::new();
    let mut records = Vec::new();
    for (&id, committee) in committees {
        for member in &committee.members {
            if let Some(&first) = owners.get(member.as_str()) {
                records.push(format!("{id}: {member}"));
                records.push(format!("{first}: {member}"));
            } else {
                owners.insert(member, id);
            }
        }
    }
    records
}

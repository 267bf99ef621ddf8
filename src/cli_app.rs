//! Top-level CLI definition and dispatch.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{CommandFactory as _, Parser, Subcommand};
use clap_complete::Shell;

use crate::core::config::Config;
use crate::core::errors::Result;
use crate::core::validate;
use crate::daemon::WatchContext;
use crate::daemon::service::{RunOutcome, Service};
use crate::daemon::signals;
use crate::logger::EventLog;
use crate::reporter::SummaryReporter;
use crate::roster;

/// Shard watchdog — supervises the node committees of a sharded blockchain network.
#[derive(Parser)]
#[command(name = "swd", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Validate the config, assemble the roster, and run the watchdog in the foreground.
    Monitor {
        /// Path to the operator configuration document.
        #[arg(long)]
        config: PathBuf,
        /// Append structured JSONL events to this file in addition to stderr.
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
    /// Validate the config and print the assembled committees, then exit.
    Check {
        /// Path to the operator configuration document.
        #[arg(long)]
        config: PathBuf,
    },
    /// Print an annotated sample configuration document.
    SampleConfig,
    /// Generate shell completion scripts.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Exit status after an operator interrupt (128 + SIGINT).
pub const EXIT_INTERRUPTED: i32 = 130;
/// Exit status after a termination signal (128 + SIGTERM).
pub const EXIT_TERMINATED: i32 = 143;

/// Dispatch CLI commands. Returns the process exit code.
pub fn run(cli: &Cli) -> Result<i32> {
    match &cli.command {
        Command::Monitor { config, log_file } => monitor(config, log_file.as_deref()),
        Command::Check { config } => check(config),
        Command::SampleConfig => {
            print!("{}", Config::sample());
            Ok(0)
        }
        Command::Completions { shell } => {
            clap_complete::generate(*shell, &mut Cli::command(), "swd", &mut std::io::stdout());
            Ok(0)
        }
    }
}

fn monitor(config_path: &Path, log_file: Option<&Path>) -> Result<i32> {
    let log = log_file.map_or_else(EventLog::stderr_only, EventLog::to_file);
    let config = Config::load(config_path)?;
    validate::validate(&config)?;
    let instruction = roster::build_instruction(&log, config)?;
    let ctx = WatchContext::new(log, instruction);
    let service = Service::new(ctx, Arc::new(SummaryReporter));
    let shutdown = signals::subscribe()?;
    Ok(match service.run(&shutdown)? {
        RunOutcome::Interrupted => EXIT_INTERRUPTED,
        RunOutcome::Terminated => EXIT_TERMINATED,
    })
}

fn check(config_path: &Path) -> Result<i32> {
    let log = EventLog::stderr_only();
    let config = Config::load(config_path)?;
    validate::validate(&config)?;
    let instruction = roster::build_instruction(&log, config)?;
    for (id, committee) in &instruction.committees {
        println!(
            "shard {id} ({}): {} nodes",
            committee.source_file.display(),
            committee.members.len()
        );
        for member in &committee.members {
            println!("  {member}");
        }
    }
    Ok(0)
}

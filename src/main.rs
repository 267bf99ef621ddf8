//! Binary entry point for the `swd` watchdog.

use clap::Parser as _;
use colored::Colorize as _;
use shard_watchdog::cli_app::{self, Cli};

fn main() {
    let cli = Cli::parse();
    match cli_app::run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{} {err}", "swd:".red().bold());
            std::process::exit(1);
        }
    }
}

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::cli::{completions, list, run};

#[derive(Debug, Parser)]
#[command(
    name = "clipkeep",
    version = env!("CARGO_PKG_VERSION"),
    about = "Archive motion-triggered camera clips before the service expires them",
    long_about = None,
    propagate_version = true
)]
pub struct App {
    #[command(subcommand)]
    pub cmd: Commands,

    /// Configuration file (JSON or TOML)
    #[arg(short, long, global = true, default_value = "config.json")]
    pub config: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(alias = "r", name = "run", about = "Archive every recorded segment up to the threshold")]
    Run(run::RunArg),
    #[command(alias = "ls", name = "list", about = "List recorded segments without creating clips")]
    List(list::ListArg),
    #[command(name = "completions", about = "Print shell completions")]
    Completions(completions::CompletionsArg),
}

/// Flags that override the configuration file and environment.
#[derive(Debug, Clone, Default, Args, Serialize)]
pub struct Overrides {
    /// Only consider segments ending before this unix timestamp
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<i64>,

    /// Directory receiving downloaded clips
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Seconds to wait between clip status checks
    #[arg(long = "poll-interval")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_interval_secs: Option<u64>,

    /// Status checks per clip before giving up
    #[arg(long = "max-polls")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_poll_attempts: Option<u32>,
}

impl App {
    pub fn run(self) -> Result<ExitCode> {
        match self.cmd {
            Commands::Run(arg) => arg.run(&self.config),
            Commands::List(arg) => arg.run(&self.config),
            Commands::Completions(arg) => arg.run().map(|()| ExitCode::SUCCESS),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_is_well_formed() {
        App::command().debug_assert();
    }

    #[test]
    fn run_accepts_overrides() {
        let app = App::try_parse_from([
            "clipkeep",
            "run",
            "--threshold",
            "1651804500",
            "--poll-interval",
            "5",
            "--max-polls",
            "12",
            "--config",
            "nest.toml",
        ])
        .unwrap();

        assert_eq!(app.config, PathBuf::from("nest.toml"));
        match app.cmd {
            Commands::Run(arg) => {
                assert_eq!(arg.overrides.threshold, Some(1651804500));
                assert_eq!(arg.overrides.poll_interval_secs, Some(5));
                assert_eq!(arg.overrides.max_poll_attempts, Some(12));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}

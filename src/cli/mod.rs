//! Command-line interface definitions.

pub mod check;
pub mod output;
pub mod run;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Swarmwatch - React to container lifecycle events with typed handlers.
#[derive(Parser, Debug)]
#[command(name = "swarmwatch")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch the engine event stream (foreground)
    Run(RunArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `swarmwatch check`
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate configuration file
    Config(ConfigPathArg),
}

/// Shared argument for commands that only need a config path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Override log level (debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty
    #[arg(long)]
    pub json_logs: bool,

    /// Read newline-delimited JSON events from stdin instead of the engine
    #[arg(long)]
    pub stdin: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_overrides() {
        let cli = Cli::parse_from([
            "swarmwatch",
            "run",
            "-c",
            "watch.toml",
            "--log-level",
            "debug",
            "--json-logs",
            "--stdin",
        ]);
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.config, PathBuf::from("watch.toml"));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert!(args.json_logs);
        assert!(args.stdin);
    }

    #[test]
    fn check_config_defaults_path() {
        let cli = Cli::parse_from(["swarmwatch", "check", "config"]);
        let Commands::Check(CheckCommand::Config(arg)) = cli.command else {
            panic!("expected check config");
        };
        assert_eq!(arg.config, PathBuf::from("config.toml"));
    }
}

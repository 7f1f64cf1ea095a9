// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Running `flowdeploy` with no arguments performs the full deployment.
//! Everything here is optional on top of that.

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `flowdeploy`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "flowdeploy",
    version,
    about = "Provision a worker pool, start a worker and register workflow deployments.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the settings file (TOML).
    ///
    /// Default: `Flowdeploy.toml` in the project root, if it exists.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `FLOWDEPLOY_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Resolve settings and print the planned commands, but don't contact the
    /// control plane or run anything.
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Option<CliCommandKind>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum CliCommandKind {
    /// Run the deployment sequence (the default).
    Deploy,
    /// Start the control-plane server in the foreground.
    Server,
    /// Run a worker for the configured pool, attached to this terminal.
    Worker,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

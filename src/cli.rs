// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `watchpoint`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "watchpoint",
    version,
    about = "Run a command whenever a watched condition holds.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the watch file (TOML).
    ///
    /// Default: `Watchpoint.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Watchpoint.toml")]
    pub config: String,

    /// Stop after the first successful run of the action.
    #[arg(long)]
    pub once: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `WATCHPOINT_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the watch, but don't start monitoring.
    #[arg(long)]
    pub dry_run: bool,
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

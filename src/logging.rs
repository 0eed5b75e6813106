// src/logging.rs

//! Logging setup for `watchpoint` using `tracing` + `tracing-subscriber`.
//!
//! The level comes from `--log-level`, else `WATCHPOINT_LOG`, else `info`.
//! An unrecognised `WATCHPOINT_LOG` value is reported once the subscriber is
//! up, instead of being dropped silently.
//!
//! Logs go to stderr; stdout belongs to the action.

use anyhow::{anyhow, Result};
use tracing::{warn, Level};
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Environment variable consulted when `--log-level` is not given.
pub const LOG_ENV: &str = "WATCHPOINT_LOG";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_value = std::env::var(LOG_ENV).ok();
    let (level, rejected) = resolve_level(cli_level, env_value.as_deref());

    // Thread names identify which monitor's worker logged a line.
    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install log subscriber: {e}"))?;

    if let Some(value) = rejected {
        warn!(%value, fallback = %level, "ignoring unrecognised {LOG_ENV}");
    }
    Ok(())
}

/// Pick the effective level.
///
/// Returns the environment value as well when it was set but could not be
/// parsed. A blank value counts as unset.
pub fn resolve_level(
    cli_level: Option<LogLevel>,
    env_value: Option<&str>,
) -> (Level, Option<String>) {
    if let Some(lvl) = cli_level {
        return (level_from_log_level(lvl), None);
    }
    match env_value.map(str::trim).filter(|s| !s.is_empty()) {
        None => (Level::INFO, None),
        Some(raw) => match parse_level_str(raw) {
            Some(level) => (level, None),
            None => (Level::INFO, Some(raw.to_string())),
        },
    }
}

fn level_from_log_level(lvl: LogLevel) -> Level {
    match lvl {
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    }
}

pub fn parse_level_str(s: &str) -> Option<Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(Level::ERROR),
        "warn" | "warning" => Some(Level::WARN),
        "info" => Some(Level::INFO),
        "debug" => Some(Level::DEBUG),
        "trace" => Some(Level::TRACE),
        _ => None,
    }
}

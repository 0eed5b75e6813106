// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Only errors raised on the caller's thread are expressed here. Faults that
//! happen inside a monitor's worker (condition failures, action failures) are
//! reported through tracing and the worker report instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WatchpointError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Monitor '{0}' is already running")]
    AlreadyRunning(String),

    #[error("Target does not exist: {}", .0.display())]
    TargetMissing(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WatchpointError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        WatchpointError::ConfigError(msg.into())
    }

    /// True for errors caused by how the monitor was configured or driven,
    /// as opposed to IO or condition failures.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            WatchpointError::ConfigError(_) | WatchpointError::AlreadyRunning(_)
        )
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, WatchpointError>;

// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::model::{RawWatchConfig, WatchConfig};
use crate::errors::Result;

/// Load a watch file from a given path and return the raw `RawWatchConfig`.
///
/// This only performs TOML deserialization; it does **not** parse durations
/// or check field values. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawWatchConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawWatchConfig = toml::from_str(&contents)?;
    debug!(?path, kind = config.condition.kind(), "loaded watch file");

    Ok(config)
}

/// Load a watch file from path and validate it.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Parses durations and rejects empty or zero-valued fields.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<WatchConfig> {
    let raw_config = load_from_path(&path)?;
    let config = WatchConfig::try_from(raw_config)?;
    Ok(config)
}

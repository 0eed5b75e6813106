// src/config/validate.rs

use std::path::Path;
use std::time::Duration;

use globset::Glob;

use crate::conditions::network::DEFAULT_CONNECT_TIMEOUT;
use crate::conditions::DEFAULT_POLL_INTERVAL;
use crate::config::duration::parse_duration;
use crate::config::model::{ConditionSpec, RawConditionConfig, RawWatchConfig, WatchConfig};
use crate::errors::{Result, WatchpointError};

impl TryFrom<RawWatchConfig> for WatchConfig {
    type Error = WatchpointError;

    fn try_from(raw: RawWatchConfig) -> std::result::Result<Self, Self::Error> {
        let name = raw.monitor.name.trim().to_string();
        if name.is_empty() {
            return Err(WatchpointError::config("[monitor].name must not be empty"));
        }

        let stop_timeout = positive_duration("[monitor].stop_timeout", &raw.monitor.stop_timeout)?;
        let condition = validate_condition(&raw.condition)?;
        validate_action(&raw.action.cmd)?;

        Ok(WatchConfig {
            name,
            stop_timeout,
            condition,
            action: raw.action,
        })
    }
}

fn validate_condition(raw: &RawConditionConfig) -> Result<ConditionSpec> {
    let spec = match raw {
        RawConditionConfig::Every { interval } => ConditionSpec::Every {
            interval: positive_duration("[condition].interval", interval)?,
        },
        RawConditionConfig::FileExists { path, interval } => {
            ensure_path("[condition].path", path)?;
            ConditionSpec::FileExists {
                path: path.clone(),
                interval: poll_interval(interval.as_deref())?,
            }
        }
        RawConditionConfig::NewFile {
            dir,
            pattern,
            interval,
        } => {
            ensure_path("[condition].dir", dir)?;
            if let Some(pattern) = pattern {
                Glob::new(pattern).map_err(|e| {
                    WatchpointError::config(format!(
                        "[condition].pattern '{}' is not a valid glob: {}",
                        pattern, e
                    ))
                })?;
            }
            ConditionSpec::NewFile {
                dir: dir.clone(),
                pattern: pattern.clone(),
                interval: poll_interval(interval.as_deref())?,
            }
        }
        RawConditionConfig::NotModified {
            path,
            duration,
            interval,
        } => {
            ensure_path("[condition].path", path)?;
            ConditionSpec::NotModified {
                path: path.clone(),
                duration: positive_duration("[condition].duration", duration)?,
                interval: poll_interval(interval.as_deref())?,
            }
        }
        RawConditionConfig::ContentChanged { path, interval } => {
            ensure_path("[condition].path", path)?;
            ConditionSpec::ContentChanged {
                path: path.clone(),
                interval: poll_interval(interval.as_deref())?,
            }
        }
        RawConditionConfig::PortOpen {
            host,
            port,
            interval,
            connect_timeout,
        } => {
            if host.trim().is_empty() {
                return Err(WatchpointError::config("[condition].host must not be empty"));
            }
            if *port == 0 {
                return Err(WatchpointError::config("[condition].port must be >= 1 (got 0)"));
            }
            let connect_timeout = match connect_timeout {
                Some(s) => positive_duration("[condition].connect_timeout", s)?,
                None => DEFAULT_CONNECT_TIMEOUT,
            };
            ConditionSpec::PortOpen {
                host: host.trim().to_string(),
                port: *port,
                interval: poll_interval(interval.as_deref())?,
                connect_timeout,
            }
        }
    };
    Ok(spec)
}

fn validate_action(cmd: &str) -> Result<()> {
    if cmd.trim().is_empty() {
        return Err(WatchpointError::config("[action].cmd must not be empty"));
    }
    Ok(())
}

fn ensure_path(field: &str, path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(WatchpointError::config(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn poll_interval(raw: Option<&str>) -> Result<Duration> {
    match raw {
        Some(s) => positive_duration("[condition].interval", s),
        None => Ok(DEFAULT_POLL_INTERVAL),
    }
}

fn positive_duration(field: &str, raw: &str) -> Result<Duration> {
    let duration = parse_duration(raw)
        .map_err(|e| WatchpointError::config(format!("{}: {}", field, e)))?;
    if duration.is_zero() {
        return Err(WatchpointError::config(format!(
            "{} must be greater than zero (got '{}')",
            field, raw
        )));
    }
    Ok(duration)
}

impl ConditionSpec {
    /// Resolve relative paths against `root` (the watch file's directory).
    pub fn resolve_paths(self, root: &Path) -> Self {
        let join = |p: std::path::PathBuf| if p.is_relative() { root.join(p) } else { p };
        match self {
            ConditionSpec::FileExists { path, interval } => ConditionSpec::FileExists {
                path: join(path),
                interval,
            },
            ConditionSpec::NewFile {
                dir,
                pattern,
                interval,
            } => ConditionSpec::NewFile {
                dir: join(dir),
                pattern,
                interval,
            },
            ConditionSpec::NotModified {
                path,
                duration,
                interval,
            } => ConditionSpec::NotModified {
                path: join(path),
                duration,
                interval,
            },
            ConditionSpec::ContentChanged { path, interval } => ConditionSpec::ContentChanged {
                path: join(path),
                interval,
            },
            other @ (ConditionSpec::Every { .. } | ConditionSpec::PortOpen { .. }) => other,
        }
    }
}

// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Watch file as read from TOML.
///
/// ```toml
/// [monitor]
/// name = "reports"
/// stop_timeout = "5s"
///
/// [condition]
/// kind = "new_file"
/// dir = "incoming"
/// pattern = "*.csv"
/// interval = "500ms"
///
/// [action]
/// cmd = "./process.sh"
/// quit_on_success = false
/// ```
///
/// Durations stay strings here; [`WatchConfig`] is the validated form.
#[derive(Debug, Clone, Deserialize)]
pub struct RawWatchConfig {
    #[serde(default)]
    pub monitor: MonitorSection,

    pub condition: RawConditionConfig,

    pub action: ActionSection,
}

/// `[monitor]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorSection {
    #[serde(default = "default_name")]
    pub name: String,

    /// How long `stop` waits for the worker on shutdown.
    #[serde(default = "default_stop_timeout")]
    pub stop_timeout: String,
}

fn default_name() -> String {
    "watchpoint".to_string()
}

fn default_stop_timeout() -> String {
    "5s".to_string()
}

impl Default for MonitorSection {
    fn default() -> Self {
        Self {
            name: default_name(),
            stop_timeout: default_stop_timeout(),
        }
    }
}

/// `[condition]` section, tagged by `kind`.
///
/// `interval` is optional everywhere except `every`; it defaults to one
/// second.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawConditionConfig {
    Every {
        interval: String,
    },
    FileExists {
        path: PathBuf,
        #[serde(default)]
        interval: Option<String>,
    },
    NewFile {
        dir: PathBuf,
        #[serde(default)]
        pattern: Option<String>,
        #[serde(default)]
        interval: Option<String>,
    },
    NotModified {
        path: PathBuf,
        duration: String,
        #[serde(default)]
        interval: Option<String>,
    },
    ContentChanged {
        path: PathBuf,
        #[serde(default)]
        interval: Option<String>,
    },
    PortOpen {
        host: String,
        port: u16,
        #[serde(default)]
        interval: Option<String>,
        #[serde(default)]
        connect_timeout: Option<String>,
    },
}

impl RawConditionConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            RawConditionConfig::Every { .. } => "every",
            RawConditionConfig::FileExists { .. } => "file_exists",
            RawConditionConfig::NewFile { .. } => "new_file",
            RawConditionConfig::NotModified { .. } => "not_modified",
            RawConditionConfig::ContentChanged { .. } => "content_changed",
            RawConditionConfig::PortOpen { .. } => "port_open",
        }
    }
}

/// `[action]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ActionSection {
    /// Shell command run each time the condition holds.
    pub cmd: String,

    /// Ask the monitor to quit after the first successful run.
    #[serde(default)]
    pub quit_on_success: bool,
}

/// Validated watch configuration.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub name: String,
    pub stop_timeout: Duration,
    pub condition: ConditionSpec,
    pub action: ActionSection,
}

/// Validated condition settings with parsed durations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionSpec {
    Every {
        interval: Duration,
    },
    FileExists {
        path: PathBuf,
        interval: Duration,
    },
    NewFile {
        dir: PathBuf,
        pattern: Option<String>,
        interval: Duration,
    },
    NotModified {
        path: PathBuf,
        duration: Duration,
        interval: Duration,
    },
    ContentChanged {
        path: PathBuf,
        interval: Duration,
    },
    PortOpen {
        host: String,
        port: u16,
        interval: Duration,
        connect_timeout: Duration,
    },
}

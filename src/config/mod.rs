// src/config/mod.rs

//! Watch file loading and validation.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a watch file from disk (`loader.rs`).
//! - Validate it into typed settings (`validate.rs`), parsing durations
//!   along the way (`duration.rs`).

pub mod duration;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{load_and_validate, load_from_path};
pub use model::{
    ActionSection, ConditionSpec, MonitorSection, RawConditionConfig, RawWatchConfig, WatchConfig,
};

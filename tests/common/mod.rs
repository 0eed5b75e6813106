#![allow(dead_code, unused_imports)]

use std::time::Duration;

pub use watchpoint_test_utils::{endless, init_tracing, scripted, CallTracker, LogCapture};

/// Generous upper bound for anything that should happen "promptly".
pub const PROMPT: Duration = Duration::from_secs(2);

/// Short gap between scripted values.
pub const GAP: Duration = Duration::from_millis(10);

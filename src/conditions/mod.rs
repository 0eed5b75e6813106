// src/conditions/mod.rs

//! Built-in conditions.
//!
//! All of them are continuous: they return a [`PollingStream`] that checks
//! some external state once per interval. The stream
//!
//! - runs [`Probe::prepare`] synchronously on the first pull, so structural
//!   problems (a watched directory that does not exist) surface immediately;
//! - ends as soon as the cancel token is set, including while it is waiting
//!   out an interval;
//! - stops yielding after the first error.
//!
//! Each condition also exposes `stream(&CancelToken)` so it can be iterated
//! directly, without a monitor.

pub mod files;
pub mod hash;
pub mod network;
pub mod time;

use std::fmt;
use std::time::Duration;

use anyhow::Result;

use crate::cancel::CancelToken;

pub use files::{FileContentChanged, FileExists, FileNotModifiedFor, NewFileInDirectory};
pub use network::PortOpen;
pub use time::Every;

/// Poll interval used when a condition is not given one.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// A single check against external state.
pub trait Probe: Send + 'static {
    /// Runs once, before the first check. Validation and baselines go here.
    fn prepare(&mut self) -> Result<()> {
        Ok(())
    }

    fn check(&mut self) -> Result<bool>;
}

/// Stream that runs a [`Probe`] once per interval until cancelled.
pub struct PollingStream<P> {
    probe: P,
    cancel: CancelToken,
    interval: Duration,
    prepared: bool,
    failed: bool,
}

impl<P> fmt::Debug for PollingStream<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PollingStream")
            .field("interval", &self.interval)
            .field("prepared", &self.prepared)
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}

impl<P: Probe> PollingStream<P> {
    pub fn new(probe: P, cancel: CancelToken, interval: Duration) -> Self {
        Self {
            probe,
            cancel,
            interval,
            prepared: false,
            failed: false,
        }
    }

    fn fail<T>(&mut self, err: anyhow::Error) -> Option<Result<T>> {
        self.failed = true;
        Some(Err(err))
    }
}

impl<P: Probe> Iterator for PollingStream<P> {
    type Item = Result<bool>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cancel.is_cancelled() {
            return None;
        }

        if !self.prepared {
            self.prepared = true;
            if let Err(err) = self.probe.prepare() {
                return self.fail(err);
            }
        }

        if self.cancel.wait(self.interval) {
            return None;
        }

        match self.probe.check() {
            Ok(value) => Some(Ok(value)),
            Err(err) => self.fail(err),
        }
    }
}

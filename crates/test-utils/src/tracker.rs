//! Recording actions.
//!
//! A [`CallTracker`] is a shared log of action invocations. Clone it into as
//! many actions as a test needs and inspect it from the test thread.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use watchpoint::action::{self, Action, Flow};

#[derive(Debug, Clone, Default)]
pub struct CallTracker {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, label: impl Into<String>) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(label.into());
    }

    pub fn count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Poll until at least `n` calls were recorded or `timeout` elapses.
    pub fn wait_for(&self, n: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.count() >= n {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    /// Action that records `label` and keeps going.
    pub fn marker(&self, label: &str) -> impl Action + use<> {
        let tracker = self.clone();
        let label = label.to_string();
        action::infallible(move || tracker.record(label.clone()))
    }

    /// Action that records `label` and then fails with `message`.
    pub fn failing(&self, label: &str, message: &str) -> impl Action + use<> {
        let tracker = self.clone();
        let label = label.to_string();
        let message = message.to_string();
        action::from_fn(move || {
            tracker.record(label.clone());
            Err(anyhow!("{}", message))
        })
    }

    /// Action that records `label` and then panics with `message`.
    pub fn panicking(&self, label: &str, message: &str) -> impl Action + use<> {
        let tracker = self.clone();
        let label = label.to_string();
        let message = message.to_string();
        action::from_fn(move || -> anyhow::Result<Flow> {
            tracker.record(label.clone());
            panic!("{}", message);
        })
    }

    /// Action that records `label` and asks to quit once it has run `n` times.
    pub fn quitting_after(&self, label: &str, n: usize) -> impl Action + use<> {
        let tracker = self.clone();
        let label = label.to_string();
        let mut runs = 0;
        action::from_fn(move || {
            tracker.record(label.clone());
            runs += 1;
            Ok(if runs >= n { Flow::Quit } else { Flow::Continue })
        })
    }
}

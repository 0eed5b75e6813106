// src/monitor/mod.rs

//! The monitor: one condition, one action, one worker thread.
//!
//! Lifecycle:
//!
//! 1. Build a [`Monitor`] and attach a condition ([`Monitor::on`]) and an
//!    action ([`Monitor::then`]). Each can be attached exactly once.
//! 2. [`Monitor::start`] validates the configuration, clears the cancel
//!    token and spawns the worker. It never blocks.
//! 3. The worker evaluates the condition and dispatches the action until the
//!    condition is exhausted, the action asks to quit, or something fails.
//! 4. [`Monitor::stop`] sets the cancel token and waits (bounded) for the
//!    worker to exit. The handlers come back from the worker, so the monitor
//!    can be started again.
//!
//! [`Monitor::enter`] wraps 2 and 4 in a guard that stops the worker when it
//! goes out of scope, including during a panic.

pub mod worker;

use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::{debug, error, info, warn};

use crate::action::Action;
use crate::cancel::CancelToken;
use crate::condition::Condition;
use crate::errors::{Result, WatchpointError};

pub use worker::{DispatchMode, WorkerExit, WorkerReport};
use worker::WorkerOutput;

/// Timeout used by scoped release and `Drop` unless overridden.
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(5);

const DEFAULT_NAME: &str = "watchpoint";

/// Where a handler currently lives.
enum Slot<T> {
    Empty,
    Ready(T),
    /// Moved into the running worker.
    Lent,
}

impl<T> Slot<T> {
    fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    fn is_ready(&self) -> bool {
        matches!(self, Slot::Ready(_))
    }

    fn lend(&mut self) -> Option<T> {
        match mem::replace(self, Slot::Lent) {
            Slot::Ready(value) => Some(value),
            other => {
                *self = other;
                None
            }
        }
    }
}

/// Handle for a spawned worker thread.
///
/// `done` fires right before the thread returns, which gives `stop` a bounded
/// wait; the join that follows only collects the output.
struct WorkerHandle {
    thread: JoinHandle<WorkerOutput>,
    done: Receiver<()>,
}

/// Watches one condition and runs one action whenever it holds.
pub struct Monitor {
    name: String,
    condition: Slot<Box<dyn Condition>>,
    action: Slot<Box<dyn Action>>,
    cancel: CancelToken,
    worker: Option<WorkerHandle>,
    last_report: Option<WorkerReport>,
    stop_timeout: Duration,
}

impl fmt::Debug for Monitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Monitor")
            .field("name", &self.name)
            .field("running", &self.is_running())
            .field("cancel", &self.cancel)
            .field("last_report", &self.last_report)
            .finish_non_exhaustive()
    }
}

impl Default for Monitor {
    fn default() -> Self {
        Self::new()
    }
}

impl Monitor {
    pub fn new() -> Self {
        Self::named(DEFAULT_NAME)
    }

    /// Create a monitor whose name tags its worker thread and log lines.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            condition: Slot::Empty,
            action: Slot::Empty,
            cancel: CancelToken::new(),
            worker: None,
            last_report: None,
            stop_timeout: DEFAULT_STOP_TIMEOUT,
        }
    }

    /// Timeout used when a [`MonitorGuard`] or the monitor itself is dropped.
    pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
        self.stop_timeout = timeout;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stop_timeout(&self) -> Duration {
        self.stop_timeout
    }

    /// Attach the condition. Fails if one is already attached.
    pub fn on<C: Condition>(&mut self, condition: C) -> Result<&mut Self> {
        if !self.condition.is_empty() {
            error!(monitor = %self.name, "condition has already been set");
            return Err(WatchpointError::config(format!(
                "monitor '{}' condition has already been set",
                self.name
            )));
        }
        self.condition = Slot::Ready(Box::new(condition));
        Ok(self)
    }

    /// Attach the action. Fails if one is already attached.
    pub fn then<A: Action>(&mut self, action: A) -> Result<&mut Self> {
        if !self.action.is_empty() {
            error!(monitor = %self.name, "action has already been set");
            return Err(WatchpointError::config(format!(
                "monitor '{}' action has already been set",
                self.name
            )));
        }
        self.action = Slot::Ready(Box::new(action));
        Ok(self)
    }

    pub fn has_condition(&self) -> bool {
        !self.condition.is_empty()
    }

    pub fn has_action(&self) -> bool {
        !self.action.is_empty()
    }

    /// A clone of the token the worker and its condition observe.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Whether a worker thread exists and has not returned yet.
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.thread.is_finished())
    }

    /// Report of the most recently collected worker.
    pub fn last_report(&self) -> Option<&WorkerReport> {
        self.last_report.as_ref()
    }

    /// Spawn the worker.
    ///
    /// Fails without spawning if the condition or the action is missing, or
    /// if a worker for this monitor is still alive.
    pub fn start(&mut self) -> Result<()> {
        self.collect_if_finished();

        if self.worker.is_some() {
            error!(monitor = %self.name, "start requested while worker is alive");
            return Err(WatchpointError::AlreadyRunning(self.name.clone()));
        }

        if !(self.condition.is_ready() && self.action.is_ready()) {
            error!(
                monitor = %self.name,
                has_condition = self.has_condition(),
                has_action = self.has_action(),
                "start requested on incomplete monitor"
            );
            return Err(WatchpointError::config(format!(
                "monitor '{}' must be configured with both a condition and an action before starting",
                self.name
            )));
        }

        let (Some(condition), Some(action)) = (self.condition.lend(), self.action.lend()) else {
            return Err(WatchpointError::config(format!(
                "monitor '{}' handlers are unavailable",
                self.name
            )));
        };

        self.cancel.reset();

        let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(1);
        let name = self.name.clone();
        let cancel = self.cancel.clone();

        let spawned = thread::Builder::new()
            .name(format!("watchpoint-{}", self.name))
            .spawn(move || {
                let output = worker::run(&name, condition, action, &cancel);
                let _ = done_tx.send(());
                output
            });

        match spawned {
            Ok(thread) => {
                info!(monitor = %self.name, "monitor started");
                self.worker = Some(WorkerHandle {
                    thread,
                    done: done_rx,
                });
                Ok(())
            }
            Err(err) => {
                // The handlers were moved into the closure that failed to spawn.
                self.condition = Slot::Empty;
                self.action = Slot::Empty;
                error!(monitor = %self.name, error = %err, "failed to spawn worker thread");
                Err(WatchpointError::IoError(err))
            }
        }
    }

    /// Request cancellation and wait up to `timeout` for the worker to exit.
    ///
    /// Returns whether the worker is gone. Calling this with no worker, or
    /// more than once, is fine.
    pub fn stop(&mut self, timeout: Duration) -> bool {
        self.cancel.cancel();

        if self.worker.is_none() {
            debug!(monitor = %self.name, "stop requested with no worker");
            return true;
        }

        info!(monitor = %self.name, ?timeout, "stop requested");
        let stopped = self.wait(timeout);
        if !stopped {
            warn!(
                monitor = %self.name,
                ?timeout,
                "worker did not exit within timeout"
            );
        }
        stopped
    }

    /// Wait up to `timeout` for the worker to exit on its own, without
    /// cancelling it. Returns whether the worker is gone.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        let Some(worker) = self.worker.take() else {
            return true;
        };

        match worker.done.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                self.collect(worker);
                true
            }
            Err(RecvTimeoutError::Timeout) => {
                self.worker = Some(worker);
                false
            }
        }
    }

    /// Start the worker and return a guard that stops it when dropped.
    pub fn enter(&mut self) -> Result<MonitorGuard<'_>> {
        self.start()?;
        Ok(MonitorGuard { monitor: self })
    }

    fn collect_if_finished(&mut self) {
        let finished = self
            .worker
            .as_ref()
            .is_some_and(|worker| worker.thread.is_finished());
        if finished {
            if let Some(worker) = self.worker.take() {
                self.collect(worker);
            }
        }
    }

    fn collect(&mut self, worker: WorkerHandle) {
        match worker.thread.join() {
            Ok(output) => {
                debug!(monitor = %self.name, exit = ?output.report.exit, "worker collected");
                self.condition = Slot::Ready(output.condition);
                self.action = Slot::Ready(output.action);
                self.last_report = Some(output.report);
            }
            Err(_) => {
                error!(monitor = %self.name, "worker thread panicked; handlers were lost");
                self.condition = Slot::Empty;
                self.action = Slot::Empty;
            }
        }
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        if self.worker.is_some() {
            let timeout = self.stop_timeout;
            if !self.stop(timeout) {
                warn!(monitor = %self.name, "detaching worker that did not stop in time");
            }
        }
    }
}

/// Scoped acquisition of a running monitor. See [`Monitor::enter`].
pub struct MonitorGuard<'a> {
    monitor: &'a mut Monitor,
}

impl fmt::Debug for MonitorGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("MonitorGuard").field(&self.monitor).finish()
    }
}

impl Deref for MonitorGuard<'_> {
    type Target = Monitor;

    fn deref(&self) -> &Monitor {
        self.monitor
    }
}

impl DerefMut for MonitorGuard<'_> {
    fn deref_mut(&mut self) -> &mut Monitor {
        self.monitor
    }
}

impl Drop for MonitorGuard<'_> {
    fn drop(&mut self) {
        let timeout = self.monitor.stop_timeout;
        if !self.monitor.stop(timeout) {
            warn!(monitor = %self.monitor.name, "scoped stop timed out");
        }
    }
}

/// Create a monitor with `condition` already attached.
pub fn on<C: Condition>(condition: C) -> Monitor {
    let mut monitor = Monitor::new();
    monitor.condition = Slot::Ready(Box::new(condition));
    monitor
}

/// Create a monitor with both handlers attached, ready to start.
pub fn watch<C: Condition, A: Action>(condition: C, action: A) -> Monitor {
    let mut monitor = on(condition);
    monitor.action = Slot::Ready(Box::new(action));
    monitor
}

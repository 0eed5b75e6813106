// src/monitor/worker.rs

//! Worker body: classify the condition once, then dispatch.
//!
//! Everything that can go wrong in here is turned into a log line and a
//! [`WorkerExit`]. Nothing propagates to the thread that owns the monitor.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, error, info};

use crate::action::{Action, Flow};
use crate::cancel::CancelToken;
use crate::condition::{Condition, Evaluation};

/// Which shape the condition returned on this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    OneShot,
    Continuous,
}

/// Why a worker stopped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum WorkerExit {
    /// The single evaluation of a one-shot condition was handled.
    #[default]
    OneShotComplete,
    /// The stream ended on its own.
    Exhausted,
    /// The stream ended after the cancel token was set.
    Cancelled,
    /// The action returned [`Flow::Quit`].
    QuitRequested,
    /// The condition failed before producing a boolean or a stream.
    ClassificationFailed(String),
    /// The stream yielded an error.
    ConditionFailed(String),
    /// The condition panicked.
    Panicked(String),
}

impl WorkerExit {
    /// True when the worker ended because something went wrong rather than
    /// because it ran out of work or was asked to stop.
    pub fn is_fault(&self) -> bool {
        matches!(
            self,
            WorkerExit::ClassificationFailed(_)
                | WorkerExit::ConditionFailed(_)
                | WorkerExit::Panicked(_)
        )
    }
}

/// Summary of one worker run, available from the monitor once the worker has
/// been collected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub mode: Option<DispatchMode>,
    pub exit: WorkerExit,
    /// Booleans received from the condition.
    pub evaluations: usize,
    /// Action invocations, failed ones included.
    pub actions_run: usize,
    /// Invocations that returned an error or panicked.
    pub action_failures: usize,
}

/// What the worker thread hands back when it ends. The handlers travel back
/// to the monitor so it can be started again.
pub(crate) struct WorkerOutput {
    pub condition: Box<dyn Condition>,
    pub action: Box<dyn Action>,
    pub report: WorkerReport,
}

pub(crate) fn run(
    name: &str,
    mut condition: Box<dyn Condition>,
    mut action: Box<dyn Action>,
    cancel: &CancelToken,
) -> WorkerOutput {
    debug!(monitor = %name, "worker started");

    let mut report = WorkerReport::default();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        dispatch(name, condition.as_mut(), action.as_mut(), cancel, &mut report)
    }));

    report.exit = match outcome {
        Ok(exit) => exit,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(monitor = %name, panic = %message, "condition panicked");
            WorkerExit::Panicked(message)
        }
    };

    info!(
        monitor = %name,
        exit = ?report.exit,
        evaluations = report.evaluations,
        actions_run = report.actions_run,
        action_failures = report.action_failures,
        "worker finished"
    );

    WorkerOutput {
        condition,
        action,
        report,
    }
}

fn dispatch(
    name: &str,
    condition: &mut dyn Condition,
    action: &mut dyn Action,
    cancel: &CancelToken,
    report: &mut WorkerReport,
) -> WorkerExit {
    let evaluation = match condition.evaluate(cancel) {
        Ok(evaluation) => evaluation,
        Err(err) => {
            let detail = format!("{err:#}");
            error!(monitor = %name, error = %detail, "invalid return from condition");
            return WorkerExit::ClassificationFailed(detail);
        }
    };

    match evaluation {
        Evaluation::Immediate(value) => {
            report.mode = Some(DispatchMode::OneShot);
            report.evaluations = 1;
            debug!(monitor = %name, value, "one-shot evaluation");
            if value {
                // Quit has nothing left to stop here.
                let _ = invoke_action(name, action, report);
            }
            WorkerExit::OneShotComplete
        }
        Evaluation::Stream(mut stream) => {
            report.mode = Some(DispatchMode::Continuous);
            debug!(monitor = %name, "continuous evaluation");
            loop {
                match stream.next() {
                    None => {
                        return if cancel.is_cancelled() {
                            WorkerExit::Cancelled
                        } else {
                            WorkerExit::Exhausted
                        };
                    }
                    Some(Err(err)) => {
                        let detail = format!("{err:#}");
                        error!(monitor = %name, error = %detail, "condition evaluation failed");
                        return WorkerExit::ConditionFailed(detail);
                    }
                    Some(Ok(false)) => {
                        report.evaluations += 1;
                    }
                    Some(Ok(true)) => {
                        report.evaluations += 1;
                        if invoke_action(name, action, report) == Flow::Quit {
                            info!(monitor = %name, "action requested quit");
                            return WorkerExit::QuitRequested;
                        }
                    }
                }
            }
        }
    }
}

/// Run the action once, isolating errors and panics from the loop.
fn invoke_action(name: &str, action: &mut dyn Action, report: &mut WorkerReport) -> Flow {
    report.actions_run += 1;

    match panic::catch_unwind(AssertUnwindSafe(|| action.run())) {
        Ok(Ok(flow)) => flow,
        Ok(Err(err)) => {
            report.action_failures += 1;
            let detail = format!("{err:#}");
            error!(monitor = %name, error = %detail, "error executing action");
            Flow::Continue
        }
        Err(payload) => {
            report.action_failures += 1;
            let detail = format!("action panicked: {}", panic_message(payload.as_ref()));
            error!(monitor = %name, error = %detail, "error executing action");
            Flow::Continue
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

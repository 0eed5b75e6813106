mod common;
use crate::common::{endless, init_tracing, scripted, CallTracker, PROMPT};

use std::error::Error;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::anyhow;

use watchpoint::condition::{self, Evaluation};
use watchpoint::conditions::Every;
use watchpoint::{Monitor, WatchpointError, WorkerExit};

type TestResult = Result<(), Box<dyn Error>>;

/// A stream that ignores cancellation and takes its time.
fn stubborn(items: usize, each: Duration) -> impl watchpoint::Condition {
    condition::from_fn(move |_| {
        Ok(Evaluation::from_bools((0..items).map(move |_| {
            thread::sleep(each);
            false
        })))
    })
}

#[test]
fn stop_interrupts_a_long_poll_interval() -> TestResult {
    init_tracing();
    let tracker = CallTracker::new();

    let mut monitor = Monitor::named("lifecycle-long-interval");
    monitor
        .on(Every::new(Duration::from_millis(500)))?
        .then(tracker.marker("tick"))?;
    monitor.start()?;
    thread::sleep(Duration::from_millis(50));

    let started = Instant::now();
    assert!(monitor.stop(PROMPT));
    assert!(started.elapsed() < Duration::from_millis(400));

    assert!(!monitor.is_running());
    assert_eq!(tracker.count(), 0);
    let report = monitor.last_report().ok_or("missing report")?;
    assert_eq!(report.exit, WorkerExit::Cancelled);
    Ok(())
}

#[test]
fn actions_run_only_inside_the_start_stop_window() -> TestResult {
    init_tracing();
    let tracker = CallTracker::new();

    let mut monitor = Monitor::named("lifecycle-window");
    monitor
        .on(endless(Duration::from_millis(30)))?
        .then(tracker.marker("tick"))?;

    monitor.start()?;
    thread::sleep(Duration::from_millis(150));
    assert!(monitor.stop(PROMPT));

    let count = tracker.count();
    assert!(count > 1 && count < 10, "unexpected action count {count}");

    // Nothing runs after stop returned.
    thread::sleep(Duration::from_millis(100));
    assert_eq!(tracker.count(), count);
    Ok(())
}

#[test]
fn stop_cuts_a_short_sequence_short() -> TestResult {
    init_tracing();
    let tracker = CallTracker::new();

    // Four trues, one every 20ms, stopped after roughly two of them.
    let mut monitor = Monitor::named("lifecycle-short-sequence");
    monitor
        .on(scripted(vec![true; 4], Duration::from_millis(20)))?
        .then(tracker.marker("tick"))?;

    monitor.start()?;
    thread::sleep(Duration::from_millis(50));
    assert!(monitor.stop(PROMPT));

    let count = tracker.count();
    assert!(count > 1 && count < 4, "unexpected action count {count}");
    assert!(!monitor.is_running());
    Ok(())
}

#[test]
fn stop_is_idempotent_and_safe_without_a_worker() -> TestResult {
    init_tracing();
    let tracker = CallTracker::new();

    let mut idle = Monitor::named("lifecycle-idle");
    assert!(idle.stop(PROMPT));
    assert!(idle.stop(PROMPT));
    assert!(idle.cancel_token().is_cancelled());

    let mut monitor = Monitor::named("lifecycle-twice");
    monitor
        .on(endless(Duration::from_millis(20)))?
        .then(tracker.marker("tick"))?;
    monitor.start()?;
    assert!(monitor.stop(PROMPT));
    assert!(monitor.stop(PROMPT));
    assert!(!monitor.is_running());
    Ok(())
}

#[test]
fn start_while_running_is_rejected() -> TestResult {
    init_tracing();
    let tracker = CallTracker::new();

    let mut monitor = Monitor::named("lifecycle-already-running");
    monitor
        .on(endless(Duration::from_millis(20)))?
        .then(tracker.marker("tick"))?;
    monitor.start()?;

    match monitor.start() {
        Err(WatchpointError::AlreadyRunning(name)) => {
            assert_eq!(name, "lifecycle-already-running")
        }
        other => panic!("expected AlreadyRunning, got {other:?}"),
    }
    assert!(monitor.is_running());

    assert!(monitor.stop(PROMPT));
    Ok(())
}

#[test]
fn monitor_restarts_after_stop() -> TestResult {
    init_tracing();
    let tracker = CallTracker::new();

    let mut monitor = Monitor::named("lifecycle-restart");
    monitor
        .on(endless(Duration::from_millis(20)))?
        .then(tracker.marker("tick"))?;

    monitor.start()?;
    assert!(tracker.wait_for(1, PROMPT));
    assert!(monitor.stop(PROMPT));
    let after_first = tracker.count();

    // start clears the token set by stop.
    monitor.start()?;
    assert!(!monitor.cancel_token().is_cancelled());
    assert!(tracker.wait_for(after_first + 1, PROMPT));
    assert!(monitor.stop(PROMPT));
    Ok(())
}

#[test]
fn finished_worker_is_collected_on_next_start() -> TestResult {
    init_tracing();
    let tracker = CallTracker::new();

    let mut monitor = Monitor::named("lifecycle-collect");
    monitor
        .on(condition::once(|| true))?
        .then(tracker.marker("hit"))?;

    monitor.start()?;
    assert!(tracker.wait_for(1, PROMPT));
    let deadline = Instant::now() + PROMPT;
    while monitor.is_running() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }

    // No explicit wait: start notices the worker is done.
    monitor.start()?;
    assert!(monitor.wait(PROMPT));
    assert_eq!(tracker.count(), 2);
    Ok(())
}

#[test]
fn stop_times_out_on_a_condition_that_ignores_cancellation() -> TestResult {
    init_tracing();
    let tracker = CallTracker::new();

    let mut monitor = Monitor::named("lifecycle-stubborn");
    monitor
        .on(stubborn(3, Duration::from_millis(150)))?
        .then(tracker.marker("never"))?;
    monitor.start()?;

    assert!(!monitor.stop(Duration::from_millis(20)));
    assert!(monitor.is_running());
    assert!(matches!(
        monitor.start(),
        Err(WatchpointError::AlreadyRunning(_))
    ));

    assert!(monitor.wait(PROMPT));
    let report = monitor.last_report().ok_or("missing report")?;
    // The stream ran out on its own, but only after the token was set.
    assert_eq!(report.exit, WorkerExit::Cancelled);
    Ok(())
}

#[test]
fn wait_does_not_cancel() -> TestResult {
    init_tracing();
    let tracker = CallTracker::new();

    let mut monitor = Monitor::named("lifecycle-wait");
    monitor
        .on(endless(Duration::from_millis(20)))?
        .then(tracker.marker("tick"))?;
    monitor.start()?;

    assert!(!monitor.wait(Duration::from_millis(50)));
    assert!(monitor.is_running());
    assert!(!monitor.cancel_token().is_cancelled());

    assert!(monitor.stop(PROMPT));
    Ok(())
}

#[test]
fn scope_exit_stops_the_worker() -> TestResult {
    init_tracing();
    let tracker = CallTracker::new();

    let mut monitor = Monitor::named("lifecycle-scope");
    monitor
        .on(endless(Duration::from_millis(20)))?
        .then(tracker.marker("tick"))?;

    {
        let guard = monitor.enter()?;
        assert!(guard.is_running());
        assert!(tracker.wait_for(1, PROMPT));
    }

    assert!(!monitor.is_running());
    let report = monitor.last_report().ok_or("missing report")?;
    assert_eq!(report.exit, WorkerExit::Cancelled);
    Ok(())
}

#[test]
fn scope_exit_by_panic_stops_the_worker() -> TestResult {
    init_tracing();
    let tracker = CallTracker::new();

    let mut monitor = Monitor::named("lifecycle-scope-panic");
    monitor
        .on(endless(Duration::from_millis(20)))?
        .then(tracker.marker("tick"))?;

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| -> anyhow::Result<()> {
        let _guard = monitor.enter()?;
        if tracker.wait_for(1, PROMPT) {
            panic!("scope body failed");
        }
        Err(anyhow!("action never ran"))
    }));
    assert!(outcome.is_err(), "scope body should have panicked");

    assert!(!monitor.is_running());
    assert!(monitor.cancel_token().is_cancelled());
    let count = tracker.count();
    thread::sleep(Duration::from_millis(60));
    assert_eq!(tracker.count(), count);
    Ok(())
}

#[test]
fn scope_entry_surfaces_configuration_errors() {
    init_tracing();

    let mut monitor = Monitor::named("lifecycle-scope-config");
    assert!(monitor.on(endless(Duration::from_millis(20))).is_ok());

    let entered = monitor.enter().map(|_| ());
    match entered {
        Err(err) => assert!(err.is_configuration()),
        Ok(()) => panic!("enter should fail without an action"),
    }
    assert!(!monitor.is_running());
}

#[test]
fn dropping_a_running_monitor_stops_it() -> TestResult {
    init_tracing();
    let tracker = CallTracker::new();

    let token = {
        let mut monitor = Monitor::named("lifecycle-drop").with_stop_timeout(PROMPT);
        monitor
            .on(endless(Duration::from_millis(20)))?
            .then(tracker.marker("tick"))?;
        monitor.start()?;
        assert!(tracker.wait_for(1, PROMPT));
        monitor.cancel_token()
    };

    assert!(token.is_cancelled());
    let count = tracker.count();
    thread::sleep(Duration::from_millis(60));
    assert_eq!(tracker.count(), count);
    Ok(())
}

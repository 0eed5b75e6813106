mod common;
use crate::common::{init_tracing, CallTracker, PROMPT};

use std::error::Error;

use watchpoint::condition;
use watchpoint::{Monitor, WatchpointError};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn second_condition_is_rejected_and_first_is_kept() -> TestResult {
    init_tracing();
    let tracker = CallTracker::new();

    let mut monitor = Monitor::named("cfg-second-condition");
    monitor.on(condition::once(|| true))?;
    let err = monitor
        .on(condition::once(|| false))
        .err()
        .ok_or("second condition should be rejected")?;
    assert!(matches!(err, WatchpointError::ConfigError(_)));
    assert!(err.is_configuration());

    monitor.then(tracker.marker("fired"))?;
    monitor.start()?;
    assert!(monitor.wait(PROMPT));

    // The first condition (always true) is the one that ran.
    assert_eq!(tracker.snapshot(), vec!["fired"]);
    Ok(())
}

#[test]
fn second_action_is_rejected_and_first_is_kept() -> TestResult {
    init_tracing();
    let tracker = CallTracker::new();

    let mut monitor = Monitor::named("cfg-second-action");
    monitor.then(tracker.marker("first"))?;
    let err = monitor
        .then(tracker.marker("second"))
        .err()
        .ok_or("second action should be rejected")?;
    assert!(err.is_configuration());

    monitor.on(condition::once(|| true))?;
    monitor.start()?;
    assert!(monitor.wait(PROMPT));

    assert_eq!(tracker.snapshot(), vec!["first"]);
    Ok(())
}

#[test]
fn start_without_condition_fails_without_spawning() {
    init_tracing();
    let tracker = CallTracker::new();

    let mut monitor = Monitor::named("cfg-no-condition");
    assert!(monitor.then(tracker.marker("never")).is_ok());

    let err = monitor.start().err();
    assert!(matches!(err, Some(WatchpointError::ConfigError(_))));
    assert!(!monitor.is_running());
    assert!(monitor.last_report().is_none());
    assert_eq!(tracker.count(), 0);
}

#[test]
fn start_without_action_fails_without_spawning() {
    init_tracing();

    let mut monitor = Monitor::named("cfg-no-action");
    assert!(monitor.on(condition::once(|| true)).is_ok());

    match monitor.start() {
        Err(WatchpointError::ConfigError(msg)) => {
            assert!(msg.contains("both a condition and an action"), "{msg}");
        }
        other => panic!("expected configuration error, got {other:?}"),
    }
    assert!(!monitor.is_running());
}

#[test]
fn start_on_empty_monitor_fails() {
    init_tracing();

    let mut monitor = Monitor::new();
    assert_eq!(monitor.name(), "watchpoint");
    assert!(!monitor.has_condition());
    assert!(!monitor.has_action());
    assert!(monitor.start().is_err());
}

#[test]
fn builder_helpers_attach_handlers() -> TestResult {
    init_tracing();
    let tracker = CallTracker::new();

    let monitor = watchpoint::on(condition::once(|| true));
    assert!(monitor.has_condition());
    assert!(!monitor.has_action());

    let mut monitor = watchpoint::watch(condition::once(|| true), tracker.marker("go"));
    assert!(monitor.has_condition() && monitor.has_action());
    monitor.start()?;
    assert!(monitor.wait(PROMPT));
    assert_eq!(tracker.count(), 1);
    Ok(())
}

#[test]
fn registration_calls_chain() -> TestResult {
    init_tracing();
    let tracker = CallTracker::new();

    let mut monitor = Monitor::named("cfg-chain");
    monitor
        .on(condition::once(|| true))?
        .then(tracker.marker("chained"))?
        .start()?;
    assert!(monitor.wait(PROMPT));
    assert_eq!(tracker.snapshot(), vec!["chained"]);
    Ok(())
}

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;

use watchpoint::condition::{self, Evaluation};
use watchpoint::{Monitor, WorkerExit};
use watchpoint_test_utils::CallTracker;

const BOUND: Duration = Duration::from_secs(5);

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// In continuous mode the action runs exactly once per `true`, in the
    /// order the values were produced.
    #[test]
    fn continuous_runs_once_per_true(values in proptest::collection::vec(any::<bool>(), 0..40)) {
        let tracker = CallTracker::new();
        let position = Arc::new(AtomicUsize::new(0));

        let script = values.clone();
        let cond = {
            let position = Arc::clone(&position);
            condition::from_fn(move |_| {
                let position = Arc::clone(&position);
                Ok(Evaluation::from_bools(script.clone().into_iter().inspect(move |_| {
                    position.fetch_add(1, Ordering::SeqCst);
                })))
            })
        };
        let action = {
            let tracker = tracker.clone();
            watchpoint::action::infallible(move || {
                // Index of the value that triggered this run.
                tracker.record((position.load(Ordering::SeqCst) - 1).to_string());
            })
        };

        let mut monitor = Monitor::named("prop-continuous");
        prop_assert!(monitor.on(cond).is_ok());
        prop_assert!(monitor.then(action).is_ok());
        prop_assert!(monitor.start().is_ok());
        prop_assert!(monitor.wait(BOUND));

        let fired: Vec<String> = values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v)
            .map(|(i, _)| i.to_string())
            .collect();
        let expected = fired.len();
        prop_assert_eq!(tracker.snapshot(), fired);

        let report = monitor.last_report().cloned().unwrap_or_default();
        prop_assert_eq!(report.exit, WorkerExit::Exhausted);
        prop_assert_eq!(report.evaluations, values.len());
        prop_assert_eq!(report.actions_run, expected);
    }

    /// A failing action never changes how many times it is invoked.
    #[test]
    fn failures_do_not_change_dispatch_count(values in proptest::collection::vec(any::<bool>(), 0..40)) {
        let tracker = CallTracker::new();

        let script = values.clone();
        let cond = condition::sequence(move |_| script.clone());

        let mut monitor = Monitor::named("prop-failing");
        prop_assert!(monitor.on(cond).is_ok());
        prop_assert!(monitor.then(tracker.failing("hit", "always")).is_ok());
        prop_assert!(monitor.start().is_ok());
        prop_assert!(monitor.wait(BOUND));

        let expected = values.iter().filter(|v| **v).count();
        let report = monitor.last_report().cloned().unwrap_or_default();
        prop_assert_eq!(tracker.count(), expected);
        prop_assert_eq!(report.action_failures, expected);
    }

    /// A one-shot condition runs the action iff it is true.
    #[test]
    fn one_shot_runs_at_most_once(value in any::<bool>()) {
        let tracker = CallTracker::new();

        let mut monitor = Monitor::named("prop-one-shot");
        prop_assert!(monitor.on(condition::once(move || value)).is_ok());
        prop_assert!(monitor.then(tracker.marker("hit")).is_ok());
        prop_assert!(monitor.start().is_ok());
        prop_assert!(monitor.wait(BOUND));

        prop_assert_eq!(tracker.count(), usize::from(value));
    }
}

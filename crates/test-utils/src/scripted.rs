//! Scripted conditions with a fixed, known output.

use std::time::Duration;

use watchpoint::cancel::CancelToken;
use watchpoint::condition::{self, Condition};

/// Continuous condition that yields `values` in order, waiting `gap` before
/// each one. It ends early if the cancel token is set.
pub fn scripted(values: Vec<bool>, gap: Duration) -> impl Condition {
    condition::sequence(move |cancel: &CancelToken| {
        let cancel = cancel.clone();
        values
            .clone()
            .into_iter()
            .take_while(move |_| !cancel.wait(gap))
    })
}

/// Continuous condition that yields `true` every `period` until cancelled.
pub fn endless(period: Duration) -> impl Condition {
    condition::sequence(move |cancel: &CancelToken| {
        let cancel = cancel.clone();
        std::iter::repeat(true).take_while(move |_| !cancel.wait(period))
    })
}

// src/condition.rs

//! The condition contract.
//!
//! A condition is evaluated once per worker start. What it returns decides how
//! the worker dispatches:
//!
//! - [`Evaluation::Immediate`]: a single boolean. The worker runs the action
//!   at most once and exits (one-shot mode).
//! - [`Evaluation::Stream`]: a lazy, possibly infinite sequence of booleans.
//!   The worker pulls values until the sequence ends (continuous mode).
//!
//! Streams own their polling cadence. They receive the monitor's
//! [`CancelToken`] at evaluation time and must end soon after it is cancelled;
//! the worker never checks the token itself.
//!
//! If `evaluate` fails, the condition produced neither shape and the worker
//! exits without running the action.

use std::fmt;

use anyhow::Result;

use crate::cancel::CancelToken;

/// A resumable sequence of evaluations. `None` means the sequence is exhausted.
pub type BoolStream = Box<dyn Iterator<Item = Result<bool>> + Send>;

/// The result of invoking a condition.
pub enum Evaluation {
    Immediate(bool),
    Stream(BoolStream),
}

impl Evaluation {
    /// Wrap any fallible boolean iterator as a continuous evaluation.
    pub fn stream<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Result<bool>>,
        I::IntoIter: Send + 'static,
    {
        Evaluation::Stream(Box::new(iter.into_iter()))
    }

    /// Wrap an infallible boolean iterator as a continuous evaluation.
    pub fn from_bools<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = bool>,
        I::IntoIter: Send + 'static,
    {
        Evaluation::Stream(Box::new(iter.into_iter().map(Ok)))
    }
}

impl From<bool> for Evaluation {
    fn from(value: bool) -> Self {
        Evaluation::Immediate(value)
    }
}

impl fmt::Debug for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Evaluation::Immediate(value) => f.debug_tuple("Immediate").field(value).finish(),
            Evaluation::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Something a monitor can watch.
///
/// `evaluate` is called once each time the monitor's worker starts. Extra
/// parameters a condition needs are captured when it is constructed.
pub trait Condition: Send + 'static {
    fn evaluate(&mut self, cancel: &CancelToken) -> Result<Evaluation>;
}

impl Condition for Box<dyn Condition> {
    fn evaluate(&mut self, cancel: &CancelToken) -> Result<Evaluation> {
        (**self).evaluate(cancel)
    }
}

/// Condition backed by a closure. See [`from_fn`].
pub struct FnCondition<F> {
    f: F,
}

impl<F> Condition for FnCondition<F>
where
    F: FnMut(&CancelToken) -> Result<Evaluation> + Send + 'static,
{
    fn evaluate(&mut self, cancel: &CancelToken) -> Result<Evaluation> {
        (self.f)(cancel)
    }
}

/// Build a condition from a closure that returns either shape.
pub fn from_fn<F>(f: F) -> FnCondition<F>
where
    F: FnMut(&CancelToken) -> Result<Evaluation> + Send + 'static,
{
    FnCondition { f }
}

/// One-shot condition: the predicate is evaluated once per start.
pub fn once<F>(mut predicate: F) -> impl Condition
where
    F: FnMut() -> bool + Send + 'static,
{
    from_fn(move |_: &CancelToken| Ok(Evaluation::Immediate(predicate())))
}

/// Continuous condition built from a closure producing a boolean sequence.
///
/// The closure receives the monitor's token; the sequence it returns must
/// observe it.
pub fn sequence<F, I>(mut make: F) -> impl Condition
where
    F: FnMut(&CancelToken) -> I + Send + 'static,
    I: IntoIterator<Item = bool>,
    I::IntoIter: Send + 'static,
{
    from_fn(move |cancel: &CancelToken| Ok(Evaluation::from_bools(make(cancel))))
}

// src/action.rs

//! The action contract.
//!
//! An action runs on the worker thread every time the condition evaluates to
//! `true`. It reports back with a [`Flow`]:
//!
//! - `Ok(Flow::Continue)`: keep dispatching.
//! - `Ok(Flow::Quit)`: stop the worker cleanly after this invocation. This is
//!   a request, not a failure, and nothing is logged as an error.
//! - `Err(_)`: the invocation failed. The worker logs it and keeps going.

use anyhow::Result;

/// What the worker should do after an action invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    #[default]
    Continue,
    Quit,
}

/// Something a monitor runs when its condition holds.
///
/// Arguments are bound when the action is built (closure captures, struct
/// fields); the worker always calls `run` with no inputs.
pub trait Action: Send + 'static {
    fn run(&mut self) -> Result<Flow>;
}

impl Action for Box<dyn Action> {
    fn run(&mut self) -> Result<Flow> {
        (**self).run()
    }
}

/// Action backed by a closure. See [`from_fn`].
pub struct FnAction<F> {
    f: F,
}

impl<F> Action for FnAction<F>
where
    F: FnMut() -> Result<Flow> + Send + 'static,
{
    fn run(&mut self) -> Result<Flow> {
        (self.f)()
    }
}

pub fn from_fn<F>(f: F) -> FnAction<F>
where
    F: FnMut() -> Result<Flow> + Send + 'static,
{
    FnAction { f }
}

/// Action that cannot fail and never asks to quit.
pub fn infallible<F>(mut f: F) -> impl Action
where
    F: FnMut() + Send + 'static,
{
    from_fn(move || {
        f();
        Ok(Flow::Continue)
    })
}

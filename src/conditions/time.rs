// src/conditions/time.rs

use std::time::Duration;

use anyhow::Result;

use crate::cancel::CancelToken;
use crate::condition::{Condition, Evaluation};

use super::{PollingStream, Probe};

/// Holds once per interval, forever (until cancelled).
#[derive(Debug, Clone, Copy)]
pub struct Every {
    interval: Duration,
}

#[derive(Debug)]
pub struct TickProbe;

impl Probe for TickProbe {
    fn check(&mut self) -> Result<bool> {
        Ok(true)
    }
}

impl Every {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn stream(&self, cancel: &CancelToken) -> PollingStream<TickProbe> {
        PollingStream::new(TickProbe, cancel.clone(), self.interval)
    }
}

impl Condition for Every {
    fn evaluate(&mut self, cancel: &CancelToken) -> Result<Evaluation> {
        Ok(Evaluation::Stream(Box::new(self.stream(cancel))))
    }
}

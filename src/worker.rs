use std::thread;
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::channel::ProgressChannel;
use crate::error::ChannelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerReport {
    pub published: usize,
    pub elapsed: Duration,
}

/// Advances the step counter from 0 to `steps - 1`, one fixed-length step at
/// a time, publishing each step with whatever `payload` computes for it.
pub struct Worker<F> {
    steps: usize,
    step_duration: Duration,
    payload: F,
}

impl<F> Worker<F> {
    pub fn new(steps: usize, step_duration: Duration, payload: F) -> Self {
        Self {
            steps,
            step_duration,
            payload,
        }
    }

    pub fn run<C>(&self, channel: &C) -> Result<WorkerReport, ChannelError>
    where
        C: ProgressChannel + ?Sized,
        F: Fn(usize) -> Option<C::Payload>,
    {
        let start = Instant::now();
        debug!("worker: starting {} steps", self.steps);

        for i in 0..self.steps {
            thread::sleep(self.step_duration);
            let payload = (self.payload)(i);
            channel.publish(i, payload)?;
            trace!("worker: published {i}");
        }

        let report = WorkerReport {
            published: self.steps,
            elapsed: start.elapsed(),
        };
        debug!("worker: done in {:?}", report.elapsed);
        Ok(report)
    }
}

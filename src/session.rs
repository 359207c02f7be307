use std::fmt::Display;
use std::io::Write;
use std::thread;

use log::info;

use crate::channel::ProgressChannel;
use crate::config::RunConfig;
use crate::error::{ConfigError, RunError};
use crate::monitor::{Monitor, MonitorReport};
use crate::worker::{Worker, WorkerReport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub worker: WorkerReport,
    pub monitor: MonitorReport,
}

/// Closes the channel when the worker thread leaves `Worker::run`, whether it
/// returned or unwound, so a monitor waiting for the first publish wakes up.
struct CloseOnExit<'a, C: ProgressChannel>(&'a C);

impl<C: ProgressChannel> Drop for CloseOnExit<'_, C> {
    fn drop(&mut self) {
        self.0.close();
    }
}

/// Runs one worker against `channel` on a scoped thread while the calling
/// thread monitors it, then joins the worker.
pub fn run<C, F, W>(
    config: &RunConfig,
    channel: &C,
    payload: F,
    out: &mut W,
) -> Result<RunReport, RunError>
where
    C: ProgressChannel,
    C::Payload: Display,
    F: Fn(usize) -> Option<C::Payload> + Send,
    W: Write + ?Sized,
{
    config.validate()?;
    if channel.max_steps() != config.max_steps {
        return Err(ConfigError::ChannelSize {
            channel: channel.max_steps(),
            run: config.max_steps,
        }
        .into());
    }
    let worker = Worker::new(config.max_steps, config.step_duration, payload);
    let monitor = Monitor::new(config.max_steps, config.poll_interval)
        .await_first_publish(config.await_first_publish);

    info!(
        "running {} steps of {:?}, polling every {:?} (about {} polls)",
        config.max_steps,
        config.step_duration,
        config.poll_interval,
        config.expected_polls()
    );

    thread::scope(|s| {
        let handle = thread::Builder::new()
            .name("worker".into())
            .spawn_scoped(s, move || {
                let _close = CloseOnExit(channel);
                worker.run(channel)
            })
            .map_err(RunError::Spawn)?;

        let monitored = monitor.run(channel, out, || handle.is_finished());
        let worker = handle.join().map_err(|_| RunError::WorkerPanicked)??;
        let monitor = monitored?;

        info!(
            "worker published {} steps in {:?}; monitor printed {} lines",
            worker.published,
            worker.elapsed,
            monitor.lines()
        );
        Ok(RunReport { worker, monitor })
    })
}

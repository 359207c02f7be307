use std::fmt::Display;
use std::io::Write;
use std::thread;
use std::time::Duration;

use log::{debug, warn};

use crate::channel::{ProgressChannel, Snapshot};
use crate::error::MonitorError;

/// One report line: `<step>/<max>` or `<step>/<max> <payload>`.
pub fn format_line<P: Display>(snapshot: &Snapshot<P>, max: usize) -> String {
    match &snapshot.payload {
        Some(payload) => format!("{}/{max} {payload}", snapshot.step),
        None => format!("{}/{max}", snapshot.step),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorReport {
    /// Step read on each poll, in order.
    pub observed: Vec<usize>,
    /// Set when the monitor stopped because the worker exited early.
    pub worker_exited_early: bool,
}

impl MonitorReport {
    pub fn lines(&self) -> usize {
        self.observed.len()
    }

    pub fn last_step(&self) -> Option<usize> {
        self.observed.last().copied()
    }

    pub fn is_non_decreasing(&self) -> bool {
        self.observed.windows(2).all(|w| w[0] <= w[1])
    }
}

/// Polls a channel at a fixed interval and prints one line per poll until the
/// last step has been observed.
#[derive(Debug, Clone)]
pub struct Monitor {
    max_steps: usize,
    poll_interval: Duration,
    await_first_publish: bool,
}

impl Monitor {
    pub fn new(max_steps: usize, poll_interval: Duration) -> Self {
        Self {
            max_steps,
            poll_interval,
            await_first_publish: false,
        }
    }

    pub fn await_first_publish(mut self, await_first: bool) -> Self {
        self.await_first_publish = await_first;
        self
    }

    /// `worker_exited` is checked after each poll. It lets the monitor stop
    /// when the worker died before reaching the last step. When awaiting the
    /// first publish, a channel closed with nothing published ends the run
    /// without printing.
    pub fn run<C, W, E>(
        &self,
        channel: &C,
        out: &mut W,
        worker_exited: E,
    ) -> Result<MonitorReport, MonitorError>
    where
        C: ProgressChannel + ?Sized,
        C::Payload: Display,
        W: Write + ?Sized,
        E: Fn() -> bool,
    {
        let last = self.max_steps.saturating_sub(1);
        let mut report = MonitorReport::default();

        if self.await_first_publish {
            debug!("monitor: waiting for first publish");
            if !channel.wait_published() {
                warn!("monitor: channel closed before the worker published anything");
                report.worker_exited_early = true;
                return Ok(report);
            }
        }

        loop {
            // Sampled before the read so that a finished worker's final
            // publish is included in this poll.
            let exited = worker_exited();
            thread::sleep(self.poll_interval);
            let snapshot = channel.read();

            if let Some(previous) = report.last_step().filter(|&p| snapshot.step < p) {
                warn!("monitor: step went backwards from {previous} to {}", snapshot.step);
            }

            writeln!(out, "{}", format_line(&snapshot, self.max_steps))?;
            out.flush()?;
            report.observed.push(snapshot.step);

            if snapshot.step >= last {
                break;
            }
            if exited {
                warn!("monitor: worker exited at step {} of {}", snapshot.step, self.max_steps);
                report.worker_exited_early = true;
                break;
            }
        }

        debug!("monitor: stopped after {} polls", report.lines());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::*;
    use crate::channel::{AtomicChannel, LockedChannel, MemoryOrdering};

    #[test]
    fn formats_with_and_without_payload() {
        let bare: Snapshot<Infallible> = Snapshot {
            step: 12,
            payload: None,
        };
        assert_eq!(format_line(&bare, 1000), "12/1000");

        let labelled = Snapshot {
            step: 999,
            payload: Some("finishing"),
        };
        assert_eq!(format_line(&labelled, 1000), "999/1000 finishing");
    }

    #[test]
    fn stops_once_last_step_is_observed() {
        let channel = LockedChannel::new(10);
        channel.publish(9, Some("done")).unwrap();

        let mut out = Vec::new();
        let report = Monitor::new(10, Duration::from_millis(1))
            .run(&channel, &mut out, || false)
            .unwrap();

        assert_eq!(report.observed, vec![9]);
        assert!(!report.worker_exited_early);
        assert_eq!(String::from_utf8(out).unwrap(), "9/10 done\n");
    }

    #[test]
    fn stops_when_worker_exits_early() {
        let channel = AtomicChannel::new(10, MemoryOrdering::Relaxed);
        channel.publish(3, None).unwrap();

        let mut out = Vec::new();
        let report = Monitor::new(10, Duration::from_millis(1))
            .run(&channel, &mut out, || true)
            .unwrap();

        assert_eq!(report.last_step(), Some(3));
        assert!(report.worker_exited_early);
        assert_eq!(String::from_utf8(out).unwrap(), "3/10\n");
    }

    #[test]
    fn closed_empty_channel_ends_the_await_without_output() {
        let channel = LockedChannel::<usize>::new(10);
        channel.close();

        let mut out = Vec::new();
        let report = Monitor::new(10, Duration::from_millis(1))
            .await_first_publish(true)
            .run(&channel, &mut out, || false)
            .unwrap();

        assert!(report.worker_exited_early);
        assert_eq!(report.lines(), 0);
        assert!(out.is_empty());
    }

    #[test]
    fn report_tracks_ordering() {
        let report = MonitorReport {
            observed: vec![0, 3, 3, 9],
            worker_exited_early: false,
        };
        assert!(report.is_non_decreasing());
        assert_eq!(report.lines(), 4);

        let report = MonitorReport {
            observed: vec![4, 2],
            worker_exited_early: false,
        };
        assert!(!report.is_non_decreasing());
    }
}

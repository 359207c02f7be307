use std::convert::Infallible;
use std::fmt;
use std::io::Write;

use clap::ValueEnum;
use log::warn;

use crate::channel::{
    AtomicChannel, LockedChannel, MemoryOrdering, SlotChannel, SplitAtomicChannel,
};
use crate::config::RunConfig;
use crate::error::RunError;
use crate::labels::LabelTable;
use crate::session::{self, RunReport};

/// The progress-reporting demos, one per synchronization strategy.
///
/// The labelled demos always wait for the worker's first step before polling,
/// so each of their lines pairs a step with a label. The unlabelled ones follow
/// [`RunConfig::await_first_publish`] and may print `0/<max>` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Demo {
    /// Step behind a mutex.
    Mutex,
    /// Step in a sequentially consistent atomic.
    SimpleAtomic,
    /// Step in a relaxed atomic.
    RelaxedAtomic,
    /// Step and label behind one mutex.
    LabelledMutex,
    /// Step and label in two separate atomics. Can print mismatched pairs.
    LabelledSimpleAtomic,
    /// Per-step payload slots published with release/acquire.
    AtomicWithData,
}

impl Demo {
    pub const ALL: [Demo; 6] = [
        Demo::Mutex,
        Demo::SimpleAtomic,
        Demo::RelaxedAtomic,
        Demo::LabelledMutex,
        Demo::LabelledSimpleAtomic,
        Demo::AtomicWithData,
    ];

    pub fn is_labelled(self) -> bool {
        matches!(
            self,
            Demo::LabelledMutex | Demo::LabelledSimpleAtomic | Demo::AtomicWithData
        )
    }

    /// True for the demo whose label may not belong to the printed step.
    pub fn is_hazardous(self) -> bool {
        self == Demo::LabelledSimpleAtomic
    }

    pub fn run<W>(
        self,
        config: &RunConfig,
        labels: &LabelTable,
        out: &mut W,
    ) -> Result<RunReport, RunError>
    where
        W: Write + ?Sized,
    {
        let max = config.max_steps;
        let awaiting;
        let config = if self.is_labelled() && !config.await_first_publish {
            awaiting = RunConfig {
                await_first_publish: true,
                ..config.clone()
            };
            &awaiting
        } else {
            config
        };
        if self.is_hazardous() {
            warn!("{self}: step and label are stored separately; printed pairs may not match");
        }

        match self {
            Demo::Mutex => {
                let channel = LockedChannel::<Infallible>::new(max);
                session::run(config, &channel, |_| None, out)
            }
            Demo::SimpleAtomic => {
                let channel = AtomicChannel::new(max, MemoryOrdering::SeqCst);
                session::run(config, &channel, |_| None, out)
            }
            Demo::RelaxedAtomic => {
                let channel = AtomicChannel::new(max, MemoryOrdering::Relaxed);
                session::run(config, &channel, |_| None, out)
            }
            Demo::LabelledMutex => {
                let channel = LockedChannel::new(max);
                session::run(config, &channel, |i| Some(labels.label_for(i, max)), out)
            }
            Demo::LabelledSimpleAtomic => {
                let channel = SplitAtomicChannel::new(max, MemoryOrdering::SeqCst);
                channel.publish_label(labels.entry_for(0, max));
                session::run(config, &channel, |i| Some(labels.entry_for(i, max)), out)
            }
            Demo::AtomicWithData => {
                let channel = SlotChannel::new(max);
                session::run(
                    config,
                    &channel,
                    |i| Some(labels.label_for(i, max).to_string()),
                    out,
                )
            }
        }
    }
}

impl fmt::Display for Demo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_possible_value() {
            Some(value) => f.write_str(value.get_name()),
            None => write!(f, "{self:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn quick() -> RunConfig {
        RunConfig {
            max_steps: 50,
            step_duration: Duration::from_millis(1),
            poll_interval: Duration::from_millis(7),
            await_first_publish: false,
        }
    }

    #[test]
    fn names_match_cli_values() {
        assert_eq!(Demo::Mutex.to_string(), "mutex");
        assert_eq!(Demo::LabelledSimpleAtomic.to_string(), "labelled-simple-atomic");
        assert_eq!(Demo::AtomicWithData.to_string(), "atomic-with-data");
    }

    #[test]
    fn only_split_labels_are_hazardous() {
        let hazardous: Vec<_> = Demo::ALL.iter().filter(|d| d.is_hazardous()).collect();
        assert_eq!(hazardous, vec![&Demo::LabelledSimpleAtomic]);
    }

    #[test]
    fn every_demo_runs_to_the_last_step() {
        let config = quick();
        let labels = LabelTable::default();
        for demo in Demo::ALL {
            let mut out = Vec::new();
            let report = demo.run(&config, &labels, &mut out).unwrap();
            assert_eq!(report.monitor.last_step(), Some(49), "{demo}");
            assert!(report.monitor.is_non_decreasing(), "{demo}");

            let text = String::from_utf8(out).unwrap();
            let fields = if demo.is_labelled() { 2 } else { 1 };
            for line in text.lines() {
                assert_eq!(line.split(' ').count(), fields, "{demo}: {line:?}");
            }
        }
    }

    #[test]
    fn labelled_demos_never_print_a_bare_first_line() {
        // Polling much faster than the worker starts would catch `0/5` if
        // the labelled demos did not wait for the first step.
        let config = RunConfig {
            step_duration: Duration::from_millis(20),
            poll_interval: Duration::from_millis(1),
            max_steps: 5,
            await_first_publish: false,
        };
        let labels = LabelTable::default();
        for demo in Demo::ALL.into_iter().filter(|d| d.is_labelled()) {
            let mut out = Vec::new();
            demo.run(&config, &labels, &mut out).unwrap();
            let text = String::from_utf8(out).unwrap();
            let first = text.lines().next().unwrap();
            assert_eq!(first.split(' ').count(), 2, "{demo}: {first:?}");
        }
    }

    #[test]
    fn consistent_labelled_demos_end_on_the_last_label() {
        let config = quick();
        let labels = LabelTable::default();
        for demo in [Demo::LabelledMutex, Demo::AtomicWithData] {
            let mut out = Vec::new();
            demo.run(&config, &labels, &mut out).unwrap();
            let text = String::from_utf8(out).unwrap();
            assert_eq!(text.lines().last(), Some("49/50 finishing"), "{demo}");
        }
    }
}

use std::convert::Infallible;

use super::step::StepCell;
use super::{check_range, MemoryOrdering, ProgressChannel, Snapshot};
use crate::error::ChannelError;

/// A single atomic step counter and nothing else.
///
/// Any ordering is sound here because the counter is the only shared datum.
/// Do not pair it with a second field; see [`super::SplitAtomicChannel`].
#[derive(Debug)]
pub struct AtomicChannel {
    step: StepCell,
    ordering: MemoryOrdering,
    max_steps: usize,
}

impl AtomicChannel {
    pub fn new(max_steps: usize, ordering: MemoryOrdering) -> Self {
        Self {
            step: StepCell::new(),
            ordering,
            max_steps,
        }
    }
}

impl ProgressChannel for AtomicChannel {
    type Payload = Infallible;

    fn max_steps(&self) -> usize {
        self.max_steps
    }

    fn publish(&self, step: usize, _payload: Option<Infallible>) -> Result<(), ChannelError> {
        check_range(step, self.max_steps)?;
        self.step.advance(step, self.ordering.store())
    }

    fn read(&self) -> Snapshot<Infallible> {
        match self.step.load(self.ordering.load()) {
            Some(step) => Snapshot {
                step,
                payload: None,
            },
            None => Snapshot::empty(),
        }
    }

    fn wait_published(&self) -> bool {
        self.step.wait_published()
    }

    fn close(&self) {
        self.step.close();
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn publishes_under_every_ordering() {
        for ordering in [
            MemoryOrdering::Relaxed,
            MemoryOrdering::AcquireRelease,
            MemoryOrdering::SeqCst,
        ] {
            let channel = AtomicChannel::new(100, ordering);
            assert_eq!(channel.read().step, 0);
            channel.publish(0, None).unwrap();
            channel.publish(42, None).unwrap();
            assert_eq!(channel.read().step, 42);
            assert_eq!(
                channel.publish(41, None),
                Err(ChannelError::Regressed { step: 41, last: 42 })
            );
            assert_eq!(
                channel.publish(100, None),
                Err(ChannelError::StepOutOfRange { step: 100, max: 100 })
            );
        }
    }

    #[test]
    fn reader_sees_non_decreasing_steps_ending_at_last() {
        const MAX: usize = 200;
        let channel = AtomicChannel::new(MAX, MemoryOrdering::Relaxed);

        thread::scope(|s| {
            s.spawn(|| {
                for i in 0..MAX {
                    thread::sleep(Duration::from_micros(50));
                    channel.publish(i, None).unwrap();
                }
            });

            let mut seen = Vec::new();
            loop {
                let step = channel.read().step;
                seen.push(step);
                if step == MAX - 1 {
                    break;
                }
                thread::sleep(Duration::from_millis(1));
            }
            assert!(seen.windows(2).all(|w| w[0] <= w[1]));
            assert_eq!(seen.last(), Some(&(MAX - 1)));
        });
    }

    #[test]
    fn wait_published_blocks_until_worker_starts() {
        let channel = AtomicChannel::new(10, MemoryOrdering::Relaxed);
        thread::scope(|s| {
            s.spawn(|| {
                thread::sleep(Duration::from_millis(10));
                channel.publish(0, None).unwrap();
            });
            assert!(channel.wait_published());
        });
        assert_eq!(channel.read().step, 0);
    }
}

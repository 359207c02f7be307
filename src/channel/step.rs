use std::sync::atomic::Ordering::{Acquire, Relaxed, Release};
use std::sync::atomic::{AtomicU32, Ordering};

use crate::config::MAX_STEPS_LIMIT;
use crate::error::ChannelError;

const CLOSED: u32 = 1 << 31;

/// Atomic step counter stored as `step + 1`, so 0 means nothing has been
/// published yet. The top bit marks the channel closed. One `AtomicU32` so the
/// monitor can futex-wait on publish and close alike.
#[derive(Debug, Default)]
pub(super) struct StepCell {
    state: AtomicU32,
}

impl StepCell {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Moves the counter to `step`. Equal steps are accepted, lower ones are not.
    pub(super) fn advance(&self, step: usize, ordering: Ordering) -> Result<(), ChannelError> {
        if step >= MAX_STEPS_LIMIT {
            return Err(ChannelError::StepOutOfRange {
                step,
                max: MAX_STEPS_LIMIT,
            });
        }
        let encoded = step as u32 + 1;

        let updated = self.state.fetch_update(ordering, Relaxed, |state| {
            (state & CLOSED == 0 && state <= encoded).then_some(encoded)
        });
        match updated {
            Ok(0) => {
                atomic_wait::wake_all(&self.state);
                Ok(())
            }
            Ok(_) => Ok(()),
            Err(state) if state & CLOSED != 0 => Err(ChannelError::Closed { step }),
            Err(state) => Err(ChannelError::Regressed {
                step,
                last: state as usize - 1,
            }),
        }
    }

    pub(super) fn load(&self, ordering: Ordering) -> Option<usize> {
        match self.state.load(ordering) & !CLOSED {
            0 => None,
            n => Some(n as usize - 1),
        }
    }

    pub(super) fn is_closed(&self) -> bool {
        self.state.load(Relaxed) & CLOSED != 0
    }

    pub(super) fn close(&self) {
        self.state.fetch_or(CLOSED, Release);
        atomic_wait::wake_all(&self.state);
    }

    /// True once a step is published, false if closed before that.
    pub(super) fn wait_published(&self) -> bool {
        loop {
            let state = self.state.load(Acquire);
            if state & !CLOSED != 0 {
                return true;
            }
            if state & CLOSED != 0 {
                return false;
            }
            atomic_wait::wait(&self.state, state);
        }
    }
}

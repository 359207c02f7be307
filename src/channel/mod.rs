//! Shared progress state between one worker and one monitor.
//!
//! Every channel offers the same contract: the worker publishes a step (plus an
//! optional payload) and the monitor reads the latest snapshot. They differ in
//! how much of the snapshot is guaranteed to be consistent:
//!
//! * [`LockedChannel`]: step and payload behind one mutex. Always consistent.
//! * [`AtomicChannel`]: a lone atomic step. No payload at all.
//! * [`SplitAtomicChannel`]: atomic step plus a second atomic label pointer.
//!   The pair can tear. Kept to demonstrate exactly that.
//! * [`SlotChannel`]: payload written into a per-step slot, then the step is
//!   released. The acquire load on the reader side makes the slot visible.

use std::sync::atomic::Ordering;

use crate::error::ChannelError;

mod atomic;
mod locked;
mod slots;
mod split;
mod step;

pub use atomic::AtomicChannel;
pub use locked::LockedChannel;
pub use slots::SlotChannel;
pub use split::SplitAtomicChannel;

/// Latest progress as seen by a reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<P> {
    pub step: usize,
    pub payload: Option<P>,
}

impl<P> Snapshot<P> {
    /// What a reader sees before the first publish. Shown as step 0.
    pub fn empty() -> Self {
        Self {
            step: 0,
            payload: None,
        }
    }
}

/// Memory ordering used by the lock-free channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryOrdering {
    /// Atomic on the counter itself, no ordering for anything else.
    Relaxed,
    /// Release on publish, acquire on read.
    AcquireRelease,
    SeqCst,
}

impl MemoryOrdering {
    pub fn store(self) -> Ordering {
        match self {
            MemoryOrdering::Relaxed => Ordering::Relaxed,
            MemoryOrdering::AcquireRelease => Ordering::Release,
            MemoryOrdering::SeqCst => Ordering::SeqCst,
        }
    }

    pub fn load(self) -> Ordering {
        match self {
            MemoryOrdering::Relaxed => Ordering::Relaxed,
            MemoryOrdering::AcquireRelease => Ordering::Acquire,
            MemoryOrdering::SeqCst => Ordering::SeqCst,
        }
    }
}

pub trait ProgressChannel: Sync {
    type Payload: Send;

    fn max_steps(&self) -> usize;

    /// Worker side. Steps must stay below `max_steps` and never go backwards.
    fn publish(&self, step: usize, payload: Option<Self::Payload>) -> Result<(), ChannelError>;

    /// Monitor side. Never blocks on the worker beyond a short critical section.
    fn read(&self) -> Snapshot<Self::Payload>;

    /// Blocks until the worker has published at least once or the channel is
    /// closed. Returns false if it was closed with nothing published.
    fn wait_published(&self) -> bool;

    /// Marks the worker as finished. Releases `wait_published` callers;
    /// later publishes fail with [`ChannelError::Closed`].
    fn close(&self);
}

fn check_range(step: usize, max: usize) -> Result<(), ChannelError> {
    if step >= max {
        return Err(ChannelError::StepOutOfRange { step, max });
    }
    Ok(())
}

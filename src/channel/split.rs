use std::marker::PhantomData;
use std::ptr;
use std::sync::atomic::AtomicPtr;

use super::step::StepCell;
use super::{check_range, MemoryOrdering, ProgressChannel, Snapshot};
use crate::error::ChannelError;

/// Atomic step plus an independently stored atomic label pointer.
///
/// **Hazard.** The two fields are updated by separate stores, so a reader can
/// pick up the new step together with the previous label (or no label at all
/// before the first one lands). No choice of [`MemoryOrdering`] closes that
/// window: ordering constrains visibility of each store, not atomicity of the
/// pair. Use [`super::LockedChannel`] or [`super::SlotChannel`] when the label
/// has to match the step.
///
/// The label pointer always refers into a table that outlives the channel, so
/// a torn read is stale, never dangling.
#[derive(Debug)]
pub struct SplitAtomicChannel<'a, P> {
    step: StepCell,
    label: AtomicPtr<P>,
    ordering: MemoryOrdering,
    max_steps: usize,
    _table: PhantomData<&'a P>,
}

impl<'a, P> SplitAtomicChannel<'a, P> {
    pub fn new(max_steps: usize, ordering: MemoryOrdering) -> Self {
        Self {
            step: StepCell::new(),
            label: AtomicPtr::new(ptr::null_mut()),
            ordering,
            max_steps,
            _table: PhantomData,
        }
    }

    /// First half of [`ProgressChannel::publish`].
    pub fn publish_step(&self, step: usize) -> Result<(), ChannelError> {
        check_range(step, self.max_steps)?;
        self.step.advance(step, self.ordering.store())
    }

    /// Second half of [`ProgressChannel::publish`].
    pub fn publish_label(&self, label: &'a P) {
        // Only ever read back as a shared reference.
        let raw = label as *const P as *mut P;
        self.label.store(raw, self.ordering.store());
    }
}

impl<'a, P: Sync> ProgressChannel for SplitAtomicChannel<'a, P> {
    type Payload = &'a P;

    fn max_steps(&self) -> usize {
        self.max_steps
    }

    fn publish(&self, step: usize, payload: Option<&'a P>) -> Result<(), ChannelError> {
        self.publish_step(step)?;
        if let Some(label) = payload {
            self.publish_label(label);
        }
        Ok(())
    }

    fn read(&self) -> Snapshot<&'a P> {
        let step = self.step.load(self.ordering.load());
        let label = self.label.load(self.ordering.load());
        // SAFETY: non-null pointers come from `&'a P` in `publish_label` and the
        // pointee is never mutated for 'a.
        let payload = unsafe { label.cast_const().as_ref() };
        Snapshot {
            step: step.unwrap_or(0),
            payload,
        }
    }

    fn wait_published(&self) -> bool {
        self.step.wait_published()
    }

    fn close(&self) {
        self.step.close();
    }
}

use std::cell::UnsafeCell;
use std::fmt;
use std::mem::MaybeUninit;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering::{Acquire, Relaxed, Release};

use super::step::StepCell;
use super::{check_range, ProgressChannel, Snapshot};
use crate::error::ChannelError;

struct Slot<T> {
    value: UnsafeCell<MaybeUninit<T>>,
    claimed: AtomicBool,
    ready: AtomicBool,
}

impl<T> Slot<T> {
    fn new() -> Self {
        Self {
            value: UnsafeCell::new(MaybeUninit::uninit()),
            claimed: AtomicBool::new(false),
            ready: AtomicBool::new(false),
        }
    }
}

/// Lock-free progress with a per-step payload.
///
/// Each step owns a write-once slot. Publishing writes the slot, then releases
/// the step; reading acquires the step, then reads that step's slot. The
/// release/acquire pair is what makes the slot write visible to the reader.
pub struct SlotChannel<T> {
    slots: Box<[Slot<T>]>,
    step: StepCell,
}

// Writers move a `T` in, readers clone it out through `&T` on another thread.
unsafe impl<T: Send + Sync> Sync for SlotChannel<T> {}

impl<T> SlotChannel<T> {
    pub fn new(max_steps: usize) -> Self {
        Self {
            slots: (0..max_steps).map(|_| Slot::new()).collect(),
            step: StepCell::new(),
        }
    }

    /// Payload of an already published step, or `None` if `step` has not been
    /// published yet or was skipped.
    pub fn get(&self, step: usize) -> Option<&T> {
        let last = self.step.load(Acquire)?;
        if step > last {
            return None;
        }
        let slot = self.slots.get(step)?;
        if !slot.ready.load(Acquire) {
            return None;
        }
        // SAFETY: `ready` is only set after the slot was initialized, and an
        // initialized slot is never written again.
        Some(unsafe { (*slot.value.get()).assume_init_ref() })
    }
}

impl<T> fmt::Debug for SlotChannel<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotChannel")
            .field("max_steps", &self.slots.len())
            .field("published", &self.step.load(Relaxed))
            .field("closed", &self.step.is_closed())
            .finish()
    }
}

impl<T> Drop for SlotChannel<T> {
    fn drop(&mut self) {
        for slot in self.slots.iter_mut() {
            if *slot.ready.get_mut() {
                // SAFETY: ready slots hold an initialized value, dropped once here.
                unsafe { slot.value.get_mut().assume_init_drop() }
            }
        }
    }
}

impl<T: Clone + Send + Sync> ProgressChannel for SlotChannel<T> {
    type Payload = T;

    fn max_steps(&self) -> usize {
        self.slots.len()
    }

    fn publish(&self, step: usize, payload: Option<T>) -> Result<(), ChannelError> {
        check_range(step, self.slots.len())?;
        if self.step.is_closed() {
            return Err(ChannelError::Closed { step });
        }
        if let Some(last) = self.step.load(Relaxed).filter(|&last| step < last) {
            return Err(ChannelError::Regressed { step, last });
        }

        if let Some(value) = payload {
            let slot = &self.slots[step];
            if slot.claimed.swap(true, Relaxed) {
                return Err(ChannelError::SlotReused { step });
            }
            // SAFETY: the claim above gives this call exclusive access to the
            // slot, and readers ignore it until `ready` is set.
            unsafe { (*slot.value.get()).write(value) };
            slot.ready.store(true, Release);
        }

        self.step.advance(step, Release)
    }

    fn read(&self) -> Snapshot<T> {
        match self.step.load(Acquire) {
            Some(step) => Snapshot {
                step,
                payload: self.get(step).cloned(),
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

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use super::{check_range, ProgressChannel, Snapshot};
use crate::error::ChannelError;

#[derive(Debug)]
struct State<P> {
    step: Option<usize>,
    payload: Option<P>,
    closed: bool,
}

/// Step and payload guarded by one mutex.
///
/// Every snapshot is a pair the worker actually wrote in a single critical
/// section. Costs one lock per publish and one per read.
#[derive(Debug)]
pub struct LockedChannel<P> {
    state: Mutex<State<P>>,
    first_publish: Condvar,
    max_steps: usize,
}

impl<P> LockedChannel<P> {
    pub fn new(max_steps: usize) -> Self {
        Self {
            state: Mutex::new(State {
                step: None,
                payload: None,
                closed: false,
            }),
            first_publish: Condvar::new(),
            max_steps,
        }
    }

    // Step and payload are assigned together under the lock, so a poisoned
    // guard still holds a pair the worker wrote.
    fn lock(&self) -> MutexGuard<'_, State<P>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P: Clone + Send> ProgressChannel for LockedChannel<P> {
    type Payload = P;

    fn max_steps(&self) -> usize {
        self.max_steps
    }

    fn publish(&self, step: usize, payload: Option<P>) -> Result<(), ChannelError> {
        check_range(step, self.max_steps)?;
        let mut state = self.lock();
        if state.closed {
            return Err(ChannelError::Closed { step });
        }
        if let Some(last) = state.step.filter(|&last| step < last) {
            return Err(ChannelError::Regressed { step, last });
        }
        let first = state.step.is_none();
        state.step = Some(step);
        state.payload = payload;
        drop(state);
        if first {
            self.first_publish.notify_all();
        }
        Ok(())
    }

    fn read(&self) -> Snapshot<P> {
        let state = self.lock();
        match state.step {
            Some(step) => Snapshot {
                step,
                payload: state.payload.clone(),
            },
            None => Snapshot::empty(),
        }
    }

    fn wait_published(&self) -> bool {
        let state = self
            .first_publish
            .wait_while(self.lock(), |state| state.step.is_none() && !state.closed)
            .unwrap_or_else(PoisonError::into_inner);
        state.step.is_some()
    }

    fn close(&self) {
        self.lock().closed = true;
        self.first_publish.notify_all();
    }
}

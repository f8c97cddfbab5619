//! Reusable rendezvous point for concurrency tests

use parking_lot::{Condvar, Mutex};
use tracing::trace;

#[derive(Debug)]
struct BarrierState {
    waiting: usize,
    generation: u64,
}

/// Cyclic barrier: `count` participants must call [`ThreadBarrier::wait`] before
/// any of them returns, and the barrier can be reused for the next round.
///
/// There is no timeout. A participant that never arrives hangs the others; a
/// wedged test is left to the external process timeout.
#[derive(Debug)]
pub struct ThreadBarrier {
    count: usize,
    state: Mutex<BarrierState>,
    released: Condvar,
}

impl ThreadBarrier {
    /// # Panics
    ///
    /// Panics if `count` is zero.
    pub fn new(count: usize) -> Self {
        assert!(count > 0, "barrier needs at least one participant");
        Self {
            count,
            state: Mutex::new(BarrierState {
                waiting: 0,
                generation: 0,
            }),
            released: Condvar::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Block until all participants of the current generation have arrived.
    ///
    /// Returns `true` on exactly one participant per generation (the last to arrive).
    pub fn wait(&self) -> bool {
        let mut state = self.state.lock();
        let generation = state.generation;
        state.waiting += 1;

        if state.waiting == self.count {
            state.waiting = 0;
            state.generation = state.generation.wrapping_add(1);
            trace!(generation, participants = self.count, "barrier released");
            self.released.notify_all();
            return true;
        }

        // Spurious wakeups and early re-entry for the next round both leave the
        // generation unchanged for a thread that has not been released yet.
        while state.generation == generation {
            self.released.wait(&mut state);
        }
        false
    }
}

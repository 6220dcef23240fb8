use std::sync::{Arc, Mutex, PoisonError};

use crate::shutdown::{ExitStatus, ShutdownSignal};

#[derive(Debug)]
struct CounterState {
    remaining: usize,
    fired: bool,
}

/// Number of workers still running, guarded by a single lock.
///
/// The decrement, the zero check, and the shutdown request happen in one
/// critical section, so exactly one worker ever observes the count reach
/// zero and fires shutdown.
#[derive(Debug)]
pub struct CompletionCounter {
    state: Mutex<CounterState>,
    shutdown: Arc<ShutdownSignal>,
}

impl CompletionCounter {
    #[must_use]
    pub const fn new(workers: usize, shutdown: Arc<ShutdownSignal>) -> Self {
        Self {
            state: Mutex::new(CounterState {
                remaining: workers,
                fired: false,
            }),
            shutdown,
        }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remaining
    }

    /// Marks one worker finished. Returns `true` for the single call that
    /// requested shutdown.
    pub fn finish_one(&self) -> bool {
        // A worker that panicked while holding the lock left the state
        // consistent; keep counting.
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.remaining = state.remaining.saturating_sub(1);
        if state.remaining > 0 || state.fired {
            return false;
        }
        state.fired = true;
        self.shutdown.request(ExitStatus::Normal)
    }

    /// Returns a guard that calls [`CompletionCounter::finish_one`] when
    /// dropped, on every exit path including unwinding.
    #[must_use]
    pub const fn guard(&self) -> CompletionGuard<'_> {
        CompletionGuard { counter: self }
    }
}

#[derive(Debug)]
pub struct CompletionGuard<'counter> {
    counter: &'counter CompletionCounter,
}

impl Drop for CompletionGuard<'_> {
    fn drop(&mut self) {
        self.counter.finish_one();
    }
}

use std::sync::atomic::{AtomicU8, Ordering};

/// Process-level state machine driven by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ProcessState {
    Starting = 0,
    Running = 1,
    ShuttingDown = 2,
    Terminated = 3,
}

impl ProcessState {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => ProcessState::Starting,
            1 => ProcessState::Running,
            2 => ProcessState::ShuttingDown,
            _ => ProcessState::Terminated,
        }
    }

    /// Whether `next` may directly follow `self`. A failed startup skips
    /// `Running`; nothing ever goes back.
    #[must_use]
    pub const fn can_advance_to(self, next: ProcessState) -> bool {
        matches!(
            (self, next),
            (ProcessState::Starting, ProcessState::Running)
                | (ProcessState::Starting, ProcessState::ShuttingDown)
                | (ProcessState::Running, ProcessState::ShuttingDown)
                | (ProcessState::ShuttingDown, ProcessState::Terminated)
        )
    }
}

#[derive(Debug)]
pub struct Lifecycle {
    state: AtomicU8,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(ProcessState::Starting as u8),
        }
    }

    #[must_use]
    pub fn state(&self) -> ProcessState {
        ProcessState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Moves from `from` to `to`. Returns `false` if the transition is not
    /// allowed or the current state is not `from`; at most one caller wins
    /// any given transition.
    pub fn advance(&self, from: ProcessState, to: ProcessState) -> bool {
        if !from.can_advance_to(to) {
            return false;
        }
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

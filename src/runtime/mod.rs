//! Execution contexts: per-worker dispatchers and the process lifecycle.
mod dispatch;
mod lifecycle;

pub use dispatch::{DispatchContext, DispatcherBuilder, RunningDispatcher, RuntimeBuilder};
pub use lifecycle::{Lifecycle, ProcessState};

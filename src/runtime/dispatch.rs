use std::future::Future;
use std::time::Duration;

use tokio::runtime::{Builder, EnterGuard, Runtime};
use tracing::debug;

use crate::error::WorkerError;

/// Time given to a dispatcher's leftover tasks when it is destroyed.
const DISPATCH_SHUTDOWN_GRACE: Duration = Duration::from_millis(100);

/// A worker's private event-scheduling unit, created but not yet started.
///
/// Backed by a current-thread `tokio` runtime. It is owned by exactly one
/// worker thread and never shared.
#[derive(Debug)]
pub struct DispatchContext {
    name: String,
    runtime: Runtime,
}

impl DispatchContext {
    /// # Errors
    ///
    /// Returns [`WorkerError::DispatchContextCreation`] when the runtime
    /// cannot be built (for example, the I/O driver fails to initialize).
    pub fn create(name: &str) -> Result<Self, WorkerError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .thread_name(name)
            .build()
            .map_err(|err| WorkerError::DispatchContextCreation {
                name: name.to_owned(),
                source: err,
            })?;
        Ok(Self {
            name: name.to_owned(),
            runtime,
        })
    }

    /// Starts event processing. Connections can only be bound to a running
    /// dispatcher.
    #[must_use]
    pub fn start(self) -> RunningDispatcher {
        debug!("Dispatcher '{}' started", self.name);
        RunningDispatcher {
            name: self.name,
            runtime: self.runtime,
        }
    }
}

/// Creates the dispatch context each worker starts with.
pub trait DispatcherBuilder: Send + Sync {
    /// # Errors
    ///
    /// Returns [`WorkerError::DispatchContextCreation`] when no context can
    /// be created for `name`.
    fn create(&self, name: &str) -> Result<DispatchContext, WorkerError>;
}

/// Builds a fresh current-thread runtime per worker.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeBuilder;

impl DispatcherBuilder for RuntimeBuilder {
    fn create(&self, name: &str) -> Result<DispatchContext, WorkerError> {
        DispatchContext::create(name)
    }
}

#[derive(Debug)]
pub struct RunningDispatcher {
    name: String,
    runtime: Runtime,
}

impl RunningDispatcher {
    /// Drives `future` to completion on the calling thread, servicing this
    /// dispatcher's I/O and timers meanwhile.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Enters the dispatcher's context so I/O resources created in scope
    /// bind to it.
    #[must_use]
    pub fn enter(&self) -> EnterGuard<'_> {
        self.runtime.enter()
    }

    /// Stops the dispatcher. Any connection bound to it must already be gone.
    pub fn destroy(self) {
        debug!("Dispatcher '{}' destroyed", self.name);
        self.runtime.shutdown_timeout(DISPATCH_SHUTDOWN_GRACE);
    }
}

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::args::PositiveUsize;
use crate::error::{AppError, AppResult, StartupError};
use crate::http::ConnectionFactory;
use crate::runtime::RuntimeBuilder;
use crate::shutdown::ShutdownSignal;

use super::{CompletionCounter, RunStats, RunSummary, WorkerConfig, run_worker};

/// The running set of worker threads.
#[derive(Debug)]
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    counter: Arc<CompletionCounter>,
    stats: Arc<RunStats>,
}

impl WorkerPool {
    /// Threads started.
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.handles.len()
    }

    /// Workers that have not yet decremented the completion counter.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.counter.remaining()
    }

    #[must_use]
    pub fn summary(&self) -> RunSummary {
        self.stats.snapshot()
    }

    /// Joins every worker thread. Only call once shutdown was requested by
    /// the last worker, otherwise this blocks until they all finish.
    pub fn join(self) -> RunSummary {
        for handle in self.handles {
            let name = handle.thread().name().map(str::to_owned);
            if handle.join().is_err() {
                warn!("Worker thread {:?} panicked", name);
            }
        }
        self.stats.snapshot()
    }
}

/// Starts `workers` threads, each running [`run_worker`] with the shared
/// `config`. All threads start immediately.
///
/// # Errors
///
/// Returns [`StartupError::ThreadSpawn`] if a thread cannot be created.
/// Threads already started keep running; the caller is expected to abort.
pub fn start(
    workers: PositiveUsize,
    config: Arc<WorkerConfig>,
    factory: Arc<dyn ConnectionFactory>,
    shutdown: Arc<ShutdownSignal>,
) -> AppResult<WorkerPool> {
    let count = workers.get();
    let counter = Arc::new(CompletionCounter::new(count, shutdown));
    let stats = Arc::new(RunStats::default());
    let mut handles = Vec::with_capacity(count);

    for index in 0..count {
        let config = Arc::clone(&config);
        let factory = Arc::clone(&factory);
        let counter = Arc::clone(&counter);
        let stats = Arc::clone(&stats);

        let handle = thread::Builder::new()
            .name(format!("worker-{}", index))
            .spawn(move || {
                let report = run_worker(
                    index,
                    &config,
                    &RuntimeBuilder,
                    factory.as_ref(),
                    &counter,
                    &stats,
                );
                debug!("Worker {} exiting (failed: {})", report.index, report.failed());
            })
            .map_err(|err| {
                AppError::startup(StartupError::ThreadSpawn {
                    index,
                    source: err,
                })
            })?;
        handles.push(handle);
    }

    Ok(WorkerPool {
        handles,
        counter,
        stats,
    })
}

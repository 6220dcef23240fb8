//! Worker threads: configuration, lifecycle, and completion accounting.
mod config;
pub mod coordinator;
mod counter;
mod stats;


use tracing::{debug, error, warn};

use crate::error::WorkerError;
use crate::http::{ConnectionFactory, execute};
use crate::runtime::DispatcherBuilder;

pub use config::WorkerConfig;
pub use coordinator::{WorkerPool, start};
pub use counter::{CompletionCounter, CompletionGuard};
pub use stats::{RunStats, RunSummary};

/// How one worker's run went.
#[derive(Debug)]
pub struct WorkerReport {
    pub index: usize,
    /// Requests started, including the one that failed.
    pub attempts: u64,
    pub successes: u64,
    pub error: Option<WorkerError>,
}

impl WorkerReport {
    const fn new(index: usize) -> Self {
        Self {
            index,
            attempts: 0,
            successes: 0,
            error: None,
        }
    }

    #[must_use]
    pub const fn failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Body of a worker thread.
///
/// Runs up to `config.iterations` requests on a private dispatcher from
/// `dispatchers` and a connection from `factory`, records the result, and
/// then decrements `counter` whatever happened. The worker whose decrement
/// reaches zero requests shutdown.
pub fn run_worker(
    index: usize,
    config: &WorkerConfig,
    dispatchers: &dyn DispatcherBuilder,
    factory: &dyn ConnectionFactory,
    counter: &CompletionCounter,
    stats: &RunStats,
) -> WorkerReport {
    // Declared first so it drops last, after the dispatcher and connection.
    let _completion = counter.guard();
    let report = run_iterations(index, config, dispatchers, factory);
    stats.record(&report);
    report
}

fn run_iterations(
    index: usize,
    config: &WorkerConfig,
    dispatchers: &dyn DispatcherBuilder,
    factory: &dyn ConnectionFactory,
) -> WorkerReport {
    let mut report = WorkerReport::new(index);

    let dispatcher = match dispatchers.create(&format!("dispatch-{}", index)) {
        Ok(context) => context.start(),
        Err(err) => {
            error!("Worker {}: {}", index, err);
            report.error = Some(err);
            return report;
        }
    };

    let mut connection = match factory.create_connection(&dispatcher) {
        Ok(connection) => connection,
        Err(err) => {
            let err = WorkerError::ConnectionCreation { source: err };
            error!("Worker {}: {}", index, err);
            dispatcher.destroy();
            report.error = Some(err);
            return report;
        }
    };

    let iterations = config.iterations.get();
    for iteration in 1..=iterations {
        report.attempts = iteration;
        match execute(&dispatcher, connection.as_mut(), config) {
            Ok(_) => report.successes = report.successes.saturating_add(1),
            Err(err) => {
                warn!(
                    "Worker {}: {} failure on {}, skipping {} remaining request(s)",
                    index,
                    err.kind(),
                    config.url,
                    iterations.saturating_sub(iteration)
                );
                report.error = Some(WorkerError::Request {
                    iteration,
                    source: err,
                });
                break;
            }
        }
    }

    drop(connection);
    dispatcher.destroy();
    debug!(
        "Worker {} finished: {}/{} requests succeeded",
        index, report.successes, report.attempts
    );
    report
}

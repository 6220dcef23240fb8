//! Process driver: starts the worker pool and services events until the last
//! worker requests shutdown.
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::args::PositiveUsize;
use crate::error::{AppError, AppResult, StartupError};
use crate::http::ConnectionFactory;
use crate::runtime::{Lifecycle, ProcessState};
use crate::shutdown::{ExitStatus, ShutdownSignal};
use crate::worker::{self, RunSummary, WorkerConfig};

#[derive(Debug, Clone, Copy)]
pub struct DriverOptions {
    pub workers: PositiveUsize,
    /// Bound on the whole run; `None` services events until every worker is
    /// done, however long that takes.
    pub max_run_time: Option<Duration>,
    /// Turn any worker failure into [`ExitStatus::WorkerFailures`].
    pub fail_on_error: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct RunReport {
    pub status: ExitStatus,
    pub summary: RunSummary,
    pub final_state: ProcessState,
}

/// Runs a complete load test and returns how it ended.
///
/// # Errors
///
/// Returns an error when the driver runtime cannot be built or a worker
/// thread cannot be created.
pub fn run(
    options: &DriverOptions,
    config: WorkerConfig,
    factory: Arc<dyn ConnectionFactory>,
) -> AppResult<RunReport> {
    let lifecycle = Lifecycle::new();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::startup(StartupError::RuntimeBuild { source: err }))?;

    let shutdown = Arc::new(ShutdownSignal::new());
    info!(
        "Starting {} worker(s) x {} request(s): {} {}",
        options.workers.get(),
        config.iterations.get(),
        config.method,
        config.url
    );

    let pool = match worker::start(
        options.workers,
        Arc::new(config),
        factory,
        Arc::clone(&shutdown),
    ) {
        Ok(pool) => pool,
        Err(err) => {
            error!("Worker startup failed: {}", err);
            shutdown.request(ExitStatus::StartupFailed);
            lifecycle.advance(ProcessState::Starting, ProcessState::ShuttingDown);
            return Err(err);
        }
    };
    lifecycle.advance(ProcessState::Starting, ProcessState::Running);
    debug!("{} worker thread(s) started", pool.len());

    let status = match runtime.block_on(shutdown.wait_timeout(options.max_run_time)) {
        Some(status) => status,
        None => {
            // A worker may have finished right as the deadline fired; the
            // first request wins either way.
            shutdown.request(ExitStatus::DeadlineExceeded);
            shutdown.requested().unwrap_or(ExitStatus::DeadlineExceeded)
        }
    };
    lifecycle.advance(ProcessState::Running, ProcessState::ShuttingDown);

    let summary = if status == ExitStatus::Normal {
        pool.join()
    } else {
        warn!(
            "Run deadline exceeded with {} worker(s) still running",
            pool.remaining()
        );
        pool.summary()
    };
    drop(runtime);
    lifecycle.advance(ProcessState::ShuttingDown, ProcessState::Terminated);

    let status = if status == ExitStatus::Normal && options.fail_on_error && summary.workers_failed > 0
    {
        ExitStatus::WorkerFailures
    } else {
        status
    };
    info!("Run complete: {}", summary);

    Ok(RunReport {
        status,
        summary,
        final_state: lifecycle.state(),
    })
}

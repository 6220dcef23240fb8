use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::WorkerReport;

/// Run-wide tallies written by workers as they finish.
#[derive(Debug, Default)]
pub struct RunStats {
    workers_finished: AtomicU64,
    workers_failed: AtomicU64,
    setup_failures: AtomicU64,
    requests_ok: AtomicU64,
    requests_failed: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub workers_finished: u64,
    /// Workers that stopped early for any reason, setup failures included.
    pub workers_failed: u64,
    pub setup_failures: u64,
    pub requests_ok: u64,
    pub requests_failed: u64,
}

impl RunStats {
    pub fn record(&self, report: &WorkerReport) {
        self.requests_ok
            .fetch_add(report.successes, Ordering::Relaxed);
        if let Some(error) = report.error.as_ref() {
            self.workers_failed.fetch_add(1, Ordering::Relaxed);
            if error.is_setup_failure() {
                self.setup_failures.fetch_add(1, Ordering::Relaxed);
            } else {
                self.requests_failed.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.workers_finished.fetch_add(1, Ordering::Release);
    }

    #[must_use]
    pub fn snapshot(&self) -> RunSummary {
        RunSummary {
            workers_finished: self.workers_finished.load(Ordering::Acquire),
            workers_failed: self.workers_failed.load(Ordering::Relaxed),
            setup_failures: self.setup_failures.load(Ordering::Relaxed),
            requests_ok: self.requests_ok.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} worker(s) finished, {} failed ({} during setup); {} request(s) ok, {} failed",
            self.workers_finished,
            self.workers_failed,
            self.setup_failures,
            self.requests_ok,
            self.requests_failed
        )
    }
}

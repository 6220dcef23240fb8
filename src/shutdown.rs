//! Process-wide shutdown request, fired at most once.
use std::sync::OnceLock;
use std::time::Duration;

use tokio::sync::broadcast;

/// Broadcast channel size for shutdown notifications (single signal fan-out).
const SHUTDOWN_CHANNEL_CAPACITY: usize = 1;

/// Why the driver stopped servicing events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Every worker finished, whatever its individual outcome.
    Normal,
    /// At least one worker failed and the run was configured to report it.
    WorkerFailures,
    /// A fatal error before or while starting workers.
    StartupFailed,
    /// The configured run deadline elapsed before all workers finished.
    DeadlineExceeded,
}

impl ExitStatus {
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            ExitStatus::Normal => 0,
            ExitStatus::WorkerFailures => 1,
            ExitStatus::StartupFailed => 2,
            ExitStatus::DeadlineExceeded => 3,
        }
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        std::process::ExitCode::from(status.code())
    }
}

/// Idempotent shutdown primitive shared by the driver and all workers.
///
/// Only the first `request` is recorded and broadcast; later calls are no-ops
/// and report `false`.
#[derive(Debug)]
pub struct ShutdownSignal {
    status: OnceLock<ExitStatus>,
    tx: broadcast::Sender<ExitStatus>,
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(SHUTDOWN_CHANNEL_CAPACITY);
        Self {
            status: OnceLock::new(),
            tx,
        }
    }

    /// Requests shutdown with `status`. Returns `true` only for the call that
    /// actually fired the signal.
    pub fn request(&self, status: ExitStatus) -> bool {
        if self.status.set(status).is_err() {
            return false;
        }
        tracing::debug!("Shutdown requested ({:?})", status);
        drop(self.tx.send(status));
        true
    }

    #[must_use]
    pub fn requested(&self) -> Option<ExitStatus> {
        self.status.get().copied()
    }

    /// Waits until shutdown has been requested and returns its status.
    pub async fn wait(&self) -> ExitStatus {
        let mut rx = self.tx.subscribe();
        loop {
            // Checked after subscribing so a request racing with `subscribe`
            // is observed either here or on the channel.
            if let Some(status) = self.requested() {
                return status;
            }
            match rx.recv().await {
                Ok(status) => return status,
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => {
                    return self.requested().unwrap_or(ExitStatus::Normal);
                }
            }
        }
    }

    /// Like [`ShutdownSignal::wait`], bounded by `limit` when given.
    /// Returns `None` when the limit elapsed first.
    pub async fn wait_timeout(&self, limit: Option<Duration>) -> Option<ExitStatus> {
        match limit {
            Some(limit) => tokio::time::timeout(limit, self.wait()).await.ok(),
            None => Some(self.wait().await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const WAIT_LIMIT: Duration = Duration::from_secs(1);

    fn run_async_test<F>(future: F) -> Result<(), String>
    where
        F: std::future::Future<Output = Result<(), String>>,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| format!("Failed to build runtime: {}", err))?;
        runtime.block_on(future)
    }

    #[test]
    fn first_request_wins() -> Result<(), String> {
        let signal = ShutdownSignal::new();
        if !signal.request(ExitStatus::Normal) {
            return Err("Expected first request to fire".to_owned());
        }
        if signal.request(ExitStatus::DeadlineExceeded) {
            return Err("Expected second request to be ignored".to_owned());
        }
        if signal.requested() != Some(ExitStatus::Normal) {
            return Err(format!("Unexpected status: {:?}", signal.requested()));
        }
        Ok(())
    }

    #[test]
    fn concurrent_requests_fire_once() -> Result<(), String> {
        let signal = Arc::new(ShutdownSignal::new());
        let fired = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(std::sync::Barrier::new(16));
        let mut handles = Vec::new();
        for _ in 0..16 {
            let signal = Arc::clone(&signal);
            let fired = Arc::clone(&fired);
            let barrier = Arc::clone(&barrier);
            handles.push(std::thread::spawn(move || {
                barrier.wait();
                if signal.request(ExitStatus::Normal) {
                    fired.fetch_add(1, Ordering::SeqCst);
                }
            }));
        }
        for handle in handles {
            handle.join().map_err(|err| format!("thread panicked: {:?}", err))?;
        }
        let count = fired.load(Ordering::SeqCst);
        if count != 1 {
            return Err(format!("Expected one shutdown, got {}", count));
        }
        Ok(())
    }

    #[test]
    fn wait_returns_status_requested_before_waiting() -> Result<(), String> {
        run_async_test(async {
            let signal = ShutdownSignal::new();
            signal.request(ExitStatus::Normal);
            let status = tokio::time::timeout(WAIT_LIMIT, signal.wait())
                .await
                .map_err(|err| format!("Timed out waiting for shutdown: {}", err))?;
            if status != ExitStatus::Normal {
                return Err(format!("Unexpected status: {:?}", status));
            }
            Ok(())
        })
    }

    #[test]
    fn wait_wakes_on_request_from_other_thread() -> Result<(), String> {
        run_async_test(async {
            let signal = Arc::new(ShutdownSignal::new());
            let remote = Arc::clone(&signal);
            let handle = std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(20));
                remote.request(ExitStatus::Normal)
            });
            let status = signal.wait_timeout(Some(WAIT_LIMIT)).await;
            let fired = handle.join().map_err(|err| format!("thread panicked: {:?}", err))?;
            if status != Some(ExitStatus::Normal) || !fired {
                return Err(format!("Unexpected wake: {:?} fired={}", status, fired));
            }
            Ok(())
        })
    }

    #[test]
    fn wait_timeout_elapses_without_request() -> Result<(), String> {
        run_async_test(async {
            let signal = ShutdownSignal::new();
            let status = signal
                .wait_timeout(Some(Duration::from_millis(10)))
                .await;
            if status.is_some() {
                return Err(format!("Expected timeout, got {:?}", status));
            }
            Ok(())
        })
    }

    #[test]
    fn exit_codes_are_distinct() -> Result<(), String> {
        let codes = [
            ExitStatus::Normal.code(),
            ExitStatus::WorkerFailures.code(),
            ExitStatus::StartupFailed.code(),
            ExitStatus::DeadlineExceeded.code(),
        ];
        if codes != [0, 1, 2, 3] {
            return Err(format!("Unexpected exit codes: {:?}", codes));
        }
        Ok(())
    }
}

use thiserror::Error;

use super::{RequestError, TransportError};

/// Reasons a worker stopped before finishing all of its iterations.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Cannot create dispatcher '{name}': {source}")]
    DispatchContextCreation {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot create connection: {source}")]
    ConnectionCreation {
        #[source]
        source: TransportError,
    },
    #[error("Request {iteration} failed: {source}")]
    Request {
        iteration: u64,
        #[source]
        source: RequestError,
    },
}

impl WorkerError {
    /// True when the worker never reached its request loop.
    #[must_use]
    pub const fn is_setup_failure(&self) -> bool {
        matches!(
            self,
            WorkerError::DispatchContextCreation { .. } | WorkerError::ConnectionCreation { .. }
        )
    }
}

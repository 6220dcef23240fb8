use std::time::Duration;

use thiserror::Error;

use crate::http::ConnectionState;

/// Failure of a single request/response cycle.
///
/// Any of these ends the issuing worker's remaining iterations; none of them
/// reaches other workers or the process exit path.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Cannot connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: TransportError,
    },
    #[error("Cannot write request body data: {source}")]
    Write {
        #[source]
        source: TransportError,
    },
    #[error("Short body write: wrote {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },
    #[error("No response: {source}")]
    Wait {
        #[source]
        source: TransportError,
    },
    #[error("Server responded with status {status}")]
    UnexpectedStatus { status: u16 },
    #[error("Cannot read response body: {source}")]
    ReadBody {
        #[source]
        source: TransportError,
    },
}

impl RequestError {
    /// Short label used in logs and run summaries.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            RequestError::Connect { .. } => "connect",
            RequestError::Write { .. } | RequestError::ShortWrite { .. } => "write",
            RequestError::Wait { .. } => "wait",
            RequestError::UnexpectedStatus { .. } => "status",
            RequestError::ReadBody { .. } => "read",
        }
    }
}

/// Errors raised by the HTTP client capability itself.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid header '{name}'.")]
    InvalidHeader { name: String },
    #[error("HTTP client error: {source}")]
    Client {
        #[from]
        source: reqwest::Error,
    },
    #[error("Connection is in state {actual}, expected {expected}.")]
    InvalidState {
        expected: ConnectionState,
        actual: ConnectionState,
    },
    #[error("Timed out after {timeout:?} waiting for state {state}.")]
    TimedOut {
        state: ConnectionState,
        timeout: Duration,
    },
    /// The peer could not be reached: refused, unresolvable, or the
    /// connection handshake failed or timed out.
    #[error("Cannot reach {peer}: {reason}")]
    Unreachable { peer: String, reason: String },
}

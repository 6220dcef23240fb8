use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

use crate::args::HttpMethod;
use crate::error::TransportError;
use crate::runtime::RunningDispatcher;

/// Progress of the request currently on a connection. Ordered: a connection
/// that reached a state has also passed every earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConnectionState {
    Idle,
    Connected,
    Finalized,
    Content,
    Complete,
}

impl ConnectionState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connected => "connected",
            ConnectionState::Finalized => "finalized",
            ConnectionState::Content => "content",
            ConnectionState::Complete => "complete",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logical HTTP connection bound to one dispatcher.
///
/// A connection is reused for consecutive requests: `connect` starts a new
/// request and discards whatever the previous one left behind. Dropping the
/// connection destroys it.
#[async_trait]
pub trait HttpConnection: Send {
    fn state(&self) -> ConnectionState;

    /// Opens the request line for `method url` with extra `headers`.
    async fn connect(
        &mut self,
        method: HttpMethod,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<(), TransportError>;

    /// Writes body bytes, blocking until accepted. Returns the number written.
    async fn write_body(&mut self, body: &[u8]) -> Result<usize, TransportError>;

    /// Signals the end of the request body and sends the request.
    async fn finalize_output(&mut self) -> Result<(), TransportError>;

    /// Waits until the connection reaches `target`, or until `timeout`
    /// elapses. `None` waits indefinitely.
    async fn wait_for_state(
        &mut self,
        target: ConnectionState,
        timeout: Option<Duration>,
    ) -> Result<(), TransportError>;

    /// Response status, once the connection reached [`ConnectionState::Content`].
    fn status(&self) -> Option<u16>;

    /// Reads the remaining response body as text.
    async fn read_body_text(&mut self) -> Result<String, TransportError>;
}

/// Creates connections bound to a running dispatcher.
pub trait ConnectionFactory: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when the underlying client cannot be initialized.
    fn create_connection(
        &self,
        dispatcher: &RunningDispatcher,
    ) -> Result<Box<dyn HttpConnection>, TransportError>;
}

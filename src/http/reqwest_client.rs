use std::time::Duration;

use async_trait::async_trait;
use http::{HeaderName, HeaderValue};
use reqwest::{Body, Client, Request, Response};
use url::Url;

use crate::args::{DEFAULT_USER_AGENT, HttpMethod};
use crate::error::TransportError;
use crate::runtime::RunningDispatcher;

use super::connection::{ConnectionFactory, ConnectionState, HttpConnection};

/// Idle sockets kept per host; one per worker connection.
const MAX_IDLE_PER_HOST: usize = 1;

/// Builds `reqwest`-backed connections in client-only mode.
#[derive(Debug, Clone, Default)]
pub struct ReqwestConnector {
    connect_timeout: Option<Duration>,
}

impl ReqwestConnector {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            connect_timeout: None,
        }
    }

    /// Bounds connection establishment. The per-request wait already covers
    /// dialing; this makes a stalled handshake report as a connect failure.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

impl ConnectionFactory for ReqwestConnector {
    fn create_connection(
        &self,
        dispatcher: &RunningDispatcher,
    ) -> Result<Box<dyn HttpConnection>, TransportError> {
        // The client's connector and pool bind to the dispatcher's runtime.
        let _guard = dispatcher.enter();
        let mut builder = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .pool_max_idle_per_host(MAX_IDLE_PER_HOST);
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Box::new(ReqwestConnection::new(client)))
    }
}

/// One worker's HTTP connection. The underlying client keeps the socket alive
/// between requests when the server allows it.
#[derive(Debug)]
pub struct ReqwestConnection {
    client: Client,
    state: ConnectionState,
    request: Option<Request>,
    body: Vec<u8>,
    response: Option<Response>,
    status: Option<u16>,
}

impl ReqwestConnection {
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self {
            client,
            state: ConnectionState::Idle,
            request: None,
            body: Vec::new(),
            response: None,
            status: None,
        }
    }

    fn expect_state(&self, expected: ConnectionState) -> Result<(), TransportError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(TransportError::InvalidState {
                expected,
                actual: self.state,
            })
        }
    }
}

#[async_trait]
impl HttpConnection for ReqwestConnection {
    fn state(&self) -> ConnectionState {
        self.state
    }

    async fn connect(
        &mut self,
        method: HttpMethod,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<(), TransportError> {
        let parsed = Url::parse(url).map_err(|err| TransportError::InvalidUrl {
            url: url.to_owned(),
            source: err,
        })?;

        let mut request = Request::new(method.into(), parsed);
        for (name, value) in headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_err| {
                TransportError::InvalidHeader { name: name.clone() }
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|_err| {
                TransportError::InvalidHeader { name: name.clone() }
            })?;
            request.headers_mut().append(header_name, header_value);
        }

        self.request = Some(request);
        self.body.clear();
        self.response = None;
        self.status = None;
        self.state = ConnectionState::Connected;
        Ok(())
    }

    async fn write_body(&mut self, body: &[u8]) -> Result<usize, TransportError> {
        self.expect_state(ConnectionState::Connected)?;
        self.body.extend_from_slice(body);
        Ok(body.len())
    }

    async fn finalize_output(&mut self) -> Result<(), TransportError> {
        self.expect_state(ConnectionState::Connected)?;
        if let Some(request) = self.request.as_mut()
            && !self.body.is_empty()
        {
            *request.body_mut() = Some(Body::from(std::mem::take(&mut self.body)));
        }
        self.state = ConnectionState::Finalized;
        Ok(())
    }

    async fn wait_for_state(
        &mut self,
        target: ConnectionState,
        timeout: Option<Duration>,
    ) -> Result<(), TransportError> {
        if self.state >= target {
            return Ok(());
        }
        if target != ConnectionState::Content {
            return Err(TransportError::InvalidState {
                expected: target,
                actual: self.state,
            });
        }
        self.expect_state(ConnectionState::Finalized)?;
        let request = self.request.take().ok_or(TransportError::InvalidState {
            expected: ConnectionState::Finalized,
            actual: ConnectionState::Idle,
        })?;

        let peer = request.url().origin().ascii_serialization();
        let send = self.client.execute(request);
        let sent = match timeout {
            Some(limit) => tokio::time::timeout(limit, send)
                .await
                .map_err(|_elapsed| TransportError::TimedOut {
                    state: target,
                    timeout: limit,
                })?,
            None => send.await,
        };
        let response = sent.map_err(|err| classify_send_error(&peer, err))?;

        self.status = Some(response.status().as_u16());
        self.response = Some(response);
        self.state = ConnectionState::Content;
        Ok(())
    }

    fn status(&self) -> Option<u16> {
        self.status
    }

    async fn read_body_text(&mut self) -> Result<String, TransportError> {
        let response = self.response.take().ok_or(TransportError::InvalidState {
            expected: ConnectionState::Content,
            actual: self.state,
        })?;
        let text = response.text().await?;
        self.state = ConnectionState::Complete;
        Ok(text)
    }
}

/// The client dials on first send, so connection failures surface here.
fn classify_send_error(peer: &str, err: reqwest::Error) -> TransportError {
    if err.is_connect() {
        TransportError::Unreachable {
            peer: peer.to_owned(),
            reason: error_chain(&err),
        }
    } else {
        TransportError::Client { source: err }
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

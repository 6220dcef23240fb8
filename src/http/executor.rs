use tracing::{debug, error};

use crate::error::{RequestError, TransportError};
use crate::runtime::RunningDispatcher;
use crate::worker::WorkerConfig;

use super::connection::{ConnectionState, HttpConnection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseText {
    pub status: u16,
    pub body: String,
}

pub type RequestOutcome = Result<ResponseText, RequestError>;

/// Runs one request/response cycle on `connection`, blocking the calling
/// thread on `dispatcher` until it completes.
///
/// Prints the body to stdout on success (unless disabled) and logs the error
/// otherwise. Never retries.
pub fn execute(
    dispatcher: &RunningDispatcher,
    connection: &mut dyn HttpConnection,
    config: &WorkerConfig,
) -> RequestOutcome {
    let outcome = dispatcher.block_on(request_cycle(connection, config));
    match &outcome {
        Ok(response) => {
            debug!(
                "{} {} -> {} ({} bytes)",
                config.method,
                config.url,
                response.status,
                response.body.len()
            );
            if config.print_body {
                println!("{}", response.body);
            }
        }
        Err(err) => error!("{}", err),
    }
    outcome
}

async fn request_cycle(
    connection: &mut dyn HttpConnection,
    config: &WorkerConfig,
) -> RequestOutcome {
    connection
        .connect(config.method, &config.url, &config.headers)
        .await
        .map_err(|err| RequestError::Connect {
            url: config.url.clone(),
            source: err,
        })?;

    if let Some(body) = config.body.as_deref() {
        let written = connection
            .write_body(body)
            .await
            .map_err(|err| RequestError::Write { source: err })?;
        if written != body.len() {
            return Err(RequestError::ShortWrite {
                written,
                expected: body.len(),
            });
        }
    }

    connection
        .finalize_output()
        .await
        .map_err(|err| RequestError::Write { source: err })?;

    connection
        .wait_for_state(ConnectionState::Content, config.wait_timeout)
        .await
        .map_err(|err| {
            // Transports that dial lazily report an unreachable peer only now.
            if matches!(err, TransportError::Unreachable { .. }) {
                RequestError::Connect {
                    url: config.url.clone(),
                    source: err,
                }
            } else {
                RequestError::Wait { source: err }
            }
        })?;

    let status = connection.status().ok_or_else(|| RequestError::Wait {
        source: TransportError::InvalidState {
            expected: ConnectionState::Content,
            actual: connection.state(),
        },
    })?;
    if status != config.expected_status {
        return Err(RequestError::UnexpectedStatus { status });
    }

    let body = connection
        .read_body_text()
        .await
        .map_err(|err| RequestError::ReadBody { source: err })?;
    Ok(ResponseText { status, body })
}

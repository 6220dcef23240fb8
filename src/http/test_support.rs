use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::args::HttpMethod;
use crate::error::TransportError;
use crate::runtime::RunningDispatcher;

use super::connection::{ConnectionFactory, ConnectionState, HttpConnection};

/// Counts every capability call made through scripted connections.
#[derive(Debug, Default)]
pub(crate) struct Probe {
    pub(crate) created: AtomicUsize,
    pub(crate) destroyed: AtomicUsize,
    pub(crate) connects: AtomicUsize,
    pub(crate) writes: AtomicUsize,
    pub(crate) finalizes: AtomicUsize,
    pub(crate) waits: AtomicUsize,
    pub(crate) reads: AtomicUsize,
    /// Connection id used by each connect call, in call order.
    pub(crate) connect_ids: Mutex<Vec<usize>>,
}

impl Probe {
    pub(crate) fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    pub(crate) fn connect_ids(&self) -> Vec<usize> {
        self.connect_ids
            .lock()
            .map(|ids| ids.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fault {
    RefuseConnect,
    ShortWrite,
    NeverRespond,
    Status(u16),
}

/// What a scripted connection does on each request attempt.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Script {
    /// Fault injected on this attempt (1-based) and on every later one.
    pub(crate) fault: Option<(u64, Fault)>,
    pub(crate) body: &'static str,
}

impl Script {
    pub(crate) const fn ok() -> Self {
        Self {
            fault: None,
            body: "hello",
        }
    }

    pub(crate) const fn failing_at(attempt: u64, fault: Fault) -> Self {
        Self {
            fault: Some((attempt, fault)),
            body: "hello",
        }
    }
}

#[derive(Debug)]
pub(crate) struct ScriptedFactory {
    pub(crate) probe: Arc<Probe>,
    script: Script,
    fail_create: bool,
    next_id: AtomicUsize,
}

impl ScriptedFactory {
    pub(crate) fn new(script: Script) -> Self {
        Self {
            probe: Arc::new(Probe::default()),
            script,
            fail_create: false,
            next_id: AtomicUsize::new(0),
        }
    }

    pub(crate) fn failing_create() -> Self {
        Self {
            fail_create: true,
            ..Self::new(Script::ok())
        }
    }
}

impl ConnectionFactory for ScriptedFactory {
    fn create_connection(
        &self,
        _dispatcher: &RunningDispatcher,
    ) -> Result<Box<dyn HttpConnection>, TransportError> {
        if self.fail_create {
            return Err(TransportError::Unreachable {
                peer: "scripted".to_owned(),
                reason: "connection refused".to_owned(),
            });
        }
        self.probe.created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedConnection {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            probe: Arc::clone(&self.probe),
            script: self.script,
            attempt: 0,
            state: ConnectionState::Idle,
            status: None,
        }))
    }
}

#[derive(Debug)]
pub(crate) struct ScriptedConnection {
    id: usize,
    probe: Arc<Probe>,
    script: Script,
    attempt: u64,
    state: ConnectionState,
    status: Option<u16>,
}

impl ScriptedConnection {
    fn fault(&self) -> Option<Fault> {
        match self.script.fault {
            Some((from, fault)) if self.attempt >= from => Some(fault),
            Some(_) | None => None,
        }
    }
}

impl Drop for ScriptedConnection {
    fn drop(&mut self) {
        self.probe.destroyed.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl HttpConnection for ScriptedConnection {
    fn state(&self) -> ConnectionState {
        self.state
    }

    async fn connect(
        &mut self,
        _method: HttpMethod,
        url: &str,
        _headers: &[(String, String)],
    ) -> Result<(), TransportError> {
        self.attempt = self.attempt.saturating_add(1);
        self.probe.connects.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut ids) = self.probe.connect_ids.lock() {
            ids.push(self.id);
        }
        if self.fault() == Some(Fault::RefuseConnect) {
            return Err(TransportError::Unreachable {
                peer: url.to_owned(),
                reason: "connection refused".to_owned(),
            });
        }
        self.status = None;
        self.state = ConnectionState::Connected;
        Ok(())
    }

    async fn write_body(&mut self, body: &[u8]) -> Result<usize, TransportError> {
        self.probe.writes.fetch_add(1, Ordering::SeqCst);
        if self.fault() == Some(Fault::ShortWrite) {
            return Ok(body.len().saturating_sub(1));
        }
        Ok(body.len())
    }

    async fn finalize_output(&mut self) -> Result<(), TransportError> {
        self.probe.finalizes.fetch_add(1, Ordering::SeqCst);
        self.state = ConnectionState::Finalized;
        Ok(())
    }

    async fn wait_for_state(
        &mut self,
        target: ConnectionState,
        timeout: Option<Duration>,
    ) -> Result<(), TransportError> {
        self.probe.waits.fetch_add(1, Ordering::SeqCst);
        if self.fault() == Some(Fault::NeverRespond) {
            let Some(limit) = timeout else {
                return std::future::pending().await;
            };
            tokio::time::sleep(limit).await;
            return Err(TransportError::TimedOut {
                state: target,
                timeout: limit,
            });
        }
        self.status = Some(match self.fault() {
            Some(Fault::Status(status)) => status,
            Some(_) | None => 200,
        });
        self.state = ConnectionState::Content;
        Ok(())
    }

    fn status(&self) -> Option<u16> {
        self.status
    }

    async fn read_body_text(&mut self) -> Result<String, TransportError> {
        self.probe.reads.fetch_add(1, Ordering::SeqCst);
        self.state = ConnectionState::Complete;
        Ok(self.script.body.to_owned())
    }
}

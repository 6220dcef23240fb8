use std::time::Duration;

use crate::args::{HttpMethod, PositiveU64};

/// Per-request settings shared read-only by every worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub url: String,
    pub method: HttpMethod,
    pub iterations: PositiveU64,
    pub body: Option<Vec<u8>>,
    pub headers: Vec<(String, String)>,
    pub expected_status: u16,
    /// `None` waits for a response indefinitely.
    pub wait_timeout: Option<Duration>,
    pub print_body: bool,
}

impl WorkerConfig {
    pub const DEFAULT_EXPECTED_STATUS: u16 = 200;

    #[must_use]
    pub fn new(url: impl Into<String>, method: HttpMethod, iterations: PositiveU64) -> Self {
        Self {
            url: url.into(),
            method,
            iterations,
            body: None,
            headers: Vec::new(),
            expected_status: Self::DEFAULT_EXPECTED_STATUS,
            wait_timeout: None,
            print_body: true,
        }
    }
}

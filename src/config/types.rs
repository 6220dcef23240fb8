use std::time::Duration;

use serde::Deserialize;

use crate::args::{HttpMethod, parse_duration_arg};
use crate::error::ValidationError;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub method: Option<HttpMethod>,
    #[serde(alias = "threads")]
    pub workers: Option<usize>,
    pub iterations: Option<u64>,
    pub data: Option<String>,
    pub data_file: Option<String>,
    pub headers: Option<Vec<String>>,
    pub status: Option<u16>,
    pub timeout: Option<DurationValue>,
    pub max_run_time: Option<DurationValue>,
    pub fail_on_error: Option<bool>,
    pub quiet: Option<bool>,
    pub no_color: Option<bool>,
}

/// Either a plain number of seconds or a string with a unit (`"250ms"`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(0) => Err(ValidationError::DurationZero),
            DurationValue::Seconds(secs) => Ok(Duration::from_secs(*secs)),
            DurationValue::Text(text) => parse_duration_arg(text),
        }
    }
}

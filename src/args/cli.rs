use clap::Parser;
use std::time::Duration;

use super::parsers::{
    parse_bool_env, parse_duration_arg, parse_header, parse_positive_u64, parse_positive_usize,
};
use super::types::{HttpMethod, PositiveU64, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Thread-per-worker HTTP load driver: N workers, K sequential requests each, one coordinated shutdown."
)]
pub struct DriverArgs {
    /// Target URL for every request
    #[arg(long, short)]
    pub url: Option<String>,

    /// HTTP method to use
    #[arg(long, short = 'X', default_value = "get", ignore_case = true)]
    pub method: HttpMethod,

    /// Number of worker threads started concurrently
    #[arg(
        long = "workers",
        short = 'c',
        alias = "threads",
        default_value = "1",
        value_parser = parse_positive_usize
    )]
    pub workers: PositiveUsize,

    /// Sequential requests issued by each worker
    #[arg(
        long = "iterations",
        short = 'n',
        default_value = "1",
        value_parser = parse_positive_u64
    )]
    pub iterations: PositiveU64,

    /// Request body data
    #[arg(long, short = 'd')]
    pub data: Option<String>,

    /// Request body from file
    #[arg(long = "data-file", short = 'D', conflicts_with = "data")]
    pub data_file: Option<String>,

    /// HTTP headers in 'Key: Value' format (repeatable)
    #[arg(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,

    /// Expected HTTP status code; anything else ends the worker
    #[arg(long = "status", short = 's', default_value = "200")]
    pub expected_status_code: u16,

    /// Maximum wait for a response per request, connection setup included (supports ms/s/m/h). Waits indefinitely when unset.
    #[arg(long = "timeout", short = 't', value_parser = parse_duration_arg)]
    pub request_timeout: Option<Duration>,

    /// Upper bound for the whole run (supports ms/s/m/h). Unbounded when unset.
    #[arg(long = "max-run-time", value_parser = parse_duration_arg)]
    pub max_run_time: Option<Duration>,

    /// Exit with a non-zero code when any worker fails
    #[arg(long = "fail-on-error")]
    pub fail_on_error: bool,

    /// Do not print response bodies
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Path to config file (TOML/JSON). Defaults to ./threadload.toml or ./threadload.json if present.
    #[arg(long)]
    pub config: Option<String>,

    /// Enable verbose logging (sets log level to debug unless overridden by THREADLOAD_LOG/RUST_LOG)
    #[arg(long, short)]
    pub verbose: bool,

    /// Disable color output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,
}

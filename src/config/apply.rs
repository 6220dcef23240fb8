use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{DriverArgs, PositiveU64, PositiveUsize, parse_header};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::{ConfigFile, DurationValue};

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

/// Applies configuration values to CLI arguments.
///
/// Values given explicitly on the command line always win.
///
/// # Errors
///
/// Returns an error when config values are invalid or conflict with each other.
pub fn apply_config(
    args: &mut DriverArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> AppResult<()> {
    if config.data.is_some() && config.data_file.is_some() {
        return Err(AppError::config(ConfigError::Conflict {
            left: "data",
            right: "data_file",
        }));
    }

    if !is_cli(matches, "url")
        && let Some(url) = config.url.clone()
    {
        args.url = Some(url);
    }

    if !is_cli(matches, "method")
        && let Some(method) = config.method
    {
        args.method = method;
    }

    if !is_cli(matches, "workers")
        && let Some(workers) = config.workers
    {
        args.workers = PositiveUsize::try_from(workers).map_err(|err| {
            AppError::config(ConfigError::FieldMustBePositive {
                field: "workers".to_owned(),
                source: err,
            })
        })?;
    }

    if !is_cli(matches, "iterations")
        && let Some(iterations) = config.iterations
    {
        args.iterations = PositiveU64::try_from(iterations).map_err(|err| {
            AppError::config(ConfigError::FieldMustBePositive {
                field: "iterations".to_owned(),
                source: err,
            })
        })?;
    }

    let body_on_cli = is_cli(matches, "data") || is_cli(matches, "data_file");
    if !body_on_cli {
        if let Some(data) = config.data.clone() {
            args.data = Some(data);
        }
        if let Some(path) = config.data_file.clone() {
            args.data_file = Some(path);
        }
    }

    if !is_cli(matches, "headers")
        && let Some(headers) = config.headers.as_ref()
    {
        let mut parsed = Vec::with_capacity(headers.len());
        for header in headers {
            parsed.push(
                parse_header(header)
                    .map_err(|err| AppError::config(ConfigError::InvalidHeader { source: err }))?,
            );
        }
        args.headers = parsed;
    }

    if !is_cli(matches, "expected_status_code")
        && let Some(status) = config.status
    {
        args.expected_status_code = status;
    }

    if !is_cli(matches, "request_timeout")
        && let Some(timeout) = config.timeout.as_ref()
    {
        args.request_timeout = Some(config_duration(timeout, "timeout")?);
    }

    if !is_cli(matches, "max_run_time")
        && let Some(limit) = config.max_run_time.as_ref()
    {
        args.max_run_time = Some(config_duration(limit, "max_run_time")?);
    }

    if !is_cli(matches, "fail_on_error")
        && let Some(fail_on_error) = config.fail_on_error
    {
        args.fail_on_error = fail_on_error;
    }

    if !is_cli(matches, "quiet")
        && let Some(quiet) = config.quiet
    {
        args.quiet = quiet;
    }

    if matches.value_source("no_color") == Some(ValueSource::DefaultValue)
        && let Some(no_color) = config.no_color
    {
        args.no_color = no_color;
    }

    Ok(())
}

fn config_duration(value: &DurationValue, field: &'static str) -> AppResult<std::time::Duration> {
    value
        .to_duration()
        .map_err(|err| AppError::config(ConfigError::InvalidDuration { field, source: err }))
}

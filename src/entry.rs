use std::process::ExitCode;
use std::sync::Arc;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use url::Url;

use crate::args::DriverArgs;
use crate::driver::{self, DriverOptions};
use crate::error::{AppError, AppResult, ValidationError};
use crate::http::ReqwestConnector;
use crate::shutdown::ExitStatus;
use crate::worker::WorkerConfig;

/// Everything needed to start a run, validated.
#[derive(Debug)]
pub(crate) struct RunPlan {
    pub(crate) options: DriverOptions,
    pub(crate) worker: WorkerConfig,
}

/// Process entry point: parses arguments, runs the load test, and maps the
/// outcome to an exit code.
#[must_use]
pub fn run() -> ExitCode {
    let matches = DriverArgs::command().get_matches();
    match run_with_matches(&matches) {
        Ok(status) => status.into(),
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitStatus::StartupFailed.into()
        }
    }
}

fn run_with_matches(matches: &ArgMatches) -> AppResult<ExitStatus> {
    let mut args = DriverArgs::from_arg_matches(matches)?;
    if let Some(config) = crate::config::load_config(args.config.as_deref())? {
        crate::config::apply_config(&mut args, matches, &config)?;
    }

    crate::logger::init_logging(args.verbose, args.no_color);

    let plan = build_plan(args)?;
    let connector = ReqwestConnector::new().with_connect_timeout(plan.worker.wait_timeout);
    let report = driver::run(&plan.options, plan.worker, Arc::new(connector))?;
    Ok(report.status)
}

pub(crate) fn build_plan(args: DriverArgs) -> AppResult<RunPlan> {
    let url = args
        .url
        .ok_or_else(|| AppError::validation(ValidationError::MissingUrl))?;
    validate_url(&url)?;

    if http::StatusCode::from_u16(args.expected_status_code).is_err() {
        return Err(AppError::validation(ValidationError::InvalidStatusCode {
            value: args.expected_status_code,
        }));
    }

    let body = match (args.data, args.data_file) {
        (Some(data), _) => Some(data.into_bytes()),
        (None, Some(path)) => Some(std::fs::read(&path).map_err(|err| {
            AppError::validation(ValidationError::ReadDataFile { path, source: err })
        })?),
        (None, None) => None,
    };

    let mut worker = WorkerConfig::new(url, args.method, args.iterations);
    worker.body = body;
    worker.headers = args.headers;
    worker.expected_status = args.expected_status_code;
    worker.wait_timeout = args.request_timeout;
    worker.print_body = !args.quiet;

    Ok(RunPlan {
        options: DriverOptions {
            workers: args.workers,
            max_run_time: args.max_run_time,
            fail_on_error: args.fail_on_error,
        },
        worker,
    })
}

fn validate_url(raw: &str) -> AppResult<()> {
    let parsed = Url::parse(raw).map_err(|err| {
        AppError::validation(ValidationError::InvalidUrl {
            url: raw.to_owned(),
            source: err,
        })
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(AppError::validation(ValidationError::UnsupportedScheme {
            scheme: other.to_owned(),
        })),
    }
}

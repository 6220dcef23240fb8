mod app;
mod config;
mod request;
mod startup;
mod validation;
mod worker;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use request::{RequestError, TransportError};
pub use startup::StartupError;
pub use validation::ValidationError;
pub use worker::WorkerError;

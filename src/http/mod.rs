//! HTTP client capability and the single-request executor built on it.
mod connection;
mod executor;
mod reqwest_client;

#[cfg(test)]
pub(crate) mod test_support;

pub use connection::{ConnectionFactory, ConnectionState, HttpConnection};
pub use executor::{RequestOutcome, ResponseText, execute};
pub use reqwest_client::{ReqwestConnection, ReqwestConnector};

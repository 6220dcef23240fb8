//! Core library for the `threadload` CLI.
//!
//! A fixed pool of OS threads, each with its own dispatcher and HTTP
//! connection, issues a bounded sequence of requests against one target. A
//! lock-protected completion counter lets the last worker to finish request
//! process shutdown exactly once; the driver then tears everything down.
pub mod args;
pub mod config;
pub mod driver;
pub mod entry;
pub mod error;
pub mod http;
pub mod logger;
pub mod runtime;
pub mod shutdown;
pub mod worker;

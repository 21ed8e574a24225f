//! # Observability Infrastructure
//!
//! Structured logging for the crate: the global `tracing` subscriber
//! ([`init_logging`]) and the [`Logger`] capability handed to collaborators
//! such as the database bootstrap.

pub mod logger;
pub mod logging;

pub use logger::{LogLevel, Logger, TracingLogger};
pub use logging::{env_filter, init_logging, TIMESTAMP_FORMAT};

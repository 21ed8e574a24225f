//! # Logger Capability
//!
//! A small, object-safe logging interface for components that take their
//! logger as a dependency instead of calling `tracing` macros directly (the
//! database bootstrap, for one).
//!
//! Every level comes in three forms:
//!
//! - `info(&msg)`: a single displayable value
//! - `infoln(&[&a, &b])`: values joined with single spaces
//! - `infof(format_args!(..))`: a preformatted message
//!
//! The `fatal*` forms log at error level and then exit the process with
//! status 1.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Severity of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn join(args: &[&dyn Display]) -> String {
    args.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(" ")
}

/// Leveled logging.
///
/// Implementors only provide [`Logger::log`]; the per-level forms are derived
/// from it.
pub trait Logger: Send + Sync {
    /// Emit `message` at `level`.
    fn log(&self, level: LogLevel, message: &str);

    fn debug(&self, message: &dyn Display) {
        self.log(LogLevel::Debug, &message.to_string());
    }

    fn debugln(&self, args: &[&dyn Display]) {
        self.log(LogLevel::Debug, &join(args));
    }

    fn debugf(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Debug, &args.to_string());
    }

    fn info(&self, message: &dyn Display) {
        self.log(LogLevel::Info, &message.to_string());
    }

    fn infoln(&self, args: &[&dyn Display]) {
        self.log(LogLevel::Info, &join(args));
    }

    fn infof(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Info, &args.to_string());
    }

    fn warn(&self, message: &dyn Display) {
        self.log(LogLevel::Warn, &message.to_string());
    }

    fn warnln(&self, args: &[&dyn Display]) {
        self.log(LogLevel::Warn, &join(args));
    }

    fn warnf(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Warn, &args.to_string());
    }

    fn error(&self, message: &dyn Display) {
        self.log(LogLevel::Error, &message.to_string());
    }

    fn errorln(&self, args: &[&dyn Display]) {
        self.log(LogLevel::Error, &join(args));
    }

    fn errorf(&self, args: fmt::Arguments<'_>) {
        self.log(LogLevel::Error, &args.to_string());
    }

    fn fatal(&self, message: &dyn Display) -> ! {
        self.log(LogLevel::Fatal, &message.to_string());
        std::process::exit(1)
    }

    fn fatalln(&self, args: &[&dyn Display]) -> ! {
        self.log(LogLevel::Fatal, &join(args));
        std::process::exit(1)
    }

    fn fatalf(&self, args: fmt::Arguments<'_>) -> ! {
        self.log(LogLevel::Fatal, &args.to_string());
        std::process::exit(1)
    }
}

/// [`Logger`] that forwards to `tracing`.
///
/// Entries carry a `component` field so that output from different
/// collaborators can be told apart.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    component: String,
}

impl TracingLogger {
    pub fn new(component: impl Into<String>) -> Self {
        Self { component: component.into() }
    }

    pub fn component(&self) -> &str {
        &self.component
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_NAME"))
    }
}

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        let component = self.component.as_str();
        match level {
            LogLevel::Debug => tracing::debug!(component, "{}", message),
            LogLevel::Info => tracing::info!(component, "{}", message),
            LogLevel::Warn => tracing::warn!(component, "{}", message),
            LogLevel::Error => tracing::error!(component, "{}", message),
            LogLevel::Fatal => tracing::error!(component, fatal = true, "{}", message),
        }
    }
}

//! Structured logging.
//!
//! # Responsibilities
//! - Parse log level names from plugin configuration
//! - Carry per-call verbosity and plugin identity (`PluginLogger`)
//! - Initialize the process subscriber for the harness binary
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Verbosity is a value passed with each call, not a global; the
//!   subscriber only sets an outer bound
//! - Every plugin log line carries `plugin-name`, `plugin-version` and
//!   `plugin-type`

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::plugin::PluginMeta;

/// Level names listed when an unknown level is configured.
pub const ACCEPTABLE_LEVELS: &str = "warn, error, debug, info";

/// Plugin verbosity, ordered from quietest to most verbose.
#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    #[default]
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl From<u8> for LogLevel {
    fn from(val: u8) -> Self {
        match val {
            0 => LogLevel::Off,
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unrecognized level name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid log level '{0}' (acceptable values: {levels})", levels = ACCEPTABLE_LEVELS)]
pub struct ParseLevelError(pub String);

impl FromStr for LogLevel {
    type Err = ParseLevelError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "off" => Ok(LogLevel::Off),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(ParseLevelError(other.to_string())),
        }
    }
}

/// Logger context for one plugin call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginLogger {
    meta: PluginMeta,
    verbosity: LogLevel,
}

impl PluginLogger {
    pub fn new(meta: PluginMeta, verbosity: LogLevel) -> Self {
        Self { meta, verbosity }
    }

    pub fn meta(&self) -> &PluginMeta {
        &self.meta
    }

    pub fn verbosity(&self) -> LogLevel {
        self.verbosity
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level != LogLevel::Off && level <= self.verbosity
    }
}

/// Emit a tracing event through a [`PluginLogger`].
///
/// The event is dropped unless the logger's verbosity enables the level.
/// Identity fields are added in front of any caller fields, which go in an
/// optional leading `{ ... }` block:
///
/// ```ignore
/// plugin_log!(warn, logger, { value = %raw }, "Invalid log-level config value");
/// plugin_log!(info, logger, "metric namespace {}", namespace);
/// ```
macro_rules! plugin_log {
    (error, $logger:expr, $($arg:tt)+) => { $crate::observability::logging::plugin_log!(@emit Error, ERROR, $logger, $($arg)+) };
    (warn, $logger:expr, $($arg:tt)+) => { $crate::observability::logging::plugin_log!(@emit Warn, WARN, $logger, $($arg)+) };
    (info, $logger:expr, $($arg:tt)+) => { $crate::observability::logging::plugin_log!(@emit Info, INFO, $logger, $($arg)+) };
    (debug, $logger:expr, $($arg:tt)+) => { $crate::observability::logging::plugin_log!(@emit Debug, DEBUG, $logger, $($arg)+) };
    (trace, $logger:expr, $($arg:tt)+) => { $crate::observability::logging::plugin_log!(@emit Trace, TRACE, $logger, $($arg)+) };
    (@emit $level:ident, $tlevel:ident, $logger:expr, { $($fields:tt)+ }, $($arg:tt)+) => {{
        let logger: &$crate::observability::logging::PluginLogger = &$logger;
        if logger.enabled($crate::observability::logging::LogLevel::$level) {
            ::tracing::event!(
                ::tracing::Level::$tlevel,
                {
                    "plugin-name" = logger.meta().name,
                    "plugin-version" = logger.meta().version,
                    "plugin-type" = logger.meta().kind.as_str(),
                    $($fields)+
                },
                $($arg)+
            );
        }
    }};
    (@emit $level:ident, $tlevel:ident, $logger:expr, $($arg:tt)+) => {{
        let logger: &$crate::observability::logging::PluginLogger = &$logger;
        if logger.enabled($crate::observability::logging::LogLevel::$level) {
            ::tracing::event!(
                ::tracing::Level::$tlevel,
                {
                    "plugin-name" = logger.meta().name,
                    "plugin-version" = logger.meta().version,
                    "plugin-type" = logger.meta().kind.as_str()
                },
                $($arg)+
            );
        }
    }};
}

pub(crate) use plugin_log;

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins over `default_directive` when set.
pub fn init_subscriber(default_directive: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

//! The `perfc` publisher.
//!
//! # Responsibilities
//! - Declare the accepted options (`log-level`)
//! - Resolve per-call verbosity and build the call's logger
//! - Log every metric namespace; hand `/wait` metrics and their `sql` tag
//!   to the counter writer
//!
//! # Design Decisions
//! - Each call logs at its own resolved verbosity; concurrent calls do not
//!   affect each other's output
//! - The last valid `log-level` becomes the default for later calls that
//!   do not set one (last writer wins)
//! - Nothing in a batch fails the call: bad levels and writer errors are
//!   logged and skipped

pub mod settings;

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use thiserror::Error;

use crate::config::{Config, ConfigError, ConfigPolicy};
use crate::counters::{CounterWriter, NoopCounterWriter};
use crate::observability::logging::{plugin_log, ACCEPTABLE_LEVELS};
use crate::observability::metrics as stats;
use crate::observability::{LogLevel, PluginLogger};
use crate::plugin::{Metric, Publisher, META};

pub use settings::{PublisherSettings, LOG_LEVEL};

/// Namespace suffix marking SQL wait metrics.
pub const WAIT_SUFFIX: &str = "/wait";

/// Tag holding the statement identifier on wait metrics.
pub const SQL_TAG: &str = "sql";

/// Errors returned from `publish`.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Publisher forwarding SQL wait metrics to a performance counter writer.
pub struct PerfcPublisher {
    /// Default verbosity for calls without a `log-level` (a `LogLevel`).
    threshold: AtomicU8,
    writer: Arc<dyn CounterWriter>,
}

impl PerfcPublisher {
    pub fn new() -> Self {
        Self {
            threshold: AtomicU8::new(LogLevel::default() as u8),
            writer: Arc::new(NoopCounterWriter),
        }
    }

    pub fn with_counter_writer(mut self, writer: Arc<dyn CounterWriter>) -> Self {
        self.writer = writer;
        self
    }

    pub fn with_initial_level(self, level: LogLevel) -> Self {
        self.threshold.store(level as u8, Ordering::Relaxed);
        self
    }

    /// Verbosity used by calls that do not configure `log-level`.
    pub fn verbosity(&self) -> LogLevel {
        LogLevel::from(self.threshold.load(Ordering::Relaxed))
    }

    fn logger_for(&self, settings: &PublisherSettings) -> PluginLogger {
        let current = self.verbosity();
        let Some(raw) = settings.log_level.as_deref() else {
            return PluginLogger::new(META, current);
        };

        match raw.parse::<LogLevel>() {
            Ok(level) => {
                self.threshold.store(level as u8, Ordering::Relaxed);
                PluginLogger::new(META, level)
            }
            Err(err) => {
                stats::record_invalid_log_level();
                let warning = PluginLogger::new(META, current.max(LogLevel::Warn));
                plugin_log!(
                    warn,
                    warning,
                    { value = %err.0, "acceptable values" = ACCEPTABLE_LEVELS },
                    "Invalid log-level config value"
                );
                PluginLogger::new(META, current)
            }
        }
    }
}

impl Default for PerfcPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PerfcPublisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerfcPublisher")
            .field("verbosity", &self.verbosity())
            .finish_non_exhaustive()
    }
}

impl Publisher for PerfcPublisher {
    fn config_policy(&self) -> ConfigPolicy {
        let mut policy = ConfigPolicy::new();
        policy.add_string_rule(&[""], LOG_LEVEL, false);
        policy
    }

    fn publish(&self, metrics: &[Metric], config: &Config) -> Result<(), PublishError> {
        let settings = PublisherSettings::resolve(config)?;
        let logger = self.logger_for(&settings);

        stats::record_batch(metrics.len());
        plugin_log!(
            debug,
            logger,
            { metrics = metrics.len(), verbosity = %logger.verbosity() },
            "Publishing batch"
        );

        for metric in metrics {
            let namespace = metric.namespace();
            plugin_log!(info, logger, "metric namespace {}", namespace);

            if !namespace.ends_with(WAIT_SUFFIX) {
                continue;
            }

            let sql = metric.tag(SQL_TAG);
            stats::record_wait_sample(sql.is_some());
            plugin_log!(info, logger, "hash {}", sql.unwrap_or(""));

            // TODO: map the statement hash onto a named counter instance once
            // the counter set for SQL waits is registered.
            if let Err(e) = self.writer.record_wait(metric, sql) {
                stats::record_writer_failure();
                plugin_log!(
                    warn,
                    logger,
                    { namespace = %namespace, error = %e },
                    "Counter write failed"
                );
            }
        }

        Ok(())
    }
}

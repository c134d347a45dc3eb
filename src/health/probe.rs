//! Startup probe of the counter subsystem.
//!
//! # Responsibilities
//! - Open one query, add the configured counters, sample once
//! - Log raw and formatted values per counter
//! - Classify each counter as value, missing instance or failure
//!
//! # Design Decisions
//! - Diagnostic only: nothing here aborts startup
//! - The query is dropped when the probe ends; the publish path never reuses it

use serde::Serialize;

use crate::counters::{CounterError, CounterHandle, CounterSource, FormattedValue, ValueFormat, MEMORY_COUNTERS};
use crate::observability::logging::plugin_log;
use crate::observability::metrics as stats;
use crate::observability::{LogLevel, PluginLogger};
use crate::plugin::META;

/// Result for a single counter.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    Value(FormattedValue),
    /// The counter instance does not exist on this machine.
    Missing,
    Failed(String),
}

impl ProbeOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeOutcome::Value(_) => "value",
            ProbeOutcome::Missing => "missing",
            ProbeOutcome::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CounterReport {
    pub path: String,
    pub outcome: ProbeOutcome,
}

/// Outcome of a probe run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeReport {
    /// Whether the query could be opened at all.
    pub opened: bool,
    /// One entry per configured counter, in configuration order.
    pub counters: Vec<CounterReport>,
}

impl ProbeReport {
    /// The subsystem answered with at least one value.
    pub fn is_available(&self) -> bool {
        self.opened && self.count("value") > 0
    }

    /// Number of counters with the given outcome name.
    pub fn count(&self, outcome: &str) -> usize {
        self.counters.iter().filter(|c| c.outcome.as_str() == outcome).count()
    }

    pub fn summary(&self) -> ProbeSummary {
        ProbeSummary {
            opened: self.opened,
            values: self.count("value"),
            missing: self.count("missing"),
            failed: self.count("failed"),
        }
    }
}

/// Counts per outcome, for printing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProbeSummary {
    pub opened: bool,
    pub values: usize,
    pub missing: usize,
    pub failed: usize,
}

/// Checks that the counter subsystem answers.
pub struct CounterProbe<'a> {
    source: &'a dyn CounterSource,
    counters: Vec<String>,
    format: ValueFormat,
    logger: PluginLogger,
}

impl<'a> CounterProbe<'a> {
    /// Probe the default memory counters at info verbosity.
    pub fn new(source: &'a dyn CounterSource) -> Self {
        Self {
            source,
            counters: MEMORY_COUNTERS.iter().map(|c| c.to_string()).collect(),
            format: ValueFormat::default(),
            logger: PluginLogger::new(META, LogLevel::Info),
        }
    }

    pub fn with_counters<I, S>(mut self, counters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.counters = counters.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_format(mut self, format: ValueFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.logger = PluginLogger::new(META, level);
        self
    }

    pub fn run(&self) -> ProbeReport {
        let logger = self.logger;
        let mut report = ProbeReport::default();

        let mut query = match self.source.open_query() {
            Ok(query) => query,
            Err(e) => {
                plugin_log!(error, logger, { error = %e }, "OpenQuery failed");
                return report;
            }
        };
        report.opened = true;

        let added: Vec<(&String, Result<CounterHandle, CounterError>)> = self
            .counters
            .iter()
            .map(|path| {
                let handle = query.add_counter(path);
                if let Err(e) = &handle {
                    plugin_log!(error, logger, { counter = %path, error = %e }, "AddCounter failed");
                }
                (path, handle)
            })
            .collect();

        if let Err(e) = query.collect() {
            plugin_log!(error, logger, { error = %e }, "CollectData failed");
        }

        for (path, handle) in added {
            let outcome = match handle {
                Ok(handle) => {
                    plugin_log!(info, logger, "Checking {} ...", path);

                    match query.raw_value(handle) {
                        Ok(raw) => plugin_log!(
                            info,
                            logger,
                            {
                                ctype = raw.counter_type,
                                first = raw.first,
                                second = raw.second,
                                time = ?raw.timestamp
                            },
                            "GetRawValue()"
                        ),
                        Err(e) => plugin_log!(error, logger, { error = %e }, "GetRawValue() failed"),
                    }

                    match query.formatted_value(handle, self.format) {
                        Ok(value) => {
                            plugin_log!(info, logger, { format = ?self.format, value = %value }, "GetFmtValue()");
                            ProbeOutcome::Value(value)
                        }
                        Err(CounterError::InvalidData) => {
                            plugin_log!(
                                info,
                                logger,
                                "GetFmtValue(): specified counter instance does not exist, skipping"
                            );
                            ProbeOutcome::Missing
                        }
                        Err(e) => {
                            plugin_log!(error, logger, { error = %e }, "GetFmtValue() failed");
                            ProbeOutcome::Failed(e.to_string())
                        }
                    }
                }
                Err(e) => ProbeOutcome::Failed(e.to_string()),
            };

            stats::record_probe_outcome(outcome.as_str());
            report.counters.push(CounterReport {
                path: path.clone(),
                outcome,
            });
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::counters::MemoryCounters;

    const AVAILABLE: &str = r"\Memory\Available Mbytes";
    const PRIVATE: &str = r"\Process(_Total)\Private Bytes";

    #[test]
    fn test_all_default_counters_reported() {
        let source = MemoryCounters::default().with_sample(AVAILABLE, 1024.0);
        let report = CounterProbe::new(&source).run();

        assert!(report.opened);
        assert_eq!(report.counters.len(), MEMORY_COUNTERS.len());
        assert_eq!(report.counters[0].path, AVAILABLE);
        assert_eq!(report.counters[0].outcome, ProbeOutcome::Value(FormattedValue::Large(1024)));
        assert_eq!(report.count("missing"), MEMORY_COUNTERS.len() - 1);
        assert!(report.is_available());
    }

    #[test]
    fn test_open_failure_is_not_fatal() {
        let source = MemoryCounters::default().with_open_failure("access denied");
        let report = CounterProbe::new(&source).run();

        assert!(!report.opened);
        assert!(report.counters.is_empty());
        assert!(!report.is_available());
    }

    #[test]
    fn test_bad_path_keeps_order() {
        let source = MemoryCounters::default()
            .with_sample(AVAILABLE, 10.0)
            .with_sample(PRIVATE, 20.0);
        let report = CounterProbe::new(&source)
            .with_counters([AVAILABLE, "not a path", PRIVATE])
            .with_format(ValueFormat::Double)
            .run();

        let outcomes: Vec<&str> = report.counters.iter().map(|c| c.outcome.as_str()).collect();
        assert_eq!(outcomes, vec!["value", "failed", "value"]);
        assert_eq!(report.counters[2].outcome, ProbeOutcome::Value(FormattedValue::Double(20.0)));
    }

    #[test]
    fn test_collect_failure_marks_counters_failed() {
        let source = MemoryCounters::default()
            .with_sample(AVAILABLE, 10.0)
            .with_collect_failure("no data");
        let report = CounterProbe::new(&source)
            .with_counters([AVAILABLE])
            .with_level(LogLevel::Off)
            .run();

        assert!(report.opened);
        assert_eq!(report.summary(), ProbeSummary { opened: true, values: 0, missing: 0, failed: 1 });
    }
}

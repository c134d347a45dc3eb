//! In-memory counter implementations.
//!
//! `MemoryCounters` stands in for the native counter subsystem on machines
//! that do not have one, and in tests. Writers here never touch the system.

use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::SystemTime;

use crate::counters::types::{
    CounterError, CounterHandle, CounterQuery, CounterResult, CounterSource, CounterWriter,
    FormattedValue, RawSample, ValueFormat,
};
use crate::plugin::Metric;

/// Counter type reported for raw samples (a plain raw count).
const RAW_COUNT: u32 = 0x0001_0000;

/// A counter source backed by a fixed map of path to value.
#[derive(Debug, Clone, Default)]
pub struct MemoryCounters {
    samples: BTreeMap<String, f64>,
    open_failure: Option<String>,
    collect_failure: Option<String>,
}

impl MemoryCounters {
    pub fn new(samples: BTreeMap<String, f64>) -> Self {
        Self {
            samples,
            ..Self::default()
        }
    }

    pub fn with_sample(mut self, path: impl Into<String>, value: f64) -> Self {
        self.samples.insert(path.into(), value);
        self
    }

    /// Make `open_query` fail.
    pub fn with_open_failure(mut self, reason: impl Into<String>) -> Self {
        self.open_failure = Some(reason.into());
        self
    }

    /// Make `collect` fail on every query opened from this source.
    pub fn with_collect_failure(mut self, reason: impl Into<String>) -> Self {
        self.collect_failure = Some(reason.into());
        self
    }
}

impl CounterSource for MemoryCounters {
    fn open_query(&self) -> CounterResult<Box<dyn CounterQuery>> {
        if let Some(reason) = &self.open_failure {
            return Err(CounterError::Open(reason.clone()));
        }
        Ok(Box::new(MemoryQuery {
            samples: self.samples.clone(),
            collect_failure: self.collect_failure.clone(),
            counters: Vec::new(),
            collected: None,
        }))
    }
}

struct Collected {
    values: Vec<Option<f64>>,
    at: SystemTime,
}

struct MemoryQuery {
    samples: BTreeMap<String, f64>,
    collect_failure: Option<String>,
    counters: Vec<String>,
    collected: Option<Collected>,
}

impl MemoryQuery {
    fn sampled(&self, counter: CounterHandle) -> CounterResult<(f64, SystemTime)> {
        if counter.0 >= self.counters.len() {
            return Err(CounterError::Read(format!("unknown counter handle {}", counter.0)));
        }
        let collected = self
            .collected
            .as_ref()
            .ok_or_else(|| CounterError::Read("no data collected".to_string()))?;
        match collected.values.get(counter.0).copied().flatten() {
            Some(value) => Ok((value, collected.at)),
            None => Err(CounterError::InvalidData),
        }
    }
}

/// Paths look like `\Object\Counter` or `\Object(Instance)\Counter`.
fn is_well_formed(path: &str) -> bool {
    match path.strip_prefix('\\') {
        Some(rest) => rest
            .split_once('\\')
            .map(|(object, counter)| !object.is_empty() && !counter.is_empty())
            .unwrap_or(false),
        None => false,
    }
}

impl CounterQuery for MemoryQuery {
    fn add_counter(&mut self, path: &str) -> CounterResult<CounterHandle> {
        if !is_well_formed(path) {
            return Err(CounterError::AddCounter {
                path: path.to_string(),
                reason: "malformed counter path".to_string(),
            });
        }
        self.counters.push(path.to_string());
        Ok(CounterHandle(self.counters.len() - 1))
    }

    fn collect(&mut self) -> CounterResult<()> {
        if let Some(reason) = &self.collect_failure {
            return Err(CounterError::Collect(reason.clone()));
        }
        let values = self
            .counters
            .iter()
            .map(|path| self.samples.get(path).copied())
            .collect();
        self.collected = Some(Collected {
            values,
            at: SystemTime::now(),
        });
        Ok(())
    }

    fn raw_value(&self, counter: CounterHandle) -> CounterResult<RawSample> {
        let (value, at) = self.sampled(counter)?;
        Ok(RawSample {
            counter_type: RAW_COUNT,
            first: value as i64,
            second: 0,
            timestamp: at,
        })
    }

    fn formatted_value(&self, counter: CounterHandle, format: ValueFormat) -> CounterResult<FormattedValue> {
        let (value, _) = self.sampled(counter)?;
        Ok(match format {
            ValueFormat::Long => FormattedValue::Long(value as i32),
            ValueFormat::Large => FormattedValue::Large(value as i64),
            ValueFormat::Double => FormattedValue::Double(value),
        })
    }
}

/// Writer that accepts everything and does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCounterWriter;

impl CounterWriter for NoopCounterWriter {
    fn record_wait(&self, _metric: &Metric, _sql: Option<&str>) -> CounterResult<()> {
        Ok(())
    }
}

/// A wait metric captured by [`RecordingCounterWriter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitRecord {
    pub namespace: String,
    pub sql: Option<String>,
}

/// Writer that keeps every wait metric it receives.
#[derive(Debug, Default)]
pub struct RecordingCounterWriter {
    records: Mutex<Vec<WaitRecord>>,
}

impl RecordingCounterWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<WaitRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CounterWriter for RecordingCounterWriter {
    fn record_wait(&self, metric: &Metric, sql: Option<&str>) -> CounterResult<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| CounterError::Write("recording writer mutex poisoned".to_string()))?;
        records.push(WaitRecord {
            namespace: metric.namespace().to_string(),
            sql: sql.map(str::to_string),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::Namespace;

    #[test]
    fn test_path_validation() {
        assert!(is_well_formed(r"\Memory\Available Mbytes"));
        assert!(is_well_formed(r"\Process(_Total)\Private Bytes"));
        assert!(!is_well_formed(r"Memory\Available Mbytes"));
        assert!(!is_well_formed(r"\Memory"));
        assert!(!is_well_formed(r"\\Available"));
    }

    #[test]
    fn test_query_reads_samples() {
        let source = MemoryCounters::default().with_sample(r"\Memory\Available Mbytes", 2048.0);
        let mut query = source.open_query().unwrap();
        let available = query.add_counter(r"\Memory\Available Mbytes").unwrap();
        let missing = query.add_counter(r"\Memory\Pages/sec").unwrap();

        // Nothing collected yet
        assert!(matches!(query.raw_value(available), Err(CounterError::Read(_))));

        query.collect().unwrap();
        let raw = query.raw_value(available).unwrap();
        assert_eq!(raw.first, 2048);
        assert_eq!(raw.counter_type, RAW_COUNT);

        assert_eq!(
            query.formatted_value(available, ValueFormat::Large),
            Ok(FormattedValue::Large(2048))
        );
        assert_eq!(
            query.formatted_value(available, ValueFormat::Double),
            Ok(FormattedValue::Double(2048.0))
        );
        assert_eq!(
            query.formatted_value(missing, ValueFormat::Large),
            Err(CounterError::InvalidData)
        );
        assert!(matches!(
            query.formatted_value(CounterHandle(9), ValueFormat::Large),
            Err(CounterError::Read(_))
        ));
    }

    #[test]
    fn test_injected_failures() {
        let source = MemoryCounters::default().with_open_failure("access denied");
        assert_eq!(
            source.open_query().err(),
            Some(CounterError::Open("access denied".into()))
        );

        let source = MemoryCounters::default().with_collect_failure("no data");
        let mut query = source.open_query().unwrap();
        assert!(query.add_counter("bogus").is_err());
        assert_eq!(query.collect(), Err(CounterError::Collect("no data".into())));
    }

    #[test]
    fn test_recording_writer() {
        let writer = RecordingCounterWriter::new();
        let metric = Metric::new(Namespace::parse("db/query/wait")).with_tag("sql", "SELECT 1");

        writer.record_wait(&metric, metric.tag("sql")).unwrap();
        writer.record_wait(&metric, None).unwrap();

        assert_eq!(
            writer.records(),
            vec![
                WaitRecord {
                    namespace: "/db/query/wait".into(),
                    sql: Some("SELECT 1".into()),
                },
                WaitRecord {
                    namespace: "/db/query/wait".into(),
                    sql: None,
                },
            ]
        );
    }
}

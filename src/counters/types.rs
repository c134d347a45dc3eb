//! Counter traits, samples and error definitions.

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::plugin::Metric;

/// Errors that can occur while talking to the counter subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CounterError {
    /// A query could not be opened.
    #[error("open query failed: {0}")]
    Open(String),

    /// A counter path was rejected.
    #[error("add counter {path} failed: {reason}")]
    AddCounter { path: String, reason: String },

    /// Sampling the query failed.
    #[error("collect failed: {0}")]
    Collect(String),

    /// The counter instance does not exist.
    #[error("counter instance does not exist")]
    InvalidData,

    /// Reading a sampled value failed.
    #[error("read failed: {0}")]
    Read(String),

    /// Writing a counter failed.
    #[error("write failed: {0}")]
    Write(String),
}

/// Result type for counter operations.
pub type CounterResult<T> = Result<T, CounterError>;

/// Handle to a counter added to a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CounterHandle(pub usize);

/// Display format requested for a counter value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueFormat {
    /// 32-bit integer.
    Long,
    /// 64-bit integer.
    #[default]
    Large,
    Double,
}

/// A formatted counter value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormattedValue {
    Long(i32),
    Large(i64),
    Double(f64),
}

impl fmt::Display for FormattedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormattedValue::Long(v) => write!(f, "{}", v),
            FormattedValue::Large(v) => write!(f, "{}", v),
            FormattedValue::Double(v) => write!(f, "{}", v),
        }
    }
}

/// A raw counter sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    pub counter_type: u32,
    pub first: i64,
    pub second: i64,
    pub timestamp: SystemTime,
}

/// An open counter query.
pub trait CounterQuery {
    fn add_counter(&mut self, path: &str) -> CounterResult<CounterHandle>;

    /// Sample every added counter once.
    fn collect(&mut self) -> CounterResult<()>;

    fn raw_value(&self, counter: CounterHandle) -> CounterResult<RawSample>;

    fn formatted_value(&self, counter: CounterHandle, format: ValueFormat) -> CounterResult<FormattedValue>;
}

/// Opens counter queries.
pub trait CounterSource {
    fn open_query(&self) -> CounterResult<Box<dyn CounterQuery>>;
}

/// Receives SQL wait metrics from the publish path.
pub trait CounterWriter: Send + Sync {
    /// Record a metric whose namespace ends in `/wait`. `sql` is the value of
    /// its `sql` tag, if present.
    fn record_wait(&self, metric: &Metric, sql: Option<&str>) -> CounterResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CounterError::AddCounter {
            path: r"\Memory\Bogus".into(),
            reason: "no such object".into(),
        };
        assert_eq!(err.to_string(), r"add counter \Memory\Bogus failed: no such object");
        assert_eq!(CounterError::InvalidData.to_string(), "counter instance does not exist");
    }

    #[test]
    fn test_default_format() {
        assert_eq!(ValueFormat::default(), ValueFormat::Large);
    }

    #[test]
    fn test_formatted_value_display() {
        assert_eq!(FormattedValue::Large(4096).to_string(), "4096");
        assert_eq!(FormattedValue::Double(0.5).to_string(), "0.5");
    }
}

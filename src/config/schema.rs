//! Per-call configuration passed from the host.
//!
//! The host hands the plugin a flat map of option name to value. Values are
//! loosely typed; the typed getters enforce the expected kind.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::counters::{ValueFormat, MEMORY_COUNTERS};
use crate::plugin::Metric;

/// A single configuration value.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl ConfigValue {
    /// Name of the value's kind, as used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Integer(_) => "integer",
            ConfigValue::Float(_) => "float",
            ConfigValue::String(_) => "string",
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(v) => write!(f, "{}", v),
            ConfigValue::Integer(v) => write!(f, "{}", v),
            ConfigValue::Float(v) => write!(f, "{}", v),
            ConfigValue::String(v) => f.write_str(v),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(v: &str) -> Self {
        ConfigValue::String(v.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(v: String) -> Self {
        ConfigValue::String(v)
    }
}

impl From<bool> for ConfigValue {
    fn from(v: bool) -> Self {
        ConfigValue::Bool(v)
    }
}

impl From<i64> for ConfigValue {
    fn from(v: i64) -> Self {
        ConfigValue::Integer(v)
    }
}

impl From<f64> for ConfigValue {
    fn from(v: f64) -> Self {
        ConfigValue::Float(v)
    }
}

/// Errors returned by the typed getters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The option is not present.
    #[error("config item not found: {0}")]
    Missing(String),

    /// The option is present with a different kind.
    #[error("config item {key} is a {found}, expected {expected}")]
    WrongType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Option map for one publish call.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Config {
    items: BTreeMap<String, ConfigValue>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ConfigValue>) {
        self.items.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.items.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get_string(&self, key: &str) -> Result<&str, ConfigError> {
        match self.lookup(key)? {
            ConfigValue::String(v) => Ok(v),
            other => Err(wrong_type(key, "string", other)),
        }
    }

    pub fn get_bool(&self, key: &str) -> Result<bool, ConfigError> {
        match self.lookup(key)? {
            ConfigValue::Bool(v) => Ok(*v),
            other => Err(wrong_type(key, "bool", other)),
        }
    }

    pub fn get_integer(&self, key: &str) -> Result<i64, ConfigError> {
        match self.lookup(key)? {
            ConfigValue::Integer(v) => Ok(*v),
            other => Err(wrong_type(key, "integer", other)),
        }
    }

    /// Integers widen to floats.
    pub fn get_float(&self, key: &str) -> Result<f64, ConfigError> {
        match self.lookup(key)? {
            ConfigValue::Float(v) => Ok(*v),
            ConfigValue::Integer(v) => Ok(*v as f64),
            other => Err(wrong_type(key, "float", other)),
        }
    }

    fn lookup(&self, key: &str) -> Result<&ConfigValue, ConfigError> {
        self.items
            .get(key)
            .ok_or_else(|| ConfigError::Missing(key.to_string()))
    }
}

fn wrong_type(key: &str, expected: &'static str, found: &ConfigValue) -> ConfigError {
    ConfigError::WrongType {
        key: key.to_string(),
        expected,
        found: found.kind(),
    }
}

/// Startup counter probe settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Run the probe before publishing.
    pub enabled: bool,

    /// Counter paths to check.
    pub counters: Vec<String>,

    /// Format used when reading formatted values.
    pub format: ValueFormat,

    /// Values served by the in-memory counter source, keyed by path.
    pub samples: BTreeMap<String, f64>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            counters: MEMORY_COUNTERS.iter().map(|c| c.to_string()).collect(),
            format: ValueFormat::default(),
            samples: BTreeMap::new(),
        }
    }
}

/// A batch file: one publish call worth of input for the harness.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BatchFile {
    /// Options handed to `publish`.
    pub config: Config,

    /// Metrics handed to `publish`, in order.
    pub metrics: Vec<Metric>,

    pub probe: ProbeConfig,
}

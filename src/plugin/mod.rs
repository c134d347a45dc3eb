//! Plugin contract with the host.
//!
//! # Data Flow
//! ```text
//! Host (collector runtime)
//!     → config_policy()         once, at load time
//!     → publish(metrics, config) once per batch
//!         → publisher (settings, logger, per-metric hooks)
//! ```
//!
//! # Design Decisions
//! - Identity (name, version, type) is fixed at compile time
//! - Metrics are borrowed for the duration of one call, never retained
//! - The trait is object safe so hosts can hold `Box<dyn Publisher>`

pub mod types;

pub use types::{Metric, Namespace, PluginMeta, PluginType};

use crate::config::{Config, ConfigPolicy};
use crate::publisher::PublishError;

/// Plugin name reported to the host and attached to every log line.
pub const NAME: &str = "perfc";

/// Plugin version reported to the host.
pub const VERSION: u32 = 1;

/// Identity of this plugin.
pub const META: PluginMeta = PluginMeta {
    name: NAME,
    version: VERSION,
    kind: PluginType::Publisher,
};

/// A plugin that receives metric batches from the host.
pub trait Publisher: Send + Sync {
    /// Describe the options this plugin accepts.
    fn config_policy(&self) -> ConfigPolicy;

    /// Publish one batch of metrics.
    fn publish(&self, metrics: &[Metric], config: &Config) -> Result<(), PublishError>;
}

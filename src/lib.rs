//! perfc: a metrics publisher plugin forwarding SQL wait metrics to
//! performance counters.

pub mod config;
pub mod counters;
pub mod health;
pub mod observability;
pub mod plugin;
pub mod publisher;

pub use config::{Config, ConfigPolicy};
pub use plugin::{Metric, Namespace, Publisher};
pub use publisher::{PerfcPublisher, PublishError};

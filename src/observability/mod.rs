//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! publisher, health probe produce:
//!     → logging.rs (structured log events, gated per call)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → tracing subscriber (stdout in the harness, host-provided otherwise)
//!     → Prometheus text rendering (harness only)
//! ```
//!
//! # Design Decisions
//! - Plugin identity fields on every plugin log line
//! - Per-call verbosity; no process-wide level mutation
//! - Metrics are cheap (facade calls, no-op without a recorder)

pub mod logging;
pub mod metrics;

pub use logging::{LogLevel, ParseLevelError, PluginLogger};

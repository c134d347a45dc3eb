//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (harness or host):
//!     CounterSource
//!     → probe.rs (open query, add counters, collect once)
//!     → ProbeReport (value / missing / failed per counter)
//! ```
//!
//! # Design Decisions
//! - The probe is decoupled from publishing; a missing or broken counter
//!   subsystem never prevents the publisher from starting
//! - Missing counter instances are expected on some machines and are not
//!   failures

pub mod probe;

pub use probe::{CounterProbe, CounterReport, ProbeOutcome, ProbeReport, ProbeSummary};

//! Performance counter subsystem seams.
//!
//! # Data Flow
//! ```text
//! Publish path:
//!     publisher (metric ends in /wait)
//!     → CounterWriter::record_wait
//!
//! Startup probe:
//!     health::CounterProbe
//!     → CounterSource::open_query
//!     → CounterQuery (add_counter, collect, raw_value, formatted_value)
//! ```
//!
//! # Design Decisions
//! - The native counter subsystem is external; only its shape lives here
//! - Writers are injected, the default does nothing
//! - `InvalidData` is distinct from other failures: it means the counter
//!   instance does not exist on this machine

pub mod memory;
pub mod types;

pub use memory::{MemoryCounters, NoopCounterWriter, RecordingCounterWriter, WaitRecord};
pub use types::{
    CounterError, CounterHandle, CounterQuery, CounterResult, CounterSource, CounterWriter,
    FormattedValue, RawSample, ValueFormat,
};

/// Memory counters checked by the startup probe.
pub const MEMORY_COUNTERS: &[&str] = &[
    r"\Memory\Available Mbytes",
    r"\Memory\Pages Input/sec",
    r"\Memory\Pages/sec",
    r"\Memory\Committed Bytes",
    r"\Memory\Commit Limit",
    r"\Memory\% Committed Bytes in Use",
    r"\Process(_Total)\Private Bytes",
];

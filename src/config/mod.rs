//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! batch file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (checks against the plugin's ConfigPolicy)
//!     → Config (option map, handed to publish per call)
//!
//! Plugin side:
//!     policy.rs describes accepted options
//!     schema.rs typed getters (get_string, get_bool, ...)
//! ```
//!
//! # Design Decisions
//! - Config is call-scoped; nothing is persisted between batches
//! - A missing option is reported as an error by the getter; callers decide
//!   whether absence is tolerated
//! - Validation separates syntactic (serde) from policy checks

pub mod loader;
pub mod policy;
pub mod schema;
pub mod validation;

pub use policy::{ConfigPolicy, PolicyRule, RuleKind};
pub use schema::{Config, ConfigError, ConfigValue};

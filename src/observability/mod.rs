//! The crate's own diagnostics and dispatch counters
//!
//! Logging here is about the observer itself (registrations, lookups that
//! miss, sink failures), not about what callers log through the facade.

pub mod logging;
pub mod stats;

pub use logging::{init_default_logging, init_logging, init_from_config, parse_level, LogFormat};
pub use stats::{DispatchStats, StatsSnapshot};

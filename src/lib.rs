//! Observer - pluggable observability facade
//!
//! A registry maps provider kinds (logging, error reporting, metrics and any
//! kinds the application adds) to concrete backends chosen at startup.
//! Callers log, meter and report errors through capability-oriented
//! functions without knowing which backend serves them.
//!
//! # Overview
//!
//! - [`provider`]: kinds, provider configs, tagged instances and the [`Registry`]
//! - [`facade`]: dispatch methods on [`Registry`] returning [`Dispatch`]
//! - [`ambient`]: the process-wide registry and free facade functions
//! - [`backends`]: `tracing` and buffered JSON-lines adapters
//! - [`config`]: TOML configuration with environment overrides
//!
//! # Quick Start
//!
//! ```rust
//! use observer::testing::RecordingBackend;
//! use observer::{Context, Dispatch, ProviderConfig, Registry, Severity};
//! use std::sync::Arc;
//!
//! let backend = Arc::new(RecordingBackend::new());
//! let shared = backend.clone();
//! let registry = Registry::configure(vec![ProviderConfig::metrics(
//!     "recording.metrics",
//!     move || shared.clone(),
//! )])
//! .unwrap();
//!
//! // No logger registered: the call is a silent no-op
//! assert_eq!(
//!     registry.log_with_level(Severity::Warn, "slow request", &["ms", "900"]),
//!     Dispatch::NotConfigured
//! );
//!
//! registry.meter(&Context::background(), "requests", &["route", "/checkout"]);
//! assert_eq!(backend.metrics()[0].labels["route"], "/checkout");
//! ```

pub mod ambient;
pub mod backends;
pub mod capability;
pub mod config;
pub mod context;
pub mod error;
pub mod facade;
pub mod labels;
pub mod observability;
pub mod provider;
pub mod severity;
pub mod testing;

pub use capability::{Backend, Capability, ErrorReporter, Logger, Metrics};
pub use config::{ConfigError, ObserverConfig};
pub use context::Context;
pub use error::{ObserverError, ObserverResult};
pub use facade::Dispatch;
pub use labels::{pair_labels, Labels};
pub use observability::{DispatchStats, StatsSnapshot};
pub use provider::{KindSet, ProviderConfig, ProviderInstance, ProviderKind, Registry};
pub use severity::Severity;

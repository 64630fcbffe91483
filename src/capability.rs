//! Capability contracts a backend implements
//!
//! A single backend type may implement any combination of [`Logger`],
//! [`ErrorReporter`] and [`Metrics`]. All of them share the [`Backend`]
//! lifecycle so the host can close a backend without knowing which
//! capabilities it serves.

use crate::context::Context;
use crate::error::ObserverResult;
use crate::severity::Severity;
use async_trait::async_trait;
use std::fmt;

/// Lifecycle shared by every backend adapter
#[async_trait]
pub trait Backend: Send + Sync {
    /// Flush pending entries and release external resources.
    ///
    /// Never called by the registry on its own.
    async fn close(&self) -> ObserverResult<()> {
        Ok(())
    }
}

/// Logging capability
pub trait Logger: Backend {
    /// Log at [`Severity::Info`]
    fn log(&self, message: &str, key_value_pairs: &[&str]);

    fn log_with_level(&self, severity: Severity, message: &str, key_value_pairs: &[&str]);

    fn enable_logging(&self);

    /// Drop every following log call until [`Logger::enable_logging`]
    fn disable_logging(&self);
}

/// Error reporting capability
///
/// The backend only borrows the error; the facade hands the caller's value
/// back unchanged.
pub trait ErrorReporter: Backend {
    fn report_error(&self, error: &(dyn std::error::Error + Send + Sync + 'static));
}

/// Metrics capability
pub trait Metrics: Backend {
    /// Record one metric event, pairing `values` into labels
    fn meter(&self, ctx: &Context, metric: &str, values: &[&str]);
}

/// Tag naming the capability a provider kind requires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Logging,
    ErrorReporting,
    Metrics,
    /// Application-defined capability, looked up by downcast
    Custom,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::Logging => "logger",
            Capability::ErrorReporting => "error reporter",
            Capability::Metrics => "metrics",
            Capability::Custom => "custom",
        };
        f.write_str(name)
    }
}

//! Capability-oriented entry points on a [`Registry`]
//!
//! Every call looks up the provider for its capability kind. A missing
//! provider is a successful no-op reported as [`Dispatch::NotConfigured`].
//!
//! # Panics
//!
//! A well-known kind holding an instance of another capability can only
//! come from a custom [`crate::KindSet`] that rebinds that kind. Facade
//! calls treat it as broken provider wiring and panic.

use crate::context::Context;
use crate::provider::{ProviderInstance, ProviderKind, Registry};
use crate::severity::Severity;

/// Outcome of a fire-and-forget facade call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// Handed to the registered backend
    Delivered,
    /// No provider registered for the capability
    NotConfigured,
}

impl Dispatch {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Dispatch::Delivered)
    }
}

fn wiring_defect(kind: ProviderKind, instance: &ProviderInstance, expected: &str) -> ! {
    panic!(
        "provider registered as kind {kind} is a {} provider, not a {expected}",
        instance.capability()
    )
}

impl Registry {
    /// Log `message` at the default severity
    pub fn log(&self, message: &str, key_value_pairs: &[&str]) -> Dispatch {
        self.with_logger(|logger| logger.log(message, key_value_pairs))
    }

    pub fn log_with_level(
        &self,
        severity: Severity,
        message: &str,
        key_value_pairs: &[&str],
    ) -> Dispatch {
        self.with_logger(|logger| logger.log_with_level(severity, message, key_value_pairs))
    }

    pub fn enable_logging(&self) -> Dispatch {
        self.with_logger(|logger| logger.enable_logging())
    }

    pub fn disable_logging(&self) -> Dispatch {
        self.with_logger(|logger| logger.disable_logging())
    }

    /// Record a metric event with positional label values
    pub fn meter(&self, ctx: &Context, metric: &str, values: &[&str]) -> Dispatch {
        let Some(instance) = self.find(ProviderKind::METRICS) else {
            self.stats().metric_not_configured();
            return Dispatch::NotConfigured;
        };
        let Some(metrics) = instance.as_metrics() else {
            wiring_defect(ProviderKind::METRICS, &instance, "metrics");
        };

        metrics.meter(ctx, metric, values);
        self.stats().metric_delivered();
        Dispatch::Delivered
    }

    /// Forward an error to the registered reporter
    ///
    /// Returns `error` unchanged when a reporter is registered and `None`
    /// when none is. `None` in gives `None` out without a backend call.
    pub fn report_error<E>(&self, error: Option<E>) -> Option<E>
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let error = error?;
        let Some(instance) = self.find(ProviderKind::ERROR_REPORTER) else {
            self.stats().error_not_configured();
            return None;
        };
        let Some(reporter) = instance.as_error_reporter() else {
            wiring_defect(ProviderKind::ERROR_REPORTER, &instance, "error reporter");
        };

        reporter.report_error(&error);
        self.stats().error_reported();
        Some(error)
    }

    fn with_logger<F>(&self, f: F) -> Dispatch
    where
        F: FnOnce(&dyn crate::capability::Logger),
    {
        let Some(instance) = self.find(ProviderKind::LOGGER) else {
            self.stats().log_not_configured();
            return Dispatch::NotConfigured;
        };
        let Some(logger) = instance.as_logger() else {
            wiring_defect(ProviderKind::LOGGER, &instance, "logger");
        };

        f(logger.as_ref());
        self.stats().log_delivered();
        Dispatch::Delivered
    }
}

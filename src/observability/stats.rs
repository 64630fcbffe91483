//! Thread-safe dispatch counters
//!
//! Counts facade calls per capability and whether a provider served them.
//! Owned by each [`crate::Registry`].

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters for one registry
#[derive(Debug, Default)]
pub struct DispatchStats {
    logs_delivered: AtomicU64,
    logs_not_configured: AtomicU64,
    metrics_delivered: AtomicU64,
    metrics_not_configured: AtomicU64,
    errors_reported: AtomicU64,
    errors_not_configured: AtomicU64,
    providers_registered: AtomicU64,
    updates_applied: AtomicU64,
}

/// Point-in-time copy of [`DispatchStats`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub logs_delivered: u64,
    pub logs_not_configured: u64,
    pub metrics_delivered: u64,
    pub metrics_not_configured: u64,
    pub errors_reported: u64,
    pub errors_not_configured: u64,
    pub providers_registered: u64,
    pub updates_applied: u64,
}

impl DispatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_delivered(&self) {
        self.logs_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn log_not_configured(&self) {
        self.logs_not_configured.fetch_add(1, Ordering::Relaxed);
    }

    pub fn metric_delivered(&self) {
        self.metrics_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn metric_not_configured(&self) {
        self.metrics_not_configured.fetch_add(1, Ordering::Relaxed);
    }

    pub fn error_reported(&self) {
        self.errors_reported.fetch_add(1, Ordering::Relaxed);
    }

    pub fn error_not_configured(&self) {
        self.errors_not_configured.fetch_add(1, Ordering::Relaxed);
    }

    pub fn provider_registered(&self) {
        self.providers_registered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn update_applied(&self) {
        self.updates_applied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            logs_delivered: self.logs_delivered.load(Ordering::Relaxed),
            logs_not_configured: self.logs_not_configured.load(Ordering::Relaxed),
            metrics_delivered: self.metrics_delivered.load(Ordering::Relaxed),
            metrics_not_configured: self.metrics_not_configured.load(Ordering::Relaxed),
            errors_reported: self.errors_reported.load(Ordering::Relaxed),
            errors_not_configured: self.errors_not_configured.load(Ordering::Relaxed),
            providers_registered: self.providers_registered.load(Ordering::Relaxed),
            updates_applied: self.updates_applied.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters (useful for testing)
    pub fn reset(&self) {
        for counter in [
            &self.logs_delivered,
            &self.logs_not_configured,
            &self.metrics_delivered,
            &self.metrics_not_configured,
            &self.errors_reported,
            &self.errors_not_configured,
            &self.providers_registered,
            &self.updates_applied,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}

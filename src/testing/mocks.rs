//! Mock backend for testing
//!
//! [`RecordingBackend`] implements every capability and keeps each call in
//! memory so tests can assert on exactly what reached the backend.

use crate::capability::{Backend, ErrorReporter, Logger, Metrics};
use crate::context::Context;
use crate::error::ObserverResult;
use crate::labels::{pair_labels, Labels};
use crate::severity::Severity;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedLog {
    pub severity: Severity,
    pub message: String,
    pub labels: Labels,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedMetric {
    pub metric: String,
    pub labels: Labels,
    pub request_id: Option<Uuid>,
}

/// In-memory backend serving logging, error reporting and metrics
#[derive(Debug, Default)]
pub struct RecordingBackend {
    logs: Mutex<Vec<RecordedLog>>,
    metrics: Mutex<Vec<RecordedMetric>>,
    errors: Mutex<Vec<String>>,
    logging_disabled: AtomicBool,
    close_calls: AtomicUsize,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn logs(&self) -> Vec<RecordedLog> {
        self.logs.lock().unwrap().clone()
    }

    pub fn metrics(&self) -> Vec<RecordedMetric> {
        self.metrics.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    pub fn is_logging_disabled(&self) -> bool {
        self.logging_disabled.load(Ordering::SeqCst)
    }

    pub fn clear_history(&self) {
        self.logs.lock().unwrap().clear();
        self.metrics.lock().unwrap().clear();
        self.errors.lock().unwrap().clear();
    }
}

#[async_trait]
impl Backend for RecordingBackend {
    async fn close(&self) -> ObserverResult<()> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Logger for RecordingBackend {
    fn log(&self, message: &str, key_value_pairs: &[&str]) {
        self.log_with_level(Severity::Info, message, key_value_pairs);
    }

    fn log_with_level(&self, severity: Severity, message: &str, key_value_pairs: &[&str]) {
        if self.is_logging_disabled() {
            return;
        }
        self.logs.lock().unwrap().push(RecordedLog {
            severity,
            message: message.to_string(),
            labels: pair_labels(key_value_pairs),
        });
    }

    fn enable_logging(&self) {
        self.logging_disabled.store(false, Ordering::SeqCst);
    }

    fn disable_logging(&self) {
        self.logging_disabled.store(true, Ordering::SeqCst);
    }
}

impl ErrorReporter for RecordingBackend {
    fn report_error(&self, error: &(dyn std::error::Error + Send + Sync + 'static)) {
        self.errors.lock().unwrap().push(error.to_string());
    }
}

impl Metrics for RecordingBackend {
    fn meter(&self, ctx: &Context, metric: &str, values: &[&str]) {
        self.metrics.lock().unwrap().push(RecordedMetric {
            metric: metric.to_string(),
            labels: pair_labels(values),
            request_id: ctx.request_id(),
        });
    }
}

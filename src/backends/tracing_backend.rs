//! Backend emitting through the `tracing` crate
//!
//! Serves all three capabilities from one instance. Severity is translated
//! to the nearest `tracing::Level`; the original severity travels as a
//! field so `notice` and `alert` survive the mapping.

use crate::backends::entry::{DEFAULT_LOG_ID, ERRORS_LOG_ID, METRICS_LOG_ID};
use crate::capability::{Backend, ErrorReporter, Logger, Metrics};
use crate::config::ServiceSettings;
use crate::context::Context;
use crate::labels::{pair_labels, Labels};
use crate::severity::Severity;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::Level;

const MAX_ERROR_MESSAGE_LEN: usize = 500;

static SECRET_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(password|token|key|secret)[=:]\s*\S+").expect("secret pattern is valid")
});

static SECRET_PATH_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/[a-zA-Z0-9._/-]+/(secrets?|\.ssh|\.aws|\.config)/[a-zA-Z0-9._/-]+")
        .expect("secret path pattern is valid")
});

/// Logging, error reporting and metrics over `tracing` events
#[derive(Debug)]
pub struct TracingBackend {
    settings: ServiceSettings,
    logging_disabled: AtomicBool,
}

impl TracingBackend {
    pub fn new(settings: ServiceSettings) -> Self {
        Self {
            settings,
            logging_disabled: AtomicBool::new(false),
        }
    }

    fn emit(&self, log_id: &str, severity: Severity, payload: &str, labels: &Labels) {
        let service = self.settings.name.as_str();
        let project_id = self.settings.project_id.as_str();
        let severity_name = severity.as_str();

        macro_rules! event_at {
            ($level:expr) => {
                tracing::event!(
                    $level,
                    log_id,
                    service,
                    project_id,
                    severity = severity_name,
                    labels = ?labels,
                    "{payload}"
                )
            };
        }

        let level = to_tracing_level(severity);
        if level == Level::ERROR {
            event_at!(Level::ERROR);
        } else if level == Level::WARN {
            event_at!(Level::WARN);
        } else if level == Level::INFO {
            event_at!(Level::INFO);
        } else {
            event_at!(Level::DEBUG);
        }
    }
}

impl Backend for TracingBackend {}

impl Logger for TracingBackend {
    fn log(&self, message: &str, key_value_pairs: &[&str]) {
        self.log_with_level(Severity::Info, message, key_value_pairs);
    }

    fn log_with_level(&self, severity: Severity, message: &str, key_value_pairs: &[&str]) {
        if self.logging_disabled.load(Ordering::Relaxed) {
            return;
        }
        self.emit(
            DEFAULT_LOG_ID,
            severity,
            message,
            &pair_labels(key_value_pairs),
        );
    }

    fn enable_logging(&self) {
        self.logging_disabled.store(false, Ordering::Relaxed);
    }

    fn disable_logging(&self) {
        self.logging_disabled.store(true, Ordering::Relaxed);
    }
}

impl ErrorReporter for TracingBackend {
    fn report_error(&self, error: &(dyn std::error::Error + Send + Sync + 'static)) {
        let message = sanitize_error_message(&error.to_string());
        self.emit(ERRORS_LOG_ID, Severity::Error, &message, &Labels::new());
    }
}

impl Metrics for TracingBackend {
    fn meter(&self, ctx: &Context, metric: &str, values: &[&str]) {
        let mut labels = pair_labels(values);
        if let Some(request_id) = ctx.request_id() {
            labels
                .entry("request_id".to_string())
                .or_insert_with(|| request_id.to_string());
        }
        self.emit(METRICS_LOG_ID, Severity::Notice, metric, &labels);
    }
}

/// Translate a severity to the `tracing` scale
pub fn to_tracing_level(severity: Severity) -> Level {
    match severity {
        Severity::Debug => Level::DEBUG,
        Severity::Info | Severity::Notice => Level::INFO,
        Severity::Warn => Level::WARN,
        Severity::Error | Severity::Alert => Level::ERROR,
    }
}

/// Redact secrets and bound the length of an error message
pub fn sanitize_error_message(message: &str) -> String {
    let sanitized = SECRET_PATTERN.replace_all(message, "${1}=***");
    let mut sanitized = SECRET_PATH_PATTERN
        .replace_all(&sanitized, "/***REDACTED***/")
        .into_owned();

    if sanitized.len() > MAX_ERROR_MESSAGE_LEN {
        let truncate_suffix = "...[truncated]";
        let mut cut = MAX_ERROR_MESSAGE_LEN - truncate_suffix.len();
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized.truncate(cut);
        sanitized.push_str(truncate_suffix);
    }

    sanitized
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::fmt;
    use std::sync::{Arc, Mutex};
    use tracing::field::{Field, Visit};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{self, Layer, SubscriberExt};

    #[test]
    fn test_severity_mapping() {
        assert_eq!(to_tracing_level(Severity::Debug), Level::DEBUG);
        assert_eq!(to_tracing_level(Severity::Info), Level::INFO);
        assert_eq!(to_tracing_level(Severity::Notice), Level::INFO);
        assert_eq!(to_tracing_level(Severity::Warn), Level::WARN);
        assert_eq!(to_tracing_level(Severity::Error), Level::ERROR);
        assert_eq!(to_tracing_level(Severity::Alert), Level::ERROR);
    }

    #[test]
    fn test_sanitize_secrets() {
        let sanitized =
            sanitize_error_message("Failed to authenticate: password=secret123 token: abc456");

        assert!(!sanitized.contains("secret123"));
        assert!(!sanitized.contains("abc456"));
        assert!(sanitized.contains("password=***"));
        assert!(sanitized.contains("token=***"));
    }

    #[test]
    fn test_sanitize_paths() {
        let sanitized = sanitize_error_message("Failed to read /home/user/.ssh/id_rsa");
        assert!(sanitized.contains("/***REDACTED***/"));
        assert!(!sanitized.contains("id_rsa"));
    }

    #[test]
    fn test_sanitize_truncates_long_messages() {
        let sanitized = sanitize_error_message(&"x".repeat(600));
        assert_eq!(sanitized.len(), MAX_ERROR_MESSAGE_LEN);
        assert!(sanitized.ends_with("...[truncated]"));

        let exact = sanitize_error_message(&"x".repeat(MAX_ERROR_MESSAGE_LEN));
        assert!(!exact.contains("truncated"));
    }

    #[test]
    fn test_sanitize_truncates_on_char_boundary() {
        let sanitized = sanitize_error_message(&"é".repeat(400));
        assert!(sanitized.len() <= MAX_ERROR_MESSAGE_LEN);
        assert!(sanitized.ends_with("...[truncated]"));
    }

    #[derive(Debug, Clone)]
    struct CapturedEvent {
        level: Level,
        fields: BTreeMap<String, String>,
    }

    #[derive(Clone, Default)]
    struct CaptureLayer(Arc<Mutex<Vec<CapturedEvent>>>);

    struct FieldVisitor<'a>(&'a mut BTreeMap<String, String>);

    impl Visit for FieldVisitor<'_> {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.0.insert(field.name().to_string(), value.to_string());
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.0
                .insert(field.name().to_string(), format!("{value:?}"));
        }
    }

    impl<S: Subscriber> Layer<S> for CaptureLayer {
        fn on_event(&self, event: &Event<'_>, _ctx: layer::Context<'_, S>) {
            let mut fields = BTreeMap::new();
            event.record(&mut FieldVisitor(&mut fields));
            self.0.lock().unwrap().push(CapturedEvent {
                level: *event.metadata().level(),
                fields,
            });
        }
    }

    fn capture(f: impl FnOnce()) -> Vec<CapturedEvent> {
        let layer = CaptureLayer::default();
        let subscriber = tracing_subscriber::registry().with(layer.clone());
        tracing::subscriber::with_default(subscriber, f);
        let events = layer.0.lock().unwrap().clone();
        events
    }

    fn checkout_backend() -> TracingBackend {
        TracingBackend::new(ServiceSettings {
            project_id: "acme-prod".to_string(),
            name: "checkout".to_string(),
        })
    }

    #[test]
    fn test_log_emits_event_with_service_fields() {
        let backend = checkout_backend();
        let events = capture(|| {
            backend.log_with_level(Severity::Notice, "cache warmed", &["entries", "512"]);
        });

        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.level, Level::INFO);
        assert_eq!(event.fields["message"], "cache warmed");
        assert_eq!(event.fields["log_id"], DEFAULT_LOG_ID);
        assert_eq!(event.fields["service"], "checkout");
        assert_eq!(event.fields["project_id"], "acme-prod");
        assert_eq!(event.fields["severity"], "notice");
        assert!(event.fields["labels"].contains("entries"));
    }

    #[test]
    fn test_disabled_logging_emits_nothing() {
        let backend = checkout_backend();
        let events = capture(|| {
            backend.disable_logging();
            backend.log("dropped", &["k", "v"]);
            backend.log_with_level(Severity::Alert, "also dropped", &[]);
            backend.enable_logging();
            backend.log("kept", &[]);
        });

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].fields["message"], "kept");
    }

    #[test]
    fn test_metric_and_error_events() {
        let backend = checkout_backend();
        let ctx = Context::new_request();
        let events = capture(|| {
            backend.meter(&ctx, "requests", &["route", "/x"]);
            backend.report_error(&std::io::Error::other("login failed: password=hunter2"));
        });

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].fields["log_id"], METRICS_LOG_ID);
        assert_eq!(events[0].fields["message"], "requests");
        let request_id = ctx.request_id().unwrap().to_string();
        assert!(events[0].fields["labels"].contains(&request_id));

        assert_eq!(events[1].level, Level::ERROR);
        assert_eq!(events[1].fields["log_id"], ERRORS_LOG_ID);
        assert!(!events[1].fields["message"].contains("hunter2"));
        assert!(events[1].fields["message"].contains("password=***"));
    }
}

//! Facade dispatch behavior on an explicit registry

use observer::testing::RecordingBackend;
use observer::{Context, Dispatch, ProviderConfig, Registry, Severity};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, PartialEq)]
struct PaymentDeclined {
    order: u32,
}

impl fmt::Display for PaymentDeclined {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "payment declined for order {}", self.order)
    }
}

impl std::error::Error for PaymentDeclined {}

fn full_registry(backend: &Arc<RecordingBackend>) -> Registry {
    let (l, e, m) = (backend.clone(), backend.clone(), backend.clone());
    Registry::configure(vec![
        ProviderConfig::logger("recording.logging", move || l.clone()),
        ProviderConfig::error_reporter("recording.error", move || e.clone()),
        ProviderConfig::metrics("recording.metrics", move || m.clone()),
    ])
    .unwrap()
}

#[test]
fn test_metrics_only_registry() {
    let backend = Arc::new(RecordingBackend::new());
    let b = backend.clone();
    let registry =
        Registry::configure(vec![ProviderConfig::metrics("recording.metrics", move || b.clone())])
            .unwrap();

    assert_eq!(registry.log("hello", &[]), Dispatch::NotConfigured);
    assert!(backend.logs().is_empty());

    let dispatch = registry.meter(&Context::background(), "requests", &["route", "/x"]);
    assert_eq!(dispatch, Dispatch::Delivered);

    let metrics = backend.metrics();
    assert_eq!(metrics.len(), 1);
    assert_eq!(metrics[0].metric, "requests");
    assert_eq!(metrics[0].labels.len(), 1);
    assert_eq!(metrics[0].labels["route"], "/x");
}

#[test]
fn test_every_call_is_a_no_op_on_empty_registry() {
    let registry = Registry::configure(Vec::new()).unwrap();

    assert_eq!(registry.log("a", &["k", "v"]), Dispatch::NotConfigured);
    assert_eq!(
        registry.log_with_level(Severity::Alert, "b", &[]),
        Dispatch::NotConfigured
    );
    assert_eq!(registry.enable_logging(), Dispatch::NotConfigured);
    assert_eq!(registry.disable_logging(), Dispatch::NotConfigured);
    assert_eq!(
        registry.meter(&Context::background(), "m", &[]),
        Dispatch::NotConfigured
    );
    assert!(registry
        .report_error(Some(PaymentDeclined { order: 1 }))
        .is_none());

    let snapshot = registry.stats().snapshot();
    assert_eq!(snapshot.logs_not_configured, 4);
    assert_eq!(snapshot.metrics_not_configured, 1);
    assert_eq!(snapshot.errors_not_configured, 1);
}

#[test]
fn test_log_defaults_to_info() {
    let backend = Arc::new(RecordingBackend::new());
    let registry = full_registry(&backend);

    registry.log("started", &["port", "8080"]);
    registry.log_with_level(Severity::Warn, "slow", &["ms"]);

    let logs = backend.logs();
    assert_eq!(logs[0].severity, Severity::Info);
    assert_eq!(logs[0].labels["port"], "8080");
    assert_eq!(logs[1].severity, Severity::Warn);
    assert_eq!(logs[1].labels["ms"], "");
}

#[test]
fn test_report_error_none_skips_backend() {
    let backend = Arc::new(RecordingBackend::new());
    let registry = full_registry(&backend);

    let result: Option<PaymentDeclined> = registry.report_error(None);
    assert!(result.is_none());
    assert!(backend.errors().is_empty());
}

#[test]
fn test_report_error_returns_same_error() {
    let backend = Arc::new(RecordingBackend::new());
    let registry = full_registry(&backend);

    let returned = registry.report_error(Some(PaymentDeclined { order: 42 }));
    assert_eq!(returned, Some(PaymentDeclined { order: 42 }));
    assert_eq!(backend.errors(), vec!["payment declined for order 42"]);
    assert_eq!(registry.stats().snapshot().errors_reported, 1);
}

#[test]
fn test_disable_then_enable_logging() {
    let backend = Arc::new(RecordingBackend::new());
    let registry = full_registry(&backend);

    assert!(registry.disable_logging().is_delivered());
    registry.log("hidden", &[]);
    registry.log_with_level(Severity::Error, "also hidden", &[]);
    assert!(backend.logs().is_empty());

    // metrics are not affected by the logging flag
    registry.meter(&Context::background(), "requests", &[]);
    assert_eq!(backend.metrics().len(), 1);

    registry.enable_logging();
    registry.log("visible", &[]);
    let logs = backend.logs();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].message, "visible");
}

#[test]
fn test_meter_forwards_context() {
    let backend = Arc::new(RecordingBackend::new());
    let registry = full_registry(&backend);

    let ctx = Context::new_request().with_attribute("tenant", "acme");
    registry.meter(&ctx, "checkout", &["step", "pay"]);

    let metrics = backend.metrics();
    assert_eq!(metrics[0].request_id, ctx.request_id());
    assert!(metrics[0].request_id.is_some());
}

#[test]
fn test_concurrent_facade_calls() {
    let backend = Arc::new(RecordingBackend::new());
    let registry = Arc::new(full_registry(&backend));

    let workers: Vec<_> = (0..8)
        .map(|i| {
            let registry = registry.clone();
            std::thread::spawn(move || {
                let worker = i.to_string();
                for _ in 0..25 {
                    registry.log("tick", &["worker", &worker]);
                    registry.meter(&Context::background(), "ticks", &["worker", &worker]);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(backend.logs().len(), 200);
    assert_eq!(backend.metrics().len(), 200);
    let snapshot = registry.stats().snapshot();
    assert_eq!(snapshot.logs_delivered, 200);
    assert_eq!(snapshot.metrics_delivered, 200);
}

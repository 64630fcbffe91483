//! Backend-neutral entry record

use crate::labels::Labels;
use crate::severity::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Log id for regular log entries
pub const DEFAULT_LOG_ID: &str = "default";
/// Log id for metric events
pub const METRICS_LOG_ID: &str = "metric";
/// Log id for reported errors
pub const ERRORS_LOG_ID: &str = "errors";

/// One log line, metric event or error report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub timestamp: DateTime<Utc>,
    pub log_id: String,
    pub severity: Severity,
    pub payload: String,
    #[serde(default, skip_serializing_if = "Labels::is_empty")]
    pub labels: Labels,
    pub service: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<Uuid>,
}

impl Entry {
    pub fn log(service: &str, severity: Severity, message: &str, labels: Labels) -> Self {
        Self::new(DEFAULT_LOG_ID, service, severity, message, labels)
    }

    /// Metric events are recorded at [`Severity::Notice`]
    pub fn metric(service: &str, metric: &str, labels: Labels, request_id: Option<Uuid>) -> Self {
        Self {
            request_id,
            ..Self::new(METRICS_LOG_ID, service, Severity::Notice, metric, labels)
        }
    }

    pub fn error(service: &str, message: &str) -> Self {
        Self::new(
            ERRORS_LOG_ID,
            service,
            Severity::Error,
            message,
            Labels::new(),
        )
    }

    fn new(log_id: &str, service: &str, severity: Severity, payload: &str, labels: Labels) -> Self {
        Self {
            timestamp: Utc::now(),
            log_id: log_id.to_string(),
            severity,
            payload: payload.to_string(),
            labels,
            service: service.to_string(),
            request_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::pair_labels;

    #[test]
    fn test_metric_entry() {
        let request_id = Uuid::new_v4();
        let entry = Entry::metric(
            "checkout",
            "requests",
            pair_labels(&["route", "/x"]),
            Some(request_id),
        );

        assert_eq!(entry.log_id, METRICS_LOG_ID);
        assert_eq!(entry.severity, Severity::Notice);
        assert_eq!(entry.payload, "requests");
        assert_eq!(entry.labels["route"], "/x");
        assert_eq!(entry.request_id, Some(request_id));
    }

    #[test]
    fn test_json_omits_empty_fields() {
        let entry = Entry::error("checkout", "boom");
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["log_id"], "errors");
        assert_eq!(json["severity"], "error");
        assert!(json.get("labels").is_none());
        assert!(json.get("request_id").is_none());
    }

    #[test]
    fn test_json_parses_back() {
        let entry = Entry::log(
            "checkout",
            Severity::Warn,
            "slow",
            pair_labels(&["ms", "900"]),
        );
        let line = serde_json::to_string(&entry).unwrap();
        let parsed: Entry = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed, entry);
    }
}

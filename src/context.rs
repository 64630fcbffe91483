//! Call context forwarded to metrics backends
//!
//! The registry never reads a [`Context`]; it is handed to
//! [`crate::Metrics::meter`] as-is.

use std::collections::BTreeMap;
use uuid::Uuid;

/// Opaque per-call context
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    request_id: Option<Uuid>,
    attributes: BTreeMap<String, String>,
}

impl Context {
    /// Empty context, for calls outside any request
    pub fn background() -> Self {
        Self::default()
    }

    /// Context tagged with a freshly generated request id
    pub fn new_request() -> Self {
        Self::background().with_request_id(Uuid::new_v4())
    }

    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn request_id(&self) -> Option<Uuid> {
        self.request_id
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}

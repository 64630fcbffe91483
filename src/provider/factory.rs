//! Provider configuration: how to build one provider instance

use super::instance::ProviderInstance;
use super::kind::ProviderKind;
use crate::capability::{ErrorReporter, Logger, Metrics};
use crate::error::{ObserverError, ObserverResult};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Zero-argument constructor for a provider instance
///
/// May be invoked more than once; implementations should hand back the
/// same underlying resource on every call.
pub type ProviderFactory = Arc<dyn Fn() -> ObserverResult<ProviderInstance> + Send + Sync>;

/// A `(name, kind, factory)` triple submitted to the registry
#[derive(Clone)]
pub struct ProviderConfig {
    name: String,
    kind: ProviderKind,
    factory: ProviderFactory,
}

impl ProviderConfig {
    pub fn new<S, F>(name: S, kind: ProviderKind, factory: F) -> Self
    where
        S: Into<String>,
        F: Fn() -> ObserverResult<ProviderInstance> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            kind,
            factory: Arc::new(factory),
        }
    }

    /// Register a logger under [`ProviderKind::LOGGER`]
    pub fn logger<S, L, F>(name: S, factory: F) -> Self
    where
        S: Into<String>,
        L: Logger + 'static,
        F: Fn() -> Arc<L> + Send + Sync + 'static,
    {
        Self::new(name, ProviderKind::LOGGER, move || {
            Ok(ProviderInstance::Logger(factory()))
        })
    }

    /// Register an error reporter under [`ProviderKind::ERROR_REPORTER`]
    pub fn error_reporter<S, R, F>(name: S, factory: F) -> Self
    where
        S: Into<String>,
        R: ErrorReporter + 'static,
        F: Fn() -> Arc<R> + Send + Sync + 'static,
    {
        Self::new(name, ProviderKind::ERROR_REPORTER, move || {
            Ok(ProviderInstance::ErrorReporter(factory()))
        })
    }

    /// Register a metrics backend under [`ProviderKind::METRICS`]
    pub fn metrics<S, M, F>(name: S, factory: F) -> Self
    where
        S: Into<String>,
        M: Metrics + 'static,
        F: Fn() -> Arc<M> + Send + Sync + 'static,
    {
        Self::new(name, ProviderKind::METRICS, move || {
            Ok(ProviderInstance::Metrics(factory()))
        })
    }

    /// Register an application-defined provider under `kind`
    pub fn custom<S, T, F>(name: S, kind: ProviderKind, factory: F) -> Self
    where
        S: Into<String>,
        T: Any + Send + Sync,
        F: Fn() -> Arc<T> + Send + Sync + 'static,
    {
        Self::new(name, kind, move || Ok(ProviderInstance::Custom(factory())))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// Invoke the factory, tagging failures with the provider name
    pub fn instantiate(&self) -> ObserverResult<ProviderInstance> {
        (self.factory)().map_err(|e| ObserverError::factory_failed(&self.name, e))
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Validate provider name format: `[a-zA-Z0-9._-]+`
pub(crate) fn validate_provider_name(name: &str) -> ObserverResult<()> {
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-');

    if name.is_empty() || !valid_chars {
        return Err(ObserverError::InvalidProviderName {
            name: name.to_string(),
        });
    }

    Ok(())
}

//! Live provider instances stored by the registry

use crate::capability::{Capability, ErrorReporter, Logger, Metrics};
use crate::error::ObserverResult;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A provider instance tagged with the capability it serves
///
/// The tag is checked against the kind at registration, so dispatch never
/// needs a runtime cast for the well-known capabilities.
#[derive(Clone)]
pub enum ProviderInstance {
    Logger(Arc<dyn Logger>),
    ErrorReporter(Arc<dyn ErrorReporter>),
    Metrics(Arc<dyn Metrics>),
    Custom(Arc<dyn Any + Send + Sync>),
}

impl ProviderInstance {
    pub fn capability(&self) -> Capability {
        match self {
            ProviderInstance::Logger(_) => Capability::Logging,
            ProviderInstance::ErrorReporter(_) => Capability::ErrorReporting,
            ProviderInstance::Metrics(_) => Capability::Metrics,
            ProviderInstance::Custom(_) => Capability::Custom,
        }
    }

    pub fn as_logger(&self) -> Option<&Arc<dyn Logger>> {
        match self {
            ProviderInstance::Logger(logger) => Some(logger),
            _ => None,
        }
    }

    pub fn as_error_reporter(&self) -> Option<&Arc<dyn ErrorReporter>> {
        match self {
            ProviderInstance::ErrorReporter(reporter) => Some(reporter),
            _ => None,
        }
    }

    pub fn as_metrics(&self) -> Option<&Arc<dyn Metrics>> {
        match self {
            ProviderInstance::Metrics(metrics) => Some(metrics),
            _ => None,
        }
    }

    /// Downcast a custom instance to its concrete type
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        match self {
            ProviderInstance::Custom(any) => Arc::clone(any).downcast::<T>().ok(),
            _ => None,
        }
    }

    /// Address of the underlying object, identical for every variant built
    /// from the same `Arc`
    pub fn addr(&self) -> usize {
        match self {
            ProviderInstance::Logger(p) => Arc::as_ptr(p) as *const () as usize,
            ProviderInstance::ErrorReporter(p) => Arc::as_ptr(p) as *const () as usize,
            ProviderInstance::Metrics(p) => Arc::as_ptr(p) as *const () as usize,
            ProviderInstance::Custom(p) => Arc::as_ptr(p) as *const () as usize,
        }
    }

    /// Whether both instances wrap the same underlying object
    pub fn same_instance(&self, other: &ProviderInstance) -> bool {
        self.addr() == other.addr()
    }

    /// Whether this instance wraps `backend`
    pub fn points_to<T>(&self, backend: &Arc<T>) -> bool {
        self.addr() == Arc::as_ptr(backend) as *const () as usize
    }

    /// Run the backend close contract. Custom instances have none.
    pub async fn close(&self) -> ObserverResult<()> {
        match self {
            ProviderInstance::Logger(p) => p.close().await,
            ProviderInstance::ErrorReporter(p) => p.close().await,
            ProviderInstance::Metrics(p) => p.close().await,
            ProviderInstance::Custom(_) => Ok(()),
        }
    }
}

impl fmt::Debug for ProviderInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderInstance")
            .field("capability", &self.capability())
            .field("addr", &format_args!("{:#x}", self.addr()))
            .finish()
    }
}

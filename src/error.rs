//! Error types for the observer registry
//!
//! Configuration-time failures are loud and typed. A missing provider is
//! never an error: facade calls report it through [`crate::Dispatch`].

use crate::capability::Capability;
use crate::config::ConfigError;
use crate::provider::ProviderKind;
use thiserror::Error;

/// Main error type for registry and backend operations
#[derive(Debug, Error)]
pub enum ObserverError {
    #[error("unsupported provider type '{kind}'")]
    UnsupportedProviderType { kind: ProviderKind },

    #[error("invalid provider name '{name}': must match pattern [a-zA-Z0-9._-]+")]
    InvalidProviderName { name: String },

    #[error(
        "provider '{name}' registered as kind {kind} must implement {expected}, but provides {actual}"
    )]
    CapabilityMismatch {
        name: String,
        kind: ProviderKind,
        expected: Capability,
        actual: Capability,
    },

    #[error("provider '{name}' failed to initialize: {source}")]
    FactoryFailed {
        name: String,
        #[source]
        source: Box<ObserverError>,
    },

    #[error("observer is not configured")]
    NotConfigured,

    #[error("backend error: {message}")]
    Backend { message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ObserverError {
    /// Create unsupported provider type error
    pub fn unsupported_provider_type(kind: ProviderKind) -> Self {
        Self::UnsupportedProviderType { kind }
    }

    /// Create backend error
    pub fn backend<S: Into<String>>(message: S) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Wrap a factory failure with the name of the provider that produced it
    pub fn factory_failed<S: Into<String>>(name: S, source: ObserverError) -> Self {
        Self::FactoryFailed {
            name: name.into(),
            source: Box::new(source),
        }
    }

    /// The offending kind, for errors that carry one
    pub fn kind(&self) -> Option<ProviderKind> {
        match self {
            Self::UnsupportedProviderType { kind } | Self::CapabilityMismatch { kind, .. } => {
                Some(*kind)
            }
            Self::FactoryFailed { source, .. } => source.kind(),
            _ => None,
        }
    }
}

/// Result type for observer operations
pub type ObserverResult<T> = Result<T, ObserverError>;

//! Process-wide registry for ergonomic call sites
//!
//! The ambient instance is explicit: it is set by [`configure`] or
//! [`install`], torn down by [`uninstall`], and scoped by [`scoped`].
//! Before any of those, [`instance`] is `None` and every free function is a
//! no-op.
//!
//! ```
//! use observer::{ambient, Context, Dispatch, ProviderConfig};
//! use observer::testing::RecordingBackend;
//! use std::sync::Arc;
//!
//! let backend = Arc::new(RecordingBackend::new());
//! let b = backend.clone();
//! let _guard = ambient::scoped(Arc::new(
//!     observer::Registry::configure(vec![ProviderConfig::metrics("recording", move || b.clone())])
//!         .unwrap(),
//! ));
//!
//! assert_eq!(ambient::log("hello", &[]), Dispatch::NotConfigured);
//! assert_eq!(
//!     ambient::meter(&Context::background(), "requests", &["route", "/x"]),
//!     Dispatch::Delivered
//! );
//! ```

use crate::context::Context;
use crate::error::{ObserverError, ObserverResult};
use crate::facade::Dispatch;
use crate::provider::{KindSet, ProviderConfig, Registry};
use crate::severity::Severity;
use once_cell::sync::Lazy;
use std::sync::{Arc, RwLock};
use tracing::info;

static CURRENT: Lazy<RwLock<Option<Arc<Registry>>>> = Lazy::new(|| RwLock::new(None));

/// The current process-wide registry, if any
pub fn instance() -> Option<Arc<Registry>> {
    CURRENT
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone()
}

/// Publish `registry` as the process-wide instance, returning the previous one
pub fn install(registry: Arc<Registry>) -> Option<Arc<Registry>> {
    CURRENT
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .replace(registry)
}

/// Remove the process-wide instance
///
/// Backends are not closed; call [`Registry::close_providers`] on the
/// returned registry for that.
pub fn uninstall() -> Option<Arc<Registry>> {
    let previous = CURRENT
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .take();
    if previous.is_some() {
        info!("Observer registry uninstalled");
    }
    previous
}

/// Build a registry over the default kinds and publish it
///
/// Nothing is published when validation fails.
pub fn configure<I>(configs: I) -> ObserverResult<Arc<Registry>>
where
    I: IntoIterator<Item = ProviderConfig>,
{
    configure_with(KindSet::default(), configs)
}

pub fn configure_with<I>(kinds: KindSet, configs: I) -> ObserverResult<Arc<Registry>>
where
    I: IntoIterator<Item = ProviderConfig>,
{
    let registry = Arc::new(Registry::configure_with(kinds, configs)?);
    install(registry.clone());
    Ok(registry)
}

/// Merge providers into the process-wide registry
pub fn update<I>(configs: I) -> ObserverResult<Arc<Registry>>
where
    I: IntoIterator<Item = ProviderConfig>,
{
    let registry = instance().ok_or(ObserverError::NotConfigured)?;
    registry.update(configs)?;
    Ok(registry)
}

/// Guard restoring the previous process-wide instance on drop
#[must_use = "the registry is uninstalled when the guard is dropped"]
#[derive(Debug)]
pub struct ScopedInstance {
    previous: Option<Arc<Registry>>,
}

/// Publish `registry` until the returned guard is dropped
pub fn scoped(registry: Arc<Registry>) -> ScopedInstance {
    ScopedInstance {
        previous: install(registry),
    }
}

impl Drop for ScopedInstance {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(previous) => {
                install(previous);
            }
            None => {
                uninstall();
            }
        }
    }
}

pub fn log(message: &str, key_value_pairs: &[&str]) -> Dispatch {
    match instance() {
        Some(registry) => registry.log(message, key_value_pairs),
        None => Dispatch::NotConfigured,
    }
}

pub fn log_with_level(severity: Severity, message: &str, key_value_pairs: &[&str]) -> Dispatch {
    match instance() {
        Some(registry) => registry.log_with_level(severity, message, key_value_pairs),
        None => Dispatch::NotConfigured,
    }
}

pub fn enable_logging() -> Dispatch {
    match instance() {
        Some(registry) => registry.enable_logging(),
        None => Dispatch::NotConfigured,
    }
}

pub fn disable_logging() -> Dispatch {
    match instance() {
        Some(registry) => registry.disable_logging(),
        None => Dispatch::NotConfigured,
    }
}

pub fn meter(ctx: &Context, metric: &str, values: &[&str]) -> Dispatch {
    match instance() {
        Some(registry) => registry.meter(ctx, metric, values),
        None => Dispatch::NotConfigured,
    }
}

pub fn report_error<E>(error: Option<E>) -> Option<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    instance().and_then(|registry| registry.report_error(error))
}

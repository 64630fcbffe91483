//! Provider registry: validated, keyed store of provider instances
//!
//! ## Registration protocol
//!
//! ```text
//! [ProviderConfig..] → kind check → name check → factories → capability check
//!                                                                 ↓
//!                                         write lock, insert all (or nothing)
//! ```
//!
//! Every step runs before the map is touched, so a rejected call never
//! leaves a partial registration behind.

use super::factory::{validate_provider_name, ProviderConfig};
use super::instance::ProviderInstance;
use super::kind::{KindSet, ProviderKind};
use crate::capability::{ErrorReporter, Logger, Metrics};
use crate::error::{ObserverError, ObserverResult};
use crate::observability::stats::DispatchStats;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

#[derive(Clone)]
struct RegisteredProvider {
    name: String,
    instance: ProviderInstance,
}

/// Mapping from provider kind to provider instance
pub struct Registry {
    kinds: KindSet,
    providers: RwLock<HashMap<ProviderKind, RegisteredProvider>>,
    stats: DispatchStats,
}

impl Registry {
    /// Empty registry accepting `kinds`
    pub fn new(kinds: KindSet) -> Self {
        Self {
            kinds,
            providers: RwLock::new(HashMap::new()),
            stats: DispatchStats::new(),
        }
    }

    /// Build a registry over the default observability kinds
    pub fn configure<I>(configs: I) -> ObserverResult<Self>
    where
        I: IntoIterator<Item = ProviderConfig>,
    {
        Self::configure_with(KindSet::default(), configs)
    }

    /// Build a registry over an application-supplied set of kinds
    pub fn configure_with<I>(kinds: KindSet, configs: I) -> ObserverResult<Self>
    where
        I: IntoIterator<Item = ProviderConfig>,
    {
        let registry = Self::new(kinds);
        let built = registry.build(configs.into_iter().collect())?;
        let count = built.len();
        registry.install(built);

        info!(providers = count, "Observer registry configured");
        Ok(registry)
    }

    /// Merge providers into the registry
    ///
    /// Kinds present in `configs` are replaced, all other entries are kept.
    /// On error the registry is left untouched.
    pub fn update<I>(&self, configs: I) -> ObserverResult<()>
    where
        I: IntoIterator<Item = ProviderConfig>,
    {
        let built = self.build(configs.into_iter().collect())?;
        let count = built.len();
        self.install(built);
        self.stats.update_applied();

        info!(providers = count, "Observer registry updated");
        Ok(())
    }

    /// Pure lookup of the instance registered for `kind`
    pub fn find(&self, kind: ProviderKind) -> Option<ProviderInstance> {
        let found = self
            .read_providers()
            .get(&kind)
            .map(|entry| entry.instance.clone());
        if found.is_none() {
            debug!(%kind, "No provider registered");
        }
        found
    }

    pub fn find_logger(&self, kind: ProviderKind) -> Option<Arc<dyn Logger>> {
        self.find(kind).and_then(|p| p.as_logger().cloned())
    }

    pub fn find_error_reporter(&self, kind: ProviderKind) -> Option<Arc<dyn ErrorReporter>> {
        self.find(kind).and_then(|p| p.as_error_reporter().cloned())
    }

    pub fn find_metrics(&self, kind: ProviderKind) -> Option<Arc<dyn Metrics>> {
        self.find(kind).and_then(|p| p.as_metrics().cloned())
    }

    pub fn find_custom<T: Any + Send + Sync>(&self, kind: ProviderKind) -> Option<Arc<T>> {
        self.find(kind).and_then(|p| p.downcast::<T>())
    }

    /// Name the provider for `kind` was registered with
    pub fn provider_name(&self, kind: ProviderKind) -> Option<String> {
        self.read_providers()
            .get(&kind)
            .map(|entry| entry.name.clone())
    }

    /// Registered kinds, ascending
    pub fn registered_kinds(&self) -> Vec<ProviderKind> {
        let mut kinds: Vec<ProviderKind> = self.read_providers().keys().copied().collect();
        kinds.sort();
        kinds
    }

    pub fn kinds(&self) -> &KindSet {
        &self.kinds
    }

    pub fn len(&self) -> usize {
        self.read_providers().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_providers().is_empty()
    }

    pub fn stats(&self) -> &DispatchStats {
        &self.stats
    }

    /// Close every distinct backend held by the registry
    ///
    /// A backend registered under several kinds is closed once. Entries stay
    /// registered; closing is the backend's own contract.
    pub async fn close_providers(&self) -> ObserverResult<()> {
        let instances: Vec<ProviderInstance> = {
            let providers = self.read_providers();
            let mut kinds: Vec<&ProviderKind> = providers.keys().collect();
            kinds.sort();
            kinds
                .into_iter()
                .map(|kind| providers[kind].instance.clone())
                .collect()
        };

        let mut closed: Vec<usize> = Vec::with_capacity(instances.len());
        for instance in instances {
            let addr = instance.addr();
            if closed.contains(&addr) {
                continue;
            }
            closed.push(addr);
            instance.close().await?;
        }

        debug!(backends = closed.len(), "Closed provider backends");
        Ok(())
    }

    /// Validate and build every config without touching the map
    fn build(
        &self,
        configs: Vec<ProviderConfig>,
    ) -> ObserverResult<Vec<(ProviderKind, RegisteredProvider)>> {
        if let Some(unsupported) = first_unsupported(&self.kinds, &configs) {
            warn!(
                kind = %unsupported.kind(),
                name = unsupported.name(),
                "Rejected unsupported provider type"
            );
            return Err(ObserverError::unsupported_provider_type(unsupported.kind()));
        }

        for config in &configs {
            validate_provider_name(config.name())?;
        }

        let mut built = Vec::with_capacity(configs.len());
        for config in configs {
            let instance = config.instantiate()?;
            let expected = self
                .kinds
                .capability_of(config.kind())
                .ok_or_else(|| ObserverError::unsupported_provider_type(config.kind()))?;

            if instance.capability() != expected {
                return Err(ObserverError::CapabilityMismatch {
                    name: config.name().to_string(),
                    kind: config.kind(),
                    expected,
                    actual: instance.capability(),
                });
            }

            built.push((
                config.kind(),
                RegisteredProvider {
                    name: config.name().to_string(),
                    instance,
                },
            ));
        }

        Ok(built)
    }

    fn install(&self, built: Vec<(ProviderKind, RegisteredProvider)>) {
        let mut providers = self.write_providers();
        for (kind, entry) in built {
            debug!(%kind, name = %entry.name, "Registered provider");
            providers.insert(kind, entry);
            self.stats.provider_registered();
        }
    }

    // Inserts are the only mutation, so a poisoned map is still consistent.
    fn read_providers(&self) -> RwLockReadGuard<'_, HashMap<ProviderKind, RegisteredProvider>> {
        self.providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_providers(&self) -> RwLockWriteGuard<'_, HashMap<ProviderKind, RegisteredProvider>> {
        self.providers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("kinds", &self.kinds)
            .field("registered", &self.registered_kinds())
            .finish()
    }
}

/// First config whose kind the registry does not recognize
fn first_unsupported<'a>(
    kinds: &KindSet,
    configs: &'a [ProviderConfig],
) -> Option<&'a ProviderConfig> {
    configs.iter().find(|config| !kinds.contains(config.kind()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Capability;
    use crate::testing::RecordingBackend;

    fn recording_logger(backend: &Arc<RecordingBackend>) -> ProviderConfig {
        let b = backend.clone();
        ProviderConfig::logger("recording", move || b.clone())
    }

    #[test]
    fn test_first_unsupported_returns_first_offender() {
        let kinds = KindSet::default();
        let configs = vec![
            ProviderConfig::custom("a", ProviderKind::LOGGER, || Arc::new(0u8)),
            ProviderConfig::custom("b", ProviderKind(99), || Arc::new(0u8)),
            ProviderConfig::custom("c", ProviderKind(98), || Arc::new(0u8)),
        ];

        let offender = first_unsupported(&kinds, &configs).unwrap();
        assert_eq!(offender.kind(), ProviderKind(99));
    }

    #[test]
    fn test_capability_mismatch_rejected_at_registration() {
        let backend = Arc::new(RecordingBackend::new());
        let b = backend.clone();
        let wrong = ProviderConfig::new("wrong", ProviderKind::METRICS, move || {
            Ok(ProviderInstance::Logger(b.clone()))
        });

        let err = Registry::configure(vec![wrong]).unwrap_err();
        assert!(matches!(
            err,
            ObserverError::CapabilityMismatch {
                expected: Capability::Metrics,
                actual: Capability::Logging,
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_name_rejected() {
        let backend = Arc::new(RecordingBackend::new());
        let b = backend.clone();
        let config = ProviderConfig::logger("not valid", move || b.clone());

        let err = Registry::configure(vec![config]).unwrap_err();
        assert!(matches!(err, ObserverError::InvalidProviderName { .. }));
    }

    #[test]
    fn test_last_config_for_kind_wins() {
        let first = Arc::new(RecordingBackend::new());
        let second = Arc::new(RecordingBackend::new());

        let registry =
            Registry::configure(vec![recording_logger(&first), recording_logger(&second)])
                .unwrap();

        assert_eq!(registry.len(), 1);
        assert!(registry
            .find(ProviderKind::LOGGER)
            .unwrap()
            .points_to(&second));
    }

    #[test]
    fn test_registered_kinds_sorted() {
        let backend = Arc::new(RecordingBackend::new());
        let b = backend.clone();
        let metrics = ProviderConfig::metrics("m", move || b.clone());

        let registry = Registry::configure(vec![metrics, recording_logger(&backend)]).unwrap();
        assert_eq!(
            registry.registered_kinds(),
            vec![ProviderKind::LOGGER, ProviderKind::METRICS]
        );
        assert_eq!(
            registry.provider_name(ProviderKind::METRICS).as_deref(),
            Some("m")
        );
    }

    #[test]
    fn test_stats_count_registrations_and_updates() {
        let backend = Arc::new(RecordingBackend::new());
        let registry = Registry::configure(vec![recording_logger(&backend)]).unwrap();
        registry.update(vec![recording_logger(&backend)]).unwrap();

        let snapshot = registry.stats().snapshot();
        assert_eq!(snapshot.providers_registered, 2);
        assert_eq!(snapshot.updates_applied, 1);
    }
}

//! Provider kinds and the set of kinds a registry accepts

use crate::capability::Capability;
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a capability slot in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProviderKind(pub u16);

impl ProviderKind {
    pub const LOGGER: ProviderKind = ProviderKind(10);
    pub const ERROR_REPORTER: ProviderKind = ProviderKind(11);
    pub const METRICS: ProviderKind = ProviderKind(12);
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed set of recognized kinds, each bound to the capability it requires
///
/// The embedding application decides which kinds exist. The default set
/// holds the three observability kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindSet {
    kinds: BTreeMap<ProviderKind, Capability>,
}

impl KindSet {
    /// A set recognizing nothing
    pub fn empty() -> Self {
        Self {
            kinds: BTreeMap::new(),
        }
    }

    /// Logger, error reporter and metrics kinds
    pub fn observability() -> Self {
        Self::empty()
            .with_kind(ProviderKind::LOGGER, Capability::Logging)
            .with_kind(ProviderKind::ERROR_REPORTER, Capability::ErrorReporting)
            .with_kind(ProviderKind::METRICS, Capability::Metrics)
    }

    /// Recognize `kind`, replacing any capability it was bound to
    pub fn with_kind(mut self, kind: ProviderKind, capability: Capability) -> Self {
        self.kinds.insert(kind, capability);
        self
    }

    pub fn contains(&self, kind: ProviderKind) -> bool {
        self.kinds.contains_key(&kind)
    }

    pub fn capability_of(&self, kind: ProviderKind) -> Option<Capability> {
        self.kinds.get(&kind).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProviderKind, Capability)> + '_ {
        self.kinds.iter().map(|(kind, capability)| (*kind, *capability))
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl Default for KindSet {
    fn default() -> Self {
        Self::observability()
    }
}

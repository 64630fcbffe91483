//! Provider registry layer
//!
//! Maps provider kinds to the backend instances selected at startup and
//! guarantees every instance serves the capability its kind requires.

pub mod factory;
pub mod instance;
pub mod kind;
pub mod registry;

pub use factory::{ProviderConfig, ProviderFactory};
pub use instance::ProviderInstance;
pub use kind::{KindSet, ProviderKind};
pub use registry::Registry;

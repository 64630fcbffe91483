//! Backend adapters shipped with the crate
//!
//! Configuration names a backend per capability; [`provider_configs`]
//! turns that selection into registry configs. Every config built by one
//! call shares a lazily created backend, so a backend selected for several
//! capabilities is constructed once.

pub mod buffered;
pub mod entry;
pub mod tracing_backend;

pub use buffered::{BufferedBackend, JsonLinesSink, Sink};
pub use entry::{Entry, DEFAULT_LOG_ID, ERRORS_LOG_ID, METRICS_LOG_ID};
pub use tracing_backend::TracingBackend;

use crate::capability::{ErrorReporter, Logger, Metrics};
use crate::config::{BufferedSection, ConfigError, ObserverConfig, ServiceSettings};
use crate::error::{ObserverError, ObserverResult};
use crate::provider::{ProviderConfig, ProviderInstance, ProviderKind};
use once_cell::sync::OnceCell;
use std::fs::OpenOptions;
use std::sync::Arc;

pub const TRACING_BACKEND: &str = "tracing";
pub const BUFFERED_BACKEND: &str = "buffered";

/// Build registry configs for the backends selected in `config`
pub fn provider_configs(config: &ObserverConfig) -> ObserverResult<Vec<ProviderConfig>> {
    let tracing_cell: Arc<OnceCell<Arc<TracingBackend>>> = Arc::new(OnceCell::new());
    let buffered_cell: Arc<OnceCell<Arc<BufferedBackend>>> = Arc::new(OnceCell::new());

    let selection = [
        (ProviderKind::LOGGER, &config.providers.logger),
        (ProviderKind::ERROR_REPORTER, &config.providers.error_reporter),
        (ProviderKind::METRICS, &config.providers.metrics),
    ];

    let mut configs = Vec::new();
    for (kind, backend) in selection {
        let Some(backend) = backend.as_deref() else {
            continue;
        };
        let name = format!("{backend}.{}", kind_suffix(kind));
        let provider = match backend {
            TRACING_BACKEND => ProviderConfig::new(
                name,
                kind,
                tracing_factory(tracing_cell.clone(), config.service.clone(), kind),
            ),
            BUFFERED_BACKEND => ProviderConfig::new(
                name,
                kind,
                buffered_factory(
                    buffered_cell.clone(),
                    config.service.clone(),
                    config.buffered.clone(),
                    kind,
                ),
            ),
            other => return Err(ConfigError::UnknownBackend(other.to_string()).into()),
        };
        configs.push(provider);
    }

    Ok(configs)
}

fn kind_suffix(kind: ProviderKind) -> &'static str {
    match kind {
        ProviderKind::LOGGER => "logging",
        ProviderKind::ERROR_REPORTER => "error",
        _ => "metrics",
    }
}

fn tracing_factory(
    cell: Arc<OnceCell<Arc<TracingBackend>>>,
    settings: ServiceSettings,
    kind: ProviderKind,
) -> impl Fn() -> ObserverResult<ProviderInstance> + Send + Sync + 'static {
    move || {
        let backend = cell
            .get_or_init(|| Arc::new(TracingBackend::new(settings.clone())))
            .clone();
        Ok(wrap(kind, backend))
    }
}

fn buffered_factory(
    cell: Arc<OnceCell<Arc<BufferedBackend>>>,
    settings: ServiceSettings,
    section: BufferedSection,
    kind: ProviderKind,
) -> impl Fn() -> ObserverResult<ProviderInstance> + Send + Sync + 'static {
    move || {
        let backend = cell
            .get_or_try_init(|| {
                let backend = match &section.path {
                    Some(path) => {
                        let file = OpenOptions::new().create(true).append(true).open(path)?;
                        BufferedBackend::spawn(
                            settings.clone(),
                            JsonLinesSink::new(file),
                            section.capacity,
                        )?
                    }
                    None => BufferedBackend::spawn(
                        settings.clone(),
                        JsonLinesSink::new(std::io::stdout()),
                        section.capacity,
                    )?,
                };
                Ok::<_, ObserverError>(Arc::new(backend))
            })?
            .clone();
        Ok(wrap(kind, backend))
    }
}

fn wrap<B>(kind: ProviderKind, backend: Arc<B>) -> ProviderInstance
where
    B: Logger + ErrorReporter + Metrics + 'static,
{
    match kind {
        ProviderKind::LOGGER => ProviderInstance::Logger(backend),
        ProviderKind::ERROR_REPORTER => ProviderInstance::ErrorReporter(backend),
        _ => ProviderInstance::Metrics(backend),
    }
}

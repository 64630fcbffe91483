//! Non-blocking buffered backend
//!
//! Entries go into a bounded channel with `try_send`; a worker task on the
//! runtime drains the channel into a [`Sink`]. A full or closed channel
//! drops the entry and counts it, so callers never wait on the sink.
//! Runtime shutdown cancels the worker, so a backend that was never closed
//! loses its queued entries but never holds up shutdown.

use crate::backends::entry::Entry;
use crate::capability::{Backend, ErrorReporter, Logger, Metrics};
use crate::config::ServiceSettings;
use crate::context::Context;
use crate::error::{ObserverError, ObserverResult};
use crate::labels::pair_labels;
use crate::severity::Severity;
use async_trait::async_trait;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, RwLock};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Destination for drained entries
pub trait Sink: Send + 'static {
    fn write_entry(&mut self, entry: &Entry) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;
}

/// One JSON object per line
#[derive(Debug)]
pub struct JsonLinesSink<W: Write + Send + 'static> {
    writer: W,
}

impl<W: Write + Send + 'static> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write + Send + 'static> Sink for JsonLinesSink<W> {
    fn write_entry(&mut self, entry: &Entry) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, entry)?;
        self.writer.write_all(b"\n")
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

/// Backend handing entries to a background worker
#[derive(Debug)]
pub struct BufferedBackend {
    settings: ServiceSettings,
    sender: RwLock<Option<mpsc::Sender<Entry>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    logging_disabled: AtomicBool,
    dropped: AtomicU64,
}

impl BufferedBackend {
    /// Start the worker on the current tokio runtime
    pub fn spawn<S: Sink>(
        settings: ServiceSettings,
        sink: S,
        capacity: usize,
    ) -> ObserverResult<Self> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ObserverError::backend(format!("buffered backend needs a tokio runtime: {e}")))?;
        if capacity == 0 {
            return Err(ObserverError::backend(
                "buffered backend capacity must be greater than zero",
            ));
        }

        let (sender, receiver) = mpsc::channel(capacity);
        let worker = runtime.spawn(drain(receiver, sink));
        debug!(capacity, "Buffered backend worker started");

        Ok(Self {
            settings,
            sender: RwLock::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
            logging_disabled: AtomicBool::new(false),
            dropped: AtomicU64::new(0),
        })
    }

    /// Entries lost to a full or closed channel
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn enqueue(&self, entry: Entry) {
        let sender = self
            .sender
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let Some(sender) = sender.as_ref() else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        };

        match sender.try_send(entry) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) | Err(TrySendError::Closed(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

async fn drain<S: Sink>(mut receiver: mpsc::Receiver<Entry>, mut sink: S) {
    while let Some(entry) = receiver.recv().await {
        write_entry(&mut sink, &entry);
        while let Ok(entry) = receiver.try_recv() {
            write_entry(&mut sink, &entry);
        }
        flush(&mut sink);
    }
    flush(&mut sink);
}

fn write_entry<S: Sink>(sink: &mut S, entry: &Entry) {
    if let Err(e) = sink.write_entry(entry) {
        warn!(error = %e, log_id = %entry.log_id, "Failed to write buffered entry");
    }
}

fn flush<S: Sink>(sink: &mut S) {
    if let Err(e) = sink.flush() {
        warn!(error = %e, "Failed to flush buffered sink");
    }
}

#[async_trait]
impl Backend for BufferedBackend {
    /// Stop accepting entries, drain what is queued and join the worker
    async fn close(&self) -> ObserverResult<()> {
        self.sender
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        let worker = self
            .worker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(worker) = worker {
            worker
                .await
                .map_err(|e| ObserverError::backend(format!("buffered worker failed: {e}")))?;
            debug!(dropped = self.dropped(), "Buffered backend closed");
        }
        Ok(())
    }
}

impl Logger for BufferedBackend {
    fn log(&self, message: &str, key_value_pairs: &[&str]) {
        self.log_with_level(Severity::Info, message, key_value_pairs);
    }

    fn log_with_level(&self, severity: Severity, message: &str, key_value_pairs: &[&str]) {
        if self.logging_disabled.load(Ordering::Relaxed) {
            return;
        }
        self.enqueue(Entry::log(
            &self.settings.name,
            severity,
            message,
            pair_labels(key_value_pairs),
        ));
    }

    fn enable_logging(&self) {
        self.logging_disabled.store(false, Ordering::Relaxed);
    }

    fn disable_logging(&self) {
        self.logging_disabled.store(true, Ordering::Relaxed);
    }
}

impl ErrorReporter for BufferedBackend {
    fn report_error(&self, error: &(dyn std::error::Error + Send + Sync + 'static)) {
        self.enqueue(Entry::error(&self.settings.name, &error.to_string()));
    }
}

impl Metrics for BufferedBackend {
    fn meter(&self, ctx: &Context, metric: &str, values: &[&str]) {
        self.enqueue(Entry::metric(
            &self.settings.name,
            metric,
            pair_labels(values),
            ctx.request_id(),
        ));
    }
}

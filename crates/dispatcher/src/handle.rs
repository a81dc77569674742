//! SinkHandle - manages a sink with isolated queue and worker task

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use contracts::{TelemetryRecord, TelemetrySink};

use crate::error::DispatcherError;
use crate::metrics::{MetricsSnapshot, SinkMetrics};

/// A record waiting in a sink queue together with its channel
#[derive(Debug, Clone)]
pub struct QueuedRecord {
    pub channel: String,
    pub record: TelemetryRecord,
}

/// Handle to a running sink worker
pub struct SinkHandle {
    /// Sink name
    name: String,
    /// Channel to send records to worker
    tx: mpsc::Sender<QueuedRecord>,
    /// Shared metrics
    metrics: Arc<SinkMetrics>,
    /// Worker task handle
    worker_handle: JoinHandle<()>,
}

impl SinkHandle {
    /// Create a new SinkHandle and spawn the worker task
    pub fn spawn<S: TelemetrySink + 'static>(sink: S, queue_capacity: usize) -> Self {
        let name = sink.name().to_string();
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let metrics = Arc::new(SinkMetrics::new());

        let worker_metrics = Arc::clone(&metrics);
        let worker_name = name.clone();

        let worker_handle = tokio::spawn(async move {
            sink_worker(sink, rx, worker_metrics, worker_name).await;
        });

        Self {
            name,
            tx,
            metrics,
            worker_handle,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> &Arc<SinkMetrics> {
        &self.metrics
    }

    /// Queue a record for the sink without waiting
    ///
    /// # Errors
    /// `QueueFull` when the sink is behind (the record is dropped for this sink only),
    /// `WorkerStopped` when the worker is gone.
    pub fn try_send(&self, record: QueuedRecord) -> Result<(), DispatcherError> {
        match self.tx.try_send(record) {
            Ok(()) => {
                self.metrics
                    .on_enqueued(self.tx.max_capacity() - self.tx.capacity());
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(r)) => {
                self.metrics.on_dropped();
                warn!(
                    sink = %self.name,
                    channel = %r.channel,
                    record_id = %r.record.id(),
                    "Queue full, record dropped"
                );
                Err(DispatcherError::QueueFull {
                    sink_name: self.name.clone(),
                    record_id: r.record.id(),
                })
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(sink = %self.name, "Sink worker closed unexpectedly");
                Err(DispatcherError::WorkerStopped {
                    sink_name: self.name.clone(),
                })
            }
        }
    }

    /// Shutdown the sink worker gracefully
    ///
    /// Queued records are drained, then the sink is flushed and closed.
    /// Returns the sink's final counters.
    #[instrument(name = "sink_handle_shutdown", skip(self), fields(sink = %self.name))]
    pub async fn shutdown(self) -> MetricsSnapshot {
        drop(self.tx);
        if let Err(e) = self.worker_handle.await {
            error!(sink = %self.name, error = ?e, "Worker task panicked");
        }
        self.metrics.on_dequeued(0);
        debug!(sink = %self.name, "SinkHandle shutdown complete");
        self.metrics.snapshot()
    }
}

/// Worker task that consumes queued records and publishes them to the sink
#[instrument(
    name = "sink_worker_loop",
    skip(sink, rx, metrics),
    fields(sink = %name)
)]
async fn sink_worker<S: TelemetrySink>(
    mut sink: S,
    mut rx: mpsc::Receiver<QueuedRecord>,
    metrics: Arc<SinkMetrics>,
    name: String,
) {
    debug!(sink = %name, "Sink worker started");

    while let Some(queued) = rx.recv().await {
        metrics.on_dequeued(rx.len());

        match sink.publish(&queued.channel, &queued.record).await {
            Ok(()) => {
                metrics.on_delivered();
            }
            Err(e) => {
                metrics.on_rejected();
                error!(
                    sink = %name,
                    channel = %queued.channel,
                    record_id = %queued.record.id(),
                    error = %e,
                    "Publish failed"
                );
            }
        }
    }

    if let Err(e) = sink.flush().await {
        error!(sink = %name, error = %e, "Flush failed on shutdown");
    }
    if let Err(e) = sink.close().await {
        error!(sink = %name, error = %e, "Close failed on shutdown");
    }

    debug!(sink = %name, "Sink worker stopped");
}

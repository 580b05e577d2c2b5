//! Per-category sync worker
//!
//! One worker per configured category: collect samples on a fixed
//! cadence, publish each host's sample with a bounded retry loop, and
//! classify outcomes via the publisher. Join handles are tracked,
//! cancellation is explicit, and the inter-retry sleep itself is
//! cancellable so shutdown never waits out a backoff.

use std::sync::Arc;
use std::time::Duration;

use exrelay_core::{Collector, MetricsPublisher};
use exrelay_domain::{CategoryConfig, MetricCategory, PushOutcome};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Configuration for a category worker.
#[derive(Debug, Clone)]
pub struct CategoryWorkerConfig {
    /// Interval between sync ticks
    pub sync_interval: Duration,
    /// Pause between publish retries of one sample
    pub retry_interval: Duration,
    /// Maximum publish attempts per sample, counting the first one
    pub max_retries: u32,
    /// Join timeout when stopping
    pub join_timeout: Duration,
}

impl Default for CategoryWorkerConfig {
    fn default() -> Self {
        Self {
            sync_interval: Duration::from_secs(300),
            retry_interval: Duration::from_secs(5),
            max_retries: 3,
            join_timeout: Duration::from_secs(5),
        }
    }
}

/// Category worker with explicit lifecycle management.
pub struct CategoryWorker {
    category: MetricCategory,
    category_config: CategoryConfig,
    collector: Arc<Collector>,
    publisher: Arc<dyn MetricsPublisher>,
    config: CategoryWorkerConfig,
    shutdown: CancellationToken,
    cancellation: CancellationToken,
    task_handle: Option<JoinHandle<()>>,
}

impl CategoryWorker {
    /// Create a new worker for one category.
    ///
    /// `shutdown` is the orchestrator's shared token; cancelling it
    /// stops every worker derived from it.
    pub fn new(
        category: MetricCategory,
        category_config: CategoryConfig,
        collector: Arc<Collector>,
        publisher: Arc<dyn MetricsPublisher>,
        config: CategoryWorkerConfig,
        shutdown: CancellationToken,
    ) -> Self {
        let cancellation = shutdown.child_token();
        Self {
            category,
            category_config,
            collector,
            publisher,
            config,
            shutdown,
            cancellation,
            task_handle: None,
        }
    }

    /// Start the worker, spawning the background sync task.
    #[instrument(skip(self), fields(category = %self.category))]
    pub fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        info!("Starting category worker");

        // Fresh child token so a restarted worker is not already cancelled
        self.cancellation = self.shutdown.child_token();

        let category = self.category;
        let category_config = self.category_config.clone();
        let collector = Arc::clone(&self.collector);
        let publisher = Arc::clone(&self.publisher);
        let config = self.config.clone();
        let cancel = self.cancellation.clone();

        let handle = tokio::spawn(async move {
            Self::run_loop(category, category_config, collector, publisher, config, cancel).await;
        });

        self.task_handle = Some(handle);
        info!("Category worker started");

        Ok(())
    }

    /// Stop the worker and wait for the sync task to finish.
    #[instrument(skip(self), fields(category = %self.category))]
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        info!("Stopping category worker");

        self.cancellation.cancel();

        if let Some(handle) = self.task_handle.take() {
            let join_timeout = self.config.join_timeout;
            match tokio::time::timeout(join_timeout, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!("Worker task panicked: {}", e);
                    return Err(SchedulerError::TaskJoinFailed(e.to_string()));
                }
                Err(_) => {
                    warn!("Worker task did not complete within timeout");
                    return Err(SchedulerError::Timeout { seconds: join_timeout.as_secs() });
                }
            }
        }

        info!("Category worker stopped");
        Ok(())
    }

    /// Returns true when a worker task is active.
    pub fn is_running(&self) -> bool {
        self.task_handle.is_some()
    }

    /// Background sync loop; ticks are strictly sequential.
    async fn run_loop(
        category: MetricCategory,
        category_config: CategoryConfig,
        collector: Arc<Collector>,
        publisher: Arc<dyn MetricsPublisher>,
        config: CategoryWorkerConfig,
        cancel: CancellationToken,
    ) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(category = %category, "Worker loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(config.sync_interval) => {
                    Self::run_tick(
                        category,
                        &category_config,
                        &collector,
                        &publisher,
                        &config,
                        &cancel,
                    )
                    .await;
                }
            }
        }
    }

    /// One sync tick: collect every host's sample and publish each.
    async fn run_tick(
        category: MetricCategory,
        category_config: &CategoryConfig,
        collector: &Arc<Collector>,
        publisher: &Arc<dyn MetricsPublisher>,
        config: &CategoryWorkerConfig,
        cancel: &CancellationToken,
    ) {
        let samples = collector.collect(category, category_config).await;
        if samples.is_empty() {
            debug!(category = %category, "No samples collected this tick");
            return;
        }

        debug!(category = %category, hosts = samples.len(), "Publishing collected samples");

        for sample in &samples {
            if cancel.is_cancelled() {
                debug!(category = %category, "Tick interrupted by cancellation");
                return;
            }
            Self::publish_with_retry(publisher, sample, config, cancel).await;
        }
    }

    /// Bounded retry loop for one sample.
    ///
    /// `max_retries` counts publish attempts, the first one included.
    /// A `Fatal` outcome abandons the sample immediately; exhaustion is
    /// logged and the worker moves on to the next host.
    async fn publish_with_retry(
        publisher: &Arc<dyn MetricsPublisher>,
        sample: &exrelay_domain::MetricSample,
        config: &CategoryWorkerConfig,
        cancel: &CancellationToken,
    ) {
        let max_attempts = config.max_retries.max(1);

        for attempt in 1..=max_attempts {
            // The push itself is cancellable so a hanging gateway call
            // cannot outlive the stop timeout
            let outcome = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!(
                        category = %sample.category,
                        host = %sample.host,
                        "Publish interrupted by cancellation"
                    );
                    return;
                }
                outcome = publisher.push(sample) => outcome,
            };

            match outcome {
                PushOutcome::Success => {
                    debug!(
                        category = %sample.category,
                        host = %sample.host,
                        attempt,
                        "Sample published"
                    );
                    return;
                }
                PushOutcome::Fatal(reason) => {
                    error!(
                        category = %sample.category,
                        host = %sample.host,
                        attempt,
                        reason = %reason,
                        "Publish failed fatally, abandoning sample"
                    );
                    return;
                }
                outcome => {
                    warn!(
                        category = %sample.category,
                        host = %sample.host,
                        attempt,
                        max_attempts,
                        outcome = outcome.kind(),
                        "Publish attempt failed"
                    );

                    if attempt < max_attempts {
                        tokio::select! {
                            _ = cancel.cancelled() => {
                                debug!(
                                    category = %sample.category,
                                    host = %sample.host,
                                    "Retry wait interrupted by cancellation"
                                );
                                return;
                            }
                            _ = tokio::time::sleep(config.retry_interval) => {}
                        }
                    }
                }
            }
        }

        error!(
            category = %sample.category,
            host = %sample.host,
            max_attempts,
            "Publish retries exhausted, dropping sample until next tick"
        );
    }
}

impl Drop for CategoryWorker {
    fn drop(&mut self) {
        if self.is_running() {
            warn!(category = %self.category, "CategoryWorker dropped while running; cancelling task");
            self.cancellation.cancel();
        }
    }
}

//! Worker orchestration
//!
//! Thin owner of the per-category workers: starts them all, and on
//! shutdown cancels the shared token before joining each worker within
//! its bounded timeout. No task is ever left fire-and-forget.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};
use crate::scheduling::worker::CategoryWorker;

/// Owns and drives the set of category workers.
pub struct Orchestrator {
    workers: Vec<CategoryWorker>,
    shutdown: CancellationToken,
}

impl Orchestrator {
    /// Create an empty orchestrator with a fresh shutdown token.
    pub fn new() -> Self {
        Self { workers: Vec::new(), shutdown: CancellationToken::new() }
    }

    /// Token every worker must be derived from.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Take ownership of a worker.
    pub fn register(&mut self, worker: CategoryWorker) {
        self.workers.push(worker);
    }

    /// Start every registered worker.
    pub fn start_all(&mut self) -> SchedulerResult<()> {
        for worker in &mut self.workers {
            worker.start()?;
        }
        info!(workers = self.workers.len(), "All category workers started");
        Ok(())
    }

    /// Cancel the shared token and join every worker.
    ///
    /// Workers that fail to stop are logged and reported together; the
    /// remaining workers are still stopped.
    pub async fn shutdown(&mut self) -> SchedulerResult<()> {
        info!("Shutting down category workers");
        self.shutdown.cancel();

        let mut failures = Vec::new();
        for worker in &mut self.workers {
            if !worker.is_running() {
                continue;
            }
            if let Err(err) = worker.stop().await {
                warn!(error = %err, "Worker failed to stop cleanly");
                failures.push(err.to_string());
            }
        }

        if failures.is_empty() {
            info!("All category workers stopped");
            Ok(())
        } else {
            Err(SchedulerError::StopFailed(failures.join("; ")))
        }
    }

    /// True while at least one worker task is active.
    pub fn is_running(&self) -> bool {
        self.workers.iter().any(CategoryWorker::is_running)
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use exrelay_core::{Collector, MetricsPublisher, MetricsSource};
    use exrelay_domain::{
        CategoryConfig, MetricCategory, MetricSample, PushOutcome, Result as DomainResult,
    };

    use super::*;
    use crate::scheduling::worker::CategoryWorkerConfig;

    struct CountingPublisher(AtomicUsize);

    #[async_trait]
    impl MetricsPublisher for CountingPublisher {
        async fn push(&self, _sample: &MetricSample) -> PushOutcome {
            self.0.fetch_add(1, Ordering::SeqCst);
            PushOutcome::Success
        }
    }

    struct ConstantSource;

    #[async_trait]
    impl MetricsSource for ConstantSource {
        async fn query_value(&self, _query: &str) -> DomainResult<Option<f64>> {
            Ok(Some(1.0))
        }

        async fn ping(&self) -> DomainResult<()> {
            Ok(())
        }
    }

    fn worker(category: MetricCategory, shutdown: CancellationToken) -> CategoryWorker {
        let config = CategoryConfig {
            hosts: vec!["h1".to_owned()],
            queries: BTreeMap::from([("status".to_owned(), "up {host}".to_owned())]),
        };
        CategoryWorker::new(
            category,
            config,
            Arc::new(Collector::new(Arc::new(ConstantSource))),
            Arc::new(CountingPublisher(AtomicUsize::new(0))),
            CategoryWorkerConfig {
                sync_interval: Duration::from_millis(20),
                retry_interval: Duration::from_millis(5),
                max_retries: 3,
                join_timeout: Duration::from_secs(1),
            },
            shutdown,
        )
    }

    #[tokio::test]
    async fn starts_and_stops_every_worker() {
        let mut orchestrator = Orchestrator::new();
        let token = orchestrator.shutdown_token();
        orchestrator.register(worker(MetricCategory::Hardware, token.clone()));
        orchestrator.register(worker(MetricCategory::Database, token));

        orchestrator.start_all().unwrap();
        assert!(orchestrator.is_running());

        orchestrator.shutdown().await.unwrap();
        assert!(!orchestrator.is_running());
    }

    #[tokio::test]
    async fn shutdown_with_no_workers_is_a_no_op() {
        let mut orchestrator = Orchestrator::new();
        orchestrator.start_all().unwrap();
        orchestrator.shutdown().await.unwrap();
        assert!(!orchestrator.is_running());
    }

    #[tokio::test]
    async fn double_start_surfaces_the_worker_error() {
        let mut orchestrator = Orchestrator::new();
        let token = orchestrator.shutdown_token();
        orchestrator.register(worker(MetricCategory::Network, token));

        orchestrator.start_all().unwrap();
        assert!(matches!(orchestrator.start_all(), Err(SchedulerError::AlreadyRunning)));

        orchestrator.shutdown().await.unwrap();
    }
}

//! Application wiring
//!
//! Builds the full service graph from configuration and drives it until
//! shutdown. Bootstrap is fail-fast: an unreachable metrics source or a
//! rejected gateway login aborts startup instead of limping along.

use std::sync::Arc;

use exrelay_core::{
    Collector, GatewayTransport, MetricsPublisher, MetricsSource, Publisher, SequenceTracker,
    SessionManager,
};
use exrelay_domain::{Config, RelayError, Result};
use exrelay_infra::{
    CategoryWorker, CategoryWorkerConfig, GatewayClient, Orchestrator, PrometheusClient,
};
use tracing::{error, info};

/// The wired-up relay agent, ready to run.
pub struct App {
    orchestrator: Orchestrator,
}

impl App {
    /// Construct every service and verify both remote endpoints.
    pub async fn bootstrap(config: Config) -> Result<Self> {
        let source: Arc<dyn MetricsSource> = Arc::new(PrometheusClient::new(&config.metrics_source)?);
        source.ping().await.map_err(|err| {
            error!(endpoint = %config.metrics_source.endpoint, error = %err, "Metrics source is unreachable");
            err
        })?;
        info!(endpoint = %config.metrics_source.endpoint, "Metrics source is reachable");

        let transport: Arc<dyn GatewayTransport> = Arc::new(GatewayClient::new(&config.gateway)?);
        let session = Arc::new(SessionManager::new(Arc::clone(&transport), &config.gateway));
        session.login().await.map_err(|err| {
            error!(url = %config.gateway.url, error = %err, "Initial gateway login failed");
            err
        })?;

        let sequences = Arc::new(SequenceTracker::new());
        let publisher: Arc<dyn MetricsPublisher> =
            Arc::new(Publisher::new(transport, session, sequences, &config.gateway));
        let collector = Arc::new(Collector::new(source));

        let worker_config = CategoryWorkerConfig {
            sync_interval: config.agent.sync_interval(),
            retry_interval: config.agent.retry_interval(),
            max_retries: config.agent.max_retries,
            ..CategoryWorkerConfig::default()
        };

        let mut orchestrator = Orchestrator::new();
        let shutdown = orchestrator.shutdown_token();
        for (category, category_config) in &config.categories {
            info!(
                category = %category,
                hosts = category_config.hosts.len(),
                queries = category_config.queries.len(),
                "Registering category worker"
            );
            orchestrator.register(CategoryWorker::new(
                *category,
                category_config.clone(),
                Arc::clone(&collector),
                Arc::clone(&publisher),
                worker_config.clone(),
                shutdown.clone(),
            ));
        }

        Ok(Self { orchestrator })
    }

    /// Run until Ctrl-C, then stop every worker.
    pub async fn run(mut self) -> Result<()> {
        self.orchestrator.start_all().map_err(RelayError::from)?;
        info!("Relay agent running, press Ctrl-C to stop");

        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Failed to listen for the shutdown signal");
        }

        info!("Shutdown signal received");
        self.orchestrator.shutdown().await.map_err(RelayError::from)?;
        Ok(())
    }
}

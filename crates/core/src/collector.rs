//! Per-tick metric collection
//!
//! Collection is lossy by design: a failed query drops that metric
//! from the host's sample, and a host with nothing left is skipped.
//! Publication decides nothing here.

use std::collections::BTreeMap;
use std::sync::Arc;

use exrelay_domain::{CategoryConfig, MetricCategory, MetricSample};
use tracing::{debug, warn};

use crate::ports::MetricsSource;

/// Placeholder substituted with the host name in query templates.
const HOST_PLACEHOLDER: &str = "{host}";

/// Gathers one sample per configured host for a category.
pub struct Collector {
    source: Arc<dyn MetricsSource>,
}

impl Collector {
    /// Create a collector over a metrics source.
    pub fn new(source: Arc<dyn MetricsSource>) -> Self {
        Self { source }
    }

    /// Collect one tick's samples; every configured host is visited.
    pub async fn collect(
        &self,
        category: MetricCategory,
        config: &CategoryConfig,
    ) -> Vec<MetricSample> {
        let mut samples = Vec::with_capacity(config.hosts.len());

        for host in &config.hosts {
            let mut values = BTreeMap::new();

            for (key, template) in &config.queries {
                let query = template.replace(HOST_PLACEHOLDER, host);
                match self.source.query_value(&query).await {
                    Ok(Some(value)) => {
                        values.insert(key.clone(), value);
                    }
                    Ok(None) => {
                        warn!(category = %category, host = %host, metric = %key, "query matched no series");
                    }
                    Err(err) => {
                        warn!(
                            category = %category,
                            host = %host,
                            metric = %key,
                            error = %err,
                            "metric query failed"
                        );
                    }
                }
            }

            if values.is_empty() {
                warn!(category = %category, host = %host, "no metrics collected, skipping host");
                continue;
            }

            debug!(category = %category, host = %host, metrics = values.len(), "sample collected");
            samples.push(MetricSample { category, host: host.clone(), values });
        }

        samples
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use exrelay_domain::{RelayError, Result};
    use parking_lot::Mutex;

    use super::*;

    /// Source that answers from a fixed query table and records what
    /// it was asked.
    struct TableSource {
        answers: BTreeMap<String, Result<Option<f64>>>,
        queries: Mutex<Vec<String>>,
    }

    impl TableSource {
        fn new(answers: Vec<(&str, Result<Option<f64>>)>) -> Self {
            Self {
                answers: answers.into_iter().map(|(q, a)| (q.to_owned(), a)).collect(),
                queries: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl MetricsSource for TableSource {
        async fn query_value(&self, query: &str) -> Result<Option<f64>> {
            self.queries.lock().push(query.to_owned());
            match self.answers.get(query) {
                Some(Ok(value)) => Ok(*value),
                Some(Err(err)) => Err(RelayError::Metrics(err.to_string())),
                None => Ok(None),
            }
        }

        async fn ping(&self) -> Result<()> {
            Ok(())
        }
    }

    fn category_config(hosts: &[&str], queries: &[(&str, &str)]) -> CategoryConfig {
        CategoryConfig {
            hosts: hosts.iter().map(|h| (*h).to_owned()).collect(),
            queries: queries.iter().map(|(k, q)| ((*k).to_owned(), (*q).to_owned())).collect(),
        }
    }

    #[tokio::test]
    async fn substitutes_host_into_every_query() {
        let source = Arc::new(TableSource::new(vec![
            ("up{instance=\"h1\"}", Ok(Some(1.0))),
            ("up{instance=\"h2\"}", Ok(Some(0.0))),
        ]));
        let collector = Collector::new(source.clone());
        let config = category_config(&["h1", "h2"], &[("status", "up{instance=\"{host}\"}")]);

        let samples = collector.collect(MetricCategory::Database, &config).await;

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].host, "h1");
        assert_eq!(samples[0].values["status"], 1.0);
        assert_eq!(samples[1].host, "h2");
        assert_eq!(samples[1].values["status"], 0.0);
        assert_eq!(source.queries.lock().len(), 2);
    }

    #[tokio::test]
    async fn failed_metric_is_omitted_not_fatal() {
        let source = Arc::new(TableSource::new(vec![
            ("cpu h1", Ok(Some(12.3))),
            ("memory h1", Err(RelayError::Metrics("timeout".to_owned()))),
        ]));
        let collector = Collector::new(source);
        let config = category_config(&["h1"], &[("cpu", "cpu {host}"), ("memory", "memory {host}")]);

        let samples = collector.collect(MetricCategory::Hardware, &config).await;

        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].values.len(), 1);
        assert!(samples[0].values.contains_key("cpu"));
    }

    #[tokio::test]
    async fn host_with_no_surviving_metrics_is_skipped() {
        let source = Arc::new(TableSource::new(vec![
            ("status h1", Err(RelayError::Metrics("down".to_owned()))),
            ("status h2", Ok(Some(1.0))),
        ]));
        let collector = Collector::new(source);
        let config = category_config(&["h1", "h2"], &[("status", "status {host}")]);

        let samples = collector.collect(MetricCategory::Database, &config).await;

        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].host, "h2");
    }

    #[tokio::test]
    async fn empty_query_result_is_treated_as_missing() {
        let source = Arc::new(TableSource::new(vec![("status h1", Ok(None))]));
        let collector = Collector::new(source);
        let config = category_config(&["h1"], &[("status", "status {host}")]);

        let samples = collector.collect(MetricCategory::Database, &config).await;
        assert!(samples.is_empty());
    }
}

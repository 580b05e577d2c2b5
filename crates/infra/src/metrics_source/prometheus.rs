//! Prometheus HTTP API client
//!
//! Speaks the instant-query endpoint of any Prometheus-compatible
//! server (Prometheus, VictoriaMetrics, Thanos). Values come back as
//! strings inside a `[timestamp, value]` pair.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use exrelay_core::MetricsSource;
use exrelay_domain::{MetricsSourceConfig, RelayError, Result};
use reqwest::Method;
use serde::Deserialize;
use tracing::debug;

use crate::http::HttpClient;

const TSDB_STATUS_PATH: &str = "/api/v1/status/tsdb";

#[derive(Debug, Deserialize)]
struct PrometheusResponse {
    status: String,
    #[serde(default)]
    data: PrometheusData,
}

#[derive(Debug, Default, Deserialize)]
struct PrometheusData {
    #[serde(default)]
    result: Vec<PrometheusResult>,
}

#[derive(Debug, Deserialize)]
struct PrometheusResult {
    /// `[unix_timestamp, "value"]`
    #[serde(default)]
    value: Vec<serde_json::Value>,
}

/// Instant-query client for the metrics source.
pub struct PrometheusClient {
    http: HttpClient,
    endpoint: String,
    query_path: String,
    basic_auth: Option<String>,
}

impl PrometheusClient {
    /// Build a client for the configured source.
    pub fn new(config: &MetricsSourceConfig) -> Result<Self> {
        let http = HttpClient::builder().timeout(config.timeout()).build()?;

        let basic_auth = match (&config.username, &config.password) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => {
                Some(BASE64.encode(format!("{user}:{pass}")))
            }
            _ => None,
        };

        Ok(Self {
            http,
            endpoint: config.endpoint.trim_end_matches('/').to_owned(),
            query_path: config.query_path.clone(),
            basic_auth,
        })
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let builder = self.http.request(Method::GET, url);
        match &self.basic_auth {
            Some(auth) => builder.header("Authorization", format!("Basic {auth}")),
            None => builder,
        }
    }
}

#[async_trait]
impl MetricsSource for PrometheusClient {
    async fn query_value(&self, query: &str) -> Result<Option<f64>> {
        let url = format!("{}{}", self.endpoint, self.query_path);
        let builder = self
            .request(&url)
            .query(&[("query", query), ("time", &Utc::now().timestamp().to_string())]);

        let response = self.http.send(builder).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Metrics(format!(
                "query returned HTTP status {}",
                status.as_u16()
            )));
        }

        let body: PrometheusResponse = response
            .json()
            .await
            .map_err(|err| RelayError::Decode(format!("failed to decode query response: {err}")))?;

        if body.status != "success" {
            return Err(RelayError::Metrics(format!("query status was '{}'", body.status)));
        }

        let Some(first) = body.data.result.first() else {
            debug!(query, "query matched no series");
            return Ok(None);
        };

        // value is a [timestamp, "string"] pair
        let raw = first.value.get(1).and_then(serde_json::Value::as_str).ok_or_else(|| {
            RelayError::Decode("query result carries no string value".to_owned())
        })?;

        let parsed = raw.parse::<f64>().map_err(|err| {
            RelayError::Decode(format!("query value '{raw}' is not a number: {err}"))
        })?;

        Ok(Some(parsed))
    }

    async fn ping(&self) -> Result<()> {
        let url = format!("{}{TSDB_STATUS_PATH}", self.endpoint);
        let response = self.http.send(self.request(&url)).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Metrics(format!(
                "tsdb status page returned HTTP {}",
                status.as_u16()
            )));
        }

        Ok(())
    }
}

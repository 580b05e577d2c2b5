//! Typed configuration for the relay agent
//!
//! Loading and path probing live in the infra crate; this module only
//! defines the shape and the validation rules.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{RelayError, Result};
use crate::types::MetricCategory;

/// Root configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentConfig,
    pub metrics_source: MetricsSourceConfig,
    pub gateway: GatewayConfig,
    /// Categories to relay; absent categories are simply not scheduled.
    #[serde(default)]
    pub categories: BTreeMap<MetricCategory, CategoryConfig>,
}

/// Scheduling and logging knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub log_level: String,
    /// Maximum publish attempts per sample, counting the first one.
    pub max_retries: u32,
    pub retry_interval_seconds: u64,
    pub sync_interval_seconds: u64,
}

/// Prometheus-compatible metrics source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSourceConfig {
    pub endpoint: String,
    #[serde(default = "default_query_path")]
    pub query_path: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_source_timeout")]
    pub timeout_seconds: u64,
}

/// Reporting gateway endpoint and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub url: String,
    pub member_id: String,
    pub login_id: String,
    pub password: String,
    pub exchange_id: i64,
    #[serde(default = "default_application_id")]
    pub application_id: i64,
    #[serde(default = "default_gateway_timeout")]
    pub timeout_seconds: u64,
}

/// One category's hosts and PromQL queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    /// Hosts substituted into the `{host}` placeholder of each query.
    pub hosts: Vec<String>,
    /// Metric key to PromQL query template.
    pub queries: BTreeMap<String, String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            max_retries: 3,
            retry_interval_seconds: 5,
            sync_interval_seconds: 300,
        }
    }
}

fn default_query_path() -> String {
    "/api/v1/query".to_owned()
}

const fn default_source_timeout() -> u64 {
    10
}

const fn default_application_id() -> i64 {
    1
}

const fn default_gateway_timeout() -> u64 {
    30
}

impl AgentConfig {
    /// Pause between publish retries of one sample.
    pub const fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_seconds)
    }

    /// Cadence of the per-category poll loop.
    pub const fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_seconds)
    }
}

impl MetricsSourceConfig {
    /// Request timeout towards the metrics source.
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl GatewayConfig {
    /// Request timeout towards the gateway.
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Config {
    /// Reject configurations the agent cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.agent.max_retries == 0 {
            return Err(RelayError::Config("agent.max_retries must be at least 1".to_owned()));
        }
        if self.agent.sync_interval_seconds == 0 {
            return Err(RelayError::Config("agent.sync_interval_seconds must be non-zero".to_owned()));
        }
        if self.gateway.url.is_empty() {
            return Err(RelayError::Config("gateway.url must be set".to_owned()));
        }
        if self.metrics_source.endpoint.is_empty() {
            return Err(RelayError::Config("metrics_source.endpoint must be set".to_owned()));
        }
        if self.categories.is_empty() {
            return Err(RelayError::Config("at least one category must be configured".to_owned()));
        }
        for (category, cfg) in &self.categories {
            if cfg.hosts.is_empty() {
                return Err(RelayError::Config(format!("categories.{category}: no hosts configured")));
            }
            if cfg.queries.is_empty() {
                return Err(RelayError::Config(format!("categories.{category}: no queries configured")));
            }
        }
        Ok(())
    }
}

//! # ExRelay Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - HTTP client implementation with retry support
//! - Gateway transport (login and metrics push endpoints)
//! - Prometheus-compatible metrics source
//! - Configuration loading
//! - Per-category workers and the orchestrator
//!
//! ## Architecture
//! - Implements traits defined in `exrelay-core`
//! - Depends on `exrelay-domain` and `exrelay-core`
//! - Contains all "impure" code (I/O, HTTP)

pub mod config;
pub mod errors;
pub mod gateway;
pub mod http;
pub mod metrics_source;
pub mod scheduling;

// Re-export commonly used items
pub use errors::InfraError;
pub use gateway::GatewayClient;
pub use http::HttpClient;
pub use metrics_source::PrometheusClient;
pub use scheduling::{CategoryWorker, CategoryWorkerConfig, Orchestrator, SchedulerError};

//! Metrics source implementations

pub mod prometheus;

pub use prometheus::PrometheusClient;

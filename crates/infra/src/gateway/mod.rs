//! Reporting gateway integration

pub mod client;

pub use client::GatewayClient;

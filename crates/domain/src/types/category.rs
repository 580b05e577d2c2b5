//! Metric categories accepted by the reporting gateway

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::METRICS_PATH_PREFIX;

/// Reporting category: WHICH gateway endpoint a sample is destined for.
///
/// Each category maps to its own endpoint and carries its own sequence
/// counter on the gateway side.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MetricCategory {
    Hardware,
    Database,
    Network,
    Application,
}

/// How metric values are encoded for a category's endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadStyle {
    /// Plain numeric value per key.
    Scalar,
    /// Min/max/avg/med object per key; only `avg` is populated.
    Aggregate,
}

impl MetricCategory {
    /// Every category, in the order workers are spawned.
    pub const ALL: [Self; 4] = [Self::Hardware, Self::Database, Self::Network, Self::Application];

    /// Stable lowercase name, used in config keys and endpoint paths.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hardware => "hardware",
            Self::Database => "database",
            Self::Network => "network",
            Self::Application => "application",
        }
    }

    /// Gateway endpoint path for this category, relative to the base URL.
    pub fn endpoint_path(self) -> String {
        format!("{METRICS_PATH_PREFIX}/{}", self.as_str())
    }

    /// Value encoding the gateway expects on this category's endpoint.
    pub const fn payload_style(self) -> PayloadStyle {
        match self {
            Self::Hardware => PayloadStyle::Aggregate,
            Self::Database | Self::Network | Self::Application => PayloadStyle::Scalar,
        }
    }
}

impl fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Sequenced metrics envelope sent to the reporting gateway
//!
//! Field names and value shapes are fixed by the gateway contract;
//! everything serializes camelCase.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::category::{MetricCategory, PayloadStyle};

/// One poll cycle's values for a single host in a single category.
///
/// Keys follow the category's convention (`cpu`, `memory`, `disk`,
/// `uptime` for hardware; `status`, `packetCount`, etc. for the scalar
/// categories). Metrics whose query failed are simply absent.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub category: MetricCategory,
    pub host: String,
    pub values: BTreeMap<String, f64>,
}

impl MetricSample {
    /// True when no metric survived collection for this host.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Top-level push request body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub member_id: String,
    pub exchange_id: i64,
    pub sequence_id: u64,
    /// Unix seconds at build time.
    pub timestamp: i64,
    pub payload: Vec<MetricPayload>,
}

/// Per-application section of the envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricPayload {
    pub application_id: i64,
    pub metric_data: Vec<MetricData>,
}

/// One key/value entry inside the payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricData {
    pub key: String,
    pub value: MetricValue,
}

/// Value encodings the gateway accepts.
///
/// Scalar endpoints take a bare number; the hardware endpoint takes an
/// aggregate object of which only `avg` is populated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MetricValue {
    Scalar(f64),
    Aggregate { min: f64, max: f64, avg: f64, med: f64 },
}

impl MetricData {
    /// Build one entry following the category's value encoding.
    ///
    /// Aggregate values are normalized to the precision the gateway
    /// displays; scalar values pass through untouched.
    pub fn new(key: &str, value: f64, style: PayloadStyle) -> Self {
        let value = match style {
            PayloadStyle::Scalar => MetricValue::Scalar(value),
            PayloadStyle::Aggregate => MetricValue::Aggregate {
                min: 0.0,
                max: 0.0,
                avg: normalize_aggregate(key, value),
                med: 0.0,
            },
        };
        Self { key: key.to_owned(), value }
    }
}

impl Envelope {
    /// Assemble the wire envelope for one sample.
    ///
    /// Entries keep the sample's key order so repeated builds of the
    /// same sample serialize identically.
    pub fn build(
        member_id: &str,
        exchange_id: i64,
        application_id: i64,
        sequence_id: u64,
        timestamp: i64,
        sample: &MetricSample,
    ) -> Self {
        let style = sample.category.payload_style();
        let metric_data = sample
            .values
            .iter()
            .map(|(key, value)| MetricData::new(key, *value, style))
            .collect();

        Self {
            member_id: member_id.to_owned(),
            exchange_id,
            sequence_id,
            timestamp,
            payload: vec![MetricPayload { application_id, metric_data }],
        }
    }
}

/// Round an aggregate value to the gateway's display precision.
///
/// Uptime is reported as whole seconds, everything else to two decimal
/// places. The gateway compares the formatted text, so the value is
/// formatted and reparsed rather than rounded arithmetically.
fn normalize_aggregate(key: &str, value: f64) -> f64 {
    let formatted = if key == "uptime" {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    };
    formatted.parse().unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(category: MetricCategory, values: &[(&str, f64)]) -> MetricSample {
        MetricSample {
            category,
            host: "db-host-1".to_owned(),
            values: values.iter().map(|(k, v)| ((*k).to_owned(), *v)).collect(),
        }
    }

    #[test]
    fn aggregate_values_round_to_two_decimals() {
        let data = MetricData::new("cpu", 12.345, PayloadStyle::Aggregate);
        assert_eq!(
            data.value,
            MetricValue::Aggregate { min: 0.0, max: 0.0, avg: 12.35, med: 0.0 }
        );
    }

    #[test]
    fn uptime_rounds_to_whole_seconds() {
        let data = MetricData::new("uptime", 123_456.7, PayloadStyle::Aggregate);
        assert_eq!(
            data.value,
            MetricValue::Aggregate { min: 0.0, max: 0.0, avg: 123_457.0, med: 0.0 }
        );

        let data = MetricData::new("uptime", 99_999.4, PayloadStyle::Aggregate);
        assert_eq!(
            data.value,
            MetricValue::Aggregate { min: 0.0, max: 0.0, avg: 99_999.0, med: 0.0 }
        );
    }

    #[test]
    fn scalar_values_pass_through_unrounded() {
        let data = MetricData::new("packetCount", 17.005, PayloadStyle::Scalar);
        assert_eq!(data.value, MetricValue::Scalar(17.005));
    }

    #[test]
    fn envelope_serializes_camel_case() {
        let sample = sample(MetricCategory::Database, &[("status", 1.0)]);
        let envelope = Envelope::build("MBR42", 1, 1, 7, 1_700_000_000, &sample);
        let json = serde_json::to_value(&envelope).unwrap();

        assert_eq!(json["memberId"], "MBR42");
        assert_eq!(json["exchangeId"], 1);
        assert_eq!(json["sequenceId"], 7);
        assert_eq!(json["timestamp"], 1_700_000_000i64);
        assert_eq!(json["payload"][0]["applicationId"], 1);
        assert_eq!(json["payload"][0]["metricData"][0]["key"], "status");
        assert_eq!(json["payload"][0]["metricData"][0]["value"], 1.0);
    }

    #[test]
    fn hardware_envelope_carries_aggregate_objects() {
        let sample = sample(
            MetricCategory::Hardware,
            &[("cpu", 12.345), ("disk", 80.0), ("memory", 41.238), ("uptime", 99_999.4)],
        );
        let envelope = Envelope::build("MBR42", 1, 1, 1, 1_700_000_000, &sample);
        let json = serde_json::to_value(&envelope).unwrap();

        let entries = json["payload"][0]["metricData"].as_array().unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0]["key"], "cpu");
        assert_eq!(entries[0]["value"]["avg"], 12.35);
        assert_eq!(entries[0]["value"]["min"], 0.0);
        assert_eq!(entries[2]["value"]["avg"], 41.24);
        assert_eq!(entries[3]["key"], "uptime");
        assert_eq!(entries[3]["value"]["avg"], 99_999.0);
    }
}

//! Port interfaces for the relay's external collaborators

use async_trait::async_trait;
use exrelay_domain::{
    Envelope, GatewayReply, LoginRequest, LoginResponse, MetricCategory, MetricSample, PushOutcome,
    Result,
};

/// Trait for querying the Prometheus-compatible metrics source
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Run one instant query and return its scalar value, `None` when
    /// the query matched no series
    async fn query_value(&self, query: &str) -> Result<Option<f64>>;

    /// Cheap liveness probe, used once at bootstrap
    async fn ping(&self) -> Result<()>;
}

/// Trait for the reporting gateway's two endpoints
#[async_trait]
pub trait GatewayTransport: Send + Sync {
    /// POST the login request and decode its body
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse>;

    /// POST one envelope to the category's endpoint under the given
    /// bearer token; non-2xx statuses still decode into a reply
    async fn push(
        &self,
        category: MetricCategory,
        token: &str,
        envelope: &Envelope,
    ) -> Result<GatewayReply>;
}

/// Trait for publishing one sample and classifying the result
///
/// Schedulers depend on this instead of the concrete publisher so the
/// retry loop can be exercised without a gateway.
#[async_trait]
pub trait MetricsPublisher: Send + Sync {
    /// Attempt one publish; never fails, every failure mode is folded
    /// into the outcome
    async fn push(&self, sample: &MetricSample) -> PushOutcome;
}

//! Publication and session reconciliation
//!
//! The publisher is a pure state-transition function over its
//! collaborators: one call, one envelope, one classified outcome. It
//! never retries; the scheduler owns the retry policy.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use exrelay_domain::constants::response_code;
use exrelay_domain::{
    Envelope, GatewayConfig, GatewayReply, MetricSample, PushOutcome, RelayError,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{error, info, warn};

use crate::ports::{GatewayTransport, MetricsPublisher};
use crate::sequence::SequenceTracker;
use crate::session::SessionManager;

// The gateway reports sequence drift in prose; the corrected value is
// only available inside the description text.
static EXPECTED_SEQUENCE_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"SequenceId should be (\d+)").ok());

fn extract_expected_sequence(desc: &str) -> Option<u64> {
    EXPECTED_SEQUENCE_RE.as_ref()?.captures(desc)?.get(1)?.as_str().parse().ok()
}

/// Publishes samples to the gateway and reconciles session state.
pub struct Publisher {
    transport: Arc<dyn GatewayTransport>,
    session: Arc<SessionManager>,
    sequences: Arc<SequenceTracker>,
    member_id: String,
    exchange_id: i64,
    application_id: i64,
}

impl Publisher {
    /// Wire up a publisher over an authenticated session.
    pub fn new(
        transport: Arc<dyn GatewayTransport>,
        session: Arc<SessionManager>,
        sequences: Arc<SequenceTracker>,
        config: &GatewayConfig,
    ) -> Self {
        Self {
            transport,
            session,
            sequences,
            member_id: config.member_id.clone(),
            exchange_id: config.exchange_id,
            application_id: config.application_id,
        }
    }

    async fn classify(&self, sample: &MetricSample, reply: &GatewayReply) -> PushOutcome {
        let category = sample.category;
        let code = reply.response.response_code;
        let desc = &reply.response.response_desc;

        if (200..300).contains(&reply.status)
            && (code == response_code::SUCCESS || code == response_code::PARTIAL_SUCCESS)
        {
            for entry in &reply.response.errors {
                warn!(
                    category = %category,
                    host = %sample.host,
                    err_key = %entry.err_key,
                    err_code = entry.err_code,
                    err_desc = %entry.err_desc,
                    "entry rejected under partial success"
                );
            }
            self.sequences.advance(category);
            info!(
                category = %category,
                host = %sample.host,
                response_code = code,
                "metrics accepted"
            );
            return PushOutcome::Success;
        }

        match code {
            response_code::INVALID_TOKEN | response_code::EXPIRED_TOKEN => {
                warn!(
                    category = %category,
                    host = %sample.host,
                    response_code = code,
                    "session token rejected, reauthenticating"
                );
                if let Err(err) = self.session.login().await {
                    error!(error = %err, "relogin attempt failed");
                }
                PushOutcome::RetryableAfterReauth
            }

            response_code::INVALID_SEQUENCE_ID => match extract_expected_sequence(desc) {
                Some(expected) => {
                    self.sequences.resync(category, expected);
                    warn!(
                        category = %category,
                        host = %sample.host,
                        expected,
                        "sequence realigned to gateway expectation"
                    );
                    PushOutcome::RetryableAfterResync { expected }
                }
                None => {
                    error!(
                        category = %category,
                        host = %sample.host,
                        response_desc = %desc,
                        "sequence rejected without a usable correction"
                    );
                    PushOutcome::Fatal(format!("sequence rejected without correction: {desc}"))
                }
            },

            other => {
                error!(
                    category = %category,
                    host = %sample.host,
                    response_code = other,
                    response_desc = %desc,
                    http_status = reply.status,
                    "metrics push failed"
                );
                PushOutcome::Fatal(format!("gateway response code {other}"))
            }
        }
    }
}

#[async_trait]
impl MetricsPublisher for Publisher {
    async fn push(&self, sample: &MetricSample) -> PushOutcome {
        let category = sample.category;
        let sequence_id = self.sequences.next(category);
        let envelope = Envelope::build(
            &self.member_id,
            self.exchange_id,
            self.application_id,
            sequence_id,
            Utc::now().timestamp(),
            sample,
        );
        let token = self.session.current_token();

        match self.transport.push(category, &token, &envelope).await {
            Ok(reply) => self.classify(sample, &reply).await,
            Err(RelayError::Decode(msg)) => {
                error!(
                    category = %category,
                    host = %sample.host,
                    error = %msg,
                    "gateway response could not be decoded"
                );
                PushOutcome::Fatal(msg)
            }
            Err(err) => {
                warn!(
                    category = %category,
                    host = %sample.host,
                    error = %err,
                    "push did not reach the gateway"
                );
                PushOutcome::RetryableTransient(err.to_string())
            }
        }
    }
}

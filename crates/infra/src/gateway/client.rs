//! HTTP transport for the reporting gateway
//!
//! Carries the static header set the gateway validates on every request
//! (referer, language, environment cookie). The client is built with a
//! single attempt: the scheduler owns the retry policy, so transport
//! retries would skew its attempt accounting.

use async_trait::async_trait;
use exrelay_core::GatewayTransport;
use exrelay_domain::constants::{LOGIN_PATH, USER_AGENT};
use exrelay_domain::{
    Envelope, GatewayConfig, GatewayReply, GatewayResponse, LoginRequest, LoginResponse,
    MetricCategory, RelayError, Result,
};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, COOKIE, REFERER};
use reqwest::Method;
use tracing::debug;

use crate::http::HttpClient;

/// Gateway transport over the shared [`HttpClient`].
pub struct GatewayClient {
    http: HttpClient,
    base_url: String,
}

impl GatewayClient {
    /// Build a client for the configured gateway.
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(config.timeout())
            .max_attempts(1)
            .user_agent(USER_AGENT)
            .default_headers(static_headers(&config.url)?)
            .build()?;

        Ok(Self { http, base_url: config.url.trim_end_matches('/').to_owned() })
    }
}

/// Headers the gateway expects on every request.
///
/// The cookie selects the gateway environment: `test` for UAT URLs,
/// `prod` otherwise.
fn static_headers(url: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    let referer = HeaderValue::from_str(url)
        .map_err(|err| RelayError::Config(format!("gateway url is not a valid header: {err}")))?;
    headers.insert(REFERER, referer);
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US"));

    let cookie = if url.contains("uat") { "test" } else { "prod" };
    headers.insert(COOKIE, HeaderValue::from_static(cookie));

    Ok(headers)
}

#[async_trait]
impl GatewayTransport for GatewayClient {
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse> {
        let url = format!("{}{LOGIN_PATH}", self.base_url);
        debug!(%url, "sending login request");

        let response = self.http.send(self.http.request(Method::POST, &url).json(request)).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RelayError::Network(format!(
                "login returned HTTP status {}",
                status.as_u16()
            )));
        }

        response
            .json::<LoginResponse>()
            .await
            .map_err(|err| RelayError::Decode(format!("failed to decode login response: {err}")))
    }

    async fn push(
        &self,
        category: MetricCategory,
        token: &str,
        envelope: &Envelope,
    ) -> Result<GatewayReply> {
        let url = format!("{}{}", self.base_url, category.endpoint_path());
        debug!(%url, category = %category, sequence_id = envelope.sequence_id, "pushing metrics");

        let builder = self.http.request(Method::POST, &url).bearer_auth(token).json(envelope);
        let response = self.http.send(builder).await?;

        // The gateway reports recovery codes on non-2xx statuses with a
        // decodable body, so the status is carried alongside the body
        // instead of being treated as an error here.
        let status = response.status().as_u16();
        let body = response
            .json::<GatewayResponse>()
            .await
            .map_err(|err| RelayError::Decode(format!("failed to decode push response: {err}")))?;

        Ok(GatewayReply { status, response: body })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use exrelay_domain::MetricSample;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config(url: &str) -> GatewayConfig {
        GatewayConfig {
            url: url.to_owned(),
            member_id: "MBR42".to_owned(),
            login_id: "relay".to_owned(),
            password: "hunter2".to_owned(),
            exchange_id: 1,
            application_id: 1,
            timeout_seconds: 5,
        }
    }

    fn login_request() -> LoginRequest {
        LoginRequest {
            member_id: "MBR42".to_owned(),
            login_id: "relay".to_owned(),
            password: "hunter2".to_owned(),
        }
    }

    fn envelope() -> Envelope {
        let sample = MetricSample {
            category: MetricCategory::Database,
            host: "db-1".to_owned(),
            values: BTreeMap::from([("status".to_owned(), 1.0)]),
        };
        Envelope::build("MBR42", 1, 1, 7, 1_700_000_000, &sample)
    }

    #[tokio::test]
    async fn login_sends_credentials_and_static_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/V1/auth/login"))
            .and(header("user-agent", "LAMAAPI/1.0.0"))
            .and(header("accept-language", "en-US"))
            .and(header("cookie", "prod"))
            .and(body_partial_json(json!({"memberId": "MBR42", "loginId": "relay"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "responseCode": 601,
                "responseDesc": "success",
                "token": "tok-1"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GatewayClient::new(&config(&server.uri())).unwrap();
        let response = client.login(&login_request()).await.unwrap();

        assert_eq!(response.response_code, 601);
        assert_eq!(response.token, "tok-1");
    }

    #[tokio::test]
    async fn uat_urls_get_the_test_cookie() {
        let headers = static_headers("https://uat-gateway.example.com").unwrap();
        assert_eq!(headers.get(COOKIE).unwrap(), "test");

        let headers = static_headers("https://gateway.example.com").unwrap();
        assert_eq!(headers.get(COOKIE).unwrap(), "prod");
    }

    #[tokio::test]
    async fn push_carries_bearer_token_and_decodes_reply() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/V1/metrics/database"))
            .and(header("authorization", "Bearer tok-1"))
            .and(body_partial_json(json!({"sequenceId": 7})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "responseCode": 601,
                "responseDesc": "success"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GatewayClient::new(&config(&server.uri())).unwrap();
        let reply = client.push(MetricCategory::Database, "tok-1", &envelope()).await.unwrap();

        assert_eq!(reply.status, 200);
        assert_eq!(reply.response.response_code, 601);
    }

    #[tokio::test]
    async fn push_decodes_recovery_body_on_rejection_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/V1/metrics/database"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "responseCode": 704,
                "responseDesc": "Invalid sequence. SequenceId should be 42"
            })))
            .mount(&server)
            .await;

        let client = GatewayClient::new(&config(&server.uri())).unwrap();
        let reply = client.push(MetricCategory::Database, "tok-1", &envelope()).await.unwrap();

        assert_eq!(reply.status, 400);
        assert_eq!(reply.response.response_code, 704);
        assert!(reply.response.response_desc.contains("42"));
    }

    #[tokio::test]
    async fn undecodable_push_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let client = GatewayClient::new(&config(&server.uri())).unwrap();
        let err = client.push(MetricCategory::Database, "tok-1", &envelope()).await.unwrap_err();

        assert!(matches!(err, RelayError::Decode(_)));
    }

    #[tokio::test]
    async fn login_rejection_status_is_a_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = GatewayClient::new(&config(&server.uri())).unwrap();
        let err = client.login(&login_request()).await.unwrap_err();

        assert!(matches!(err, RelayError::Network(_)));
    }
}

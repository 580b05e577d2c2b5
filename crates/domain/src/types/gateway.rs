//! Request and response bodies of the reporting gateway
//!
//! Responses are decoded leniently: every field defaults so that a
//! partial body still yields the response code.

use serde::{Deserialize, Serialize};

/// Body of the login request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub member_id: String,
    pub login_id: String,
    pub password: String,
}

/// Body of the login response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginResponse {
    pub timestamp: i64,
    pub version_no: String,
    pub member_id: String,
    pub login_id: String,
    pub response_code: i64,
    pub response_desc: String,
    pub token: String,
}

/// Body of a metrics push response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayResponse {
    pub timestamp: i64,
    pub version_no: String,
    pub response_code: i64,
    pub response_desc: String,
    pub errors: Vec<GatewayEntryError>,
}

/// Per-entry error reported under a partial success.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayEntryError {
    pub application_id: i64,
    pub err_code: i64,
    pub err_desc: String,
    pub err_key: String,
    pub measure: Option<serde_json::Value>,
}

/// Decoded push reply: transport status plus the application body.
#[derive(Debug, Clone)]
pub struct GatewayReply {
    /// HTTP status returned by the gateway.
    pub status: u16,
    /// Decoded application-level body.
    pub response: GatewayResponse,
}

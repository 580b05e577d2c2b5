//! Gateway protocol constants
//!
//! Centralized location for the wire-level constants mandated by the
//! reporting gateway.

/// User agent sent on every gateway request.
pub const USER_AGENT: &str = "LAMAAPI/1.0.0";

/// Path of the login endpoint, relative to the gateway base URL.
pub const LOGIN_PATH: &str = "/api/V1/auth/login";

/// Path prefix shared by the per-category metrics endpoints.
pub const METRICS_PATH_PREFIX: &str = "/api/V1/metrics";

/// Application-level response codes returned by the gateway.
pub mod response_code {
    /// Push or login accepted in full.
    pub const SUCCESS: i64 = 601;
    /// Push accepted with per-entry errors.
    pub const PARTIAL_SUCCESS: i64 = 602;
    /// Credentials rejected at login.
    pub const INVALID_LOGIN: i64 = 701;
    /// Sequence number did not match the gateway's expectation.
    pub const INVALID_SEQUENCE_ID: i64 = 704;
    /// Session token unknown to the gateway.
    pub const INVALID_TOKEN: i64 = 801;
    /// Session token past its validity window.
    pub const EXPIRED_TOKEN: i64 = 802;
}

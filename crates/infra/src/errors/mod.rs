//! Conversions from external infrastructure errors into domain errors.

use exrelay_domain::RelayError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub RelayError);

impl From<InfraError> for RelayError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<RelayError> for InfraError {
    fn from(value: RelayError) -> Self {
        Self(value)
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        if value.is_timeout() {
            return Self(RelayError::Network("HTTP request timed out".into()));
        }

        if value.is_connect() {
            return Self(RelayError::Network("HTTP connection failure".into()));
        }

        if value.is_decode() {
            return Self(RelayError::Decode(format!("failed to decode response body: {value}")));
        }

        if let Some(status) = value.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => Self(RelayError::Auth(message)),
                400..=499 => Self(RelayError::InvalidInput(message)),
                _ => Self(RelayError::Network(message)),
            };
        }

        Self(RelayError::Network(value.to_string()))
    }
}

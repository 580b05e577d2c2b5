//! Gateway session lifecycle

use std::sync::Arc;

use exrelay_domain::constants::response_code;
use exrelay_domain::{GatewayConfig, LoginRequest, RelayError, Result};
use parking_lot::RwLock;
use tracing::{error, info};

use crate::ports::GatewayTransport;

/// Owns the bearer token for the gateway session.
///
/// The token is replaced atomically on a successful login and read by
/// every push; staleness is only ever discovered by a push rejection.
pub struct SessionManager {
    transport: Arc<dyn GatewayTransport>,
    member_id: String,
    login_id: String,
    password: String,
    token: RwLock<String>,
}

impl SessionManager {
    /// Create a session manager; no login is attempted here.
    pub fn new(transport: Arc<dyn GatewayTransport>, config: &GatewayConfig) -> Self {
        Self {
            transport,
            member_id: config.member_id.clone(),
            login_id: config.login_id.clone(),
            password: config.password.clone(),
            token: RwLock::new(String::new()),
        }
    }

    /// Last known token; empty before the first successful login.
    pub fn current_token(&self) -> String {
        self.token.read().clone()
    }

    /// Authenticate against the gateway and store the fresh token.
    ///
    /// Only a SUCCESS response replaces the token; any other response
    /// leaves the previous token in place. No internal retry.
    pub async fn login(&self) -> Result<()> {
        let request = LoginRequest {
            member_id: self.member_id.clone(),
            login_id: self.login_id.clone(),
            password: self.password.clone(),
        };

        let response = self.transport.login(&request).await?;

        if response.response_code != response_code::SUCCESS {
            error!(
                response_code = response.response_code,
                response_desc = %response.response_desc,
                login_id = %self.login_id,
                member_id = %self.member_id,
                "login rejected"
            );
            return Err(RelayError::Auth(format!(
                "login failed with response code {} ({})",
                response.response_code, response.response_desc
            )));
        }

        if response.token.is_empty() {
            return Err(RelayError::Auth("login accepted but no token returned".to_owned()));
        }

        *self.token.write() = response.token;
        info!(login_id = %self.login_id, member_id = %self.member_id, "login successful");

        Ok(())
    }
}

//! WebSocket authentication — verifies the token from the `authenticate`
//! event through the configured identity service.

use std::sync::Arc;

use tracing::error;

use parley_core::error::ErrorKind;
use parley_core::traits::{IdentityService, VerifiedIdentity};
use parley_core::{AppError, AppResult};

/// Authenticates WebSocket connections.
#[derive(Clone)]
pub struct WsAuthenticator {
    identity: Arc<dyn IdentityService>,
}

impl std::fmt::Debug for WsAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsAuthenticator").finish()
    }
}

impl WsAuthenticator {
    /// Creates a new WebSocket authenticator.
    pub fn new(identity: Arc<dyn IdentityService>) -> Self {
        Self { identity }
    }

    /// Verifies a token.
    ///
    /// Anything other than a clean `Authentication` rejection from the
    /// identity service is logged and reported as a generic failure.
    pub async fn authenticate(&self, token: &str) -> AppResult<VerifiedIdentity> {
        if token.trim().is_empty() {
            return Err(AppError::authentication("Missing token"));
        }
        self.identity.verify_token(token).await.map_err(|err| {
            if err.kind == ErrorKind::Authentication {
                err
            } else {
                error!(error = %err, "Identity service failed during authentication");
                AppError::authentication("Authentication failed")
            }
        })
    }
}

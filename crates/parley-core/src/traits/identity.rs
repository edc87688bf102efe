//! Token verification.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;
use crate::types::UserId;

/// Identity extracted from a verified credential token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    /// Authenticated user.
    pub user_id: UserId,
    /// Display name, when the token carries one.
    pub username: Option<String>,
}

/// Validates client credential tokens.
#[async_trait]
pub trait IdentityService: Send + Sync + std::fmt::Debug + 'static {
    /// Verify a token. Invalid or expired tokens yield an
    /// `Authentication` error.
    async fn verify_token(&self, token: &str) -> AppResult<VerifiedIdentity>;
}

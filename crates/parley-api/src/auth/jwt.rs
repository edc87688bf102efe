//! JWT validation for WebSocket authentication.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use parley_core::config::AuthConfig;
use parley_core::traits::{IdentityService, VerifiedIdentity};
use parley_core::types::UserId;
use parley_core::{AppError, AppResult};

/// JWT claims accepted from clients. The user id is read from `id`,
/// falling back to `sub`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    /// Subject, used when `id` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<UserId>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// Returns the user ID carried by the token.
    pub fn user_id(&self) -> Option<UserId> {
        self.id.or(self.sub)
    }
}

/// Verifies HS256-signed tokens issued by the account service.
#[derive(Clone)]
pub struct JwtIdentityService {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtIdentityService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtIdentityService")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtIdentityService {
    /// Creates a verifier from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = config.leeway_seconds;
        validation.required_spec_claims.clear();
        validation.required_spec_claims.insert("exp".to_string());

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    fn decode_claims(&self, token: &str) -> AppResult<Claims> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::authentication("Token has expired")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidToken => {
                        AppError::authentication("Invalid token format")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::authentication("Invalid token signature")
                    }
                    _ => AppError::authentication(format!("Token validation failed: {e}")),
                }
            })?;
        Ok(token_data.claims)
    }
}

#[async_trait]
impl IdentityService for JwtIdentityService {
    async fn verify_token(&self, token: &str) -> AppResult<VerifiedIdentity> {
        let claims = self.decode_claims(token)?;
        let user_id = claims
            .user_id()
            .ok_or_else(|| AppError::authentication("Token does not identify a user"))?;

        Ok(VerifiedIdentity {
            user_id,
            username: claims.username,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header, encode};

    use parley_core::error::ErrorKind;

    use super::*;

    const SECRET: &str = "test-secret";

    fn service() -> JwtIdentityService {
        JwtIdentityService::new(&AuthConfig {
            jwt_secret: SECRET.to_string(),
            leeway_seconds: 0,
        })
    }

    fn token(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .expect("encode")
    }

    #[tokio::test]
    async fn test_valid_token_with_id_claim() {
        let user = UserId::new();
        let claims = Claims {
            id: Some(user),
            sub: None,
            username: Some("alice".into()),
            exp: Utc::now().timestamp() + 600,
        };
        let identity = service()
            .verify_token(&token(&claims, SECRET))
            .await
            .expect("valid");
        assert_eq!(identity.user_id, user);
        assert_eq!(identity.username.as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_sub_claim_fallback() {
        let user = UserId::new();
        let claims = Claims {
            id: None,
            sub: Some(user),
            username: None,
            exp: Utc::now().timestamp() + 600,
        };
        let identity = service()
            .verify_token(&token(&claims, SECRET))
            .await
            .expect("valid");
        assert_eq!(identity.user_id, user);
    }

    #[tokio::test]
    async fn test_rejections_are_authentication_errors() {
        let claims = Claims {
            id: Some(UserId::new()),
            sub: None,
            username: None,
            exp: Utc::now().timestamp() + 600,
        };
        let err = service()
            .verify_token(&token(&claims, "wrong-secret"))
            .await
            .expect_err("bad signature");
        assert_eq!(err.kind, ErrorKind::Authentication);

        let expired = Claims {
            exp: Utc::now().timestamp() - 600,
            ..claims.clone()
        };
        let err = service()
            .verify_token(&token(&expired, SECRET))
            .await
            .expect_err("expired");
        assert_eq!(err.kind, ErrorKind::Authentication);

        let err = service().verify_token("garbage").await.expect_err("garbage");
        assert_eq!(err.kind, ErrorKind::Authentication);

        let anonymous = Claims {
            id: None,
            sub: None,
            ..claims
        };
        let err = service()
            .verify_token(&token(&anonymous, SECRET))
            .await
            .expect_err("no user");
        assert_eq!(err.kind, ErrorKind::Authentication);
    }
}

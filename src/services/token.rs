//! Bearer token service
//!
//! HS256 token signing and verification with typed claims. The claims
//! carry the account id and role so authenticated handlers can apply role
//! scoping without an extra lookup.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::models::{User, UserRole};

/// Token payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: i64,
    /// Account role at issue time
    pub user_type: UserRole,
    /// Issued-at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

/// Token errors, classified so the API can tell the client what went wrong.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token 已过期")]
    Expired,

    #[error("Token 尚未生效")]
    NotYetValid,

    #[error("Token 格式无效")]
    Invalid,

    #[error("Token 生成失败: {0}")]
    Generation(String),

    #[error("签名密钥未配置")]
    MissingSecret,
}

/// Signs and verifies bearer tokens.
pub struct TokenService {
    secret: String,
    expiry_hours: i64,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            expiry_hours: config.token_expiry_hours,
        }
    }

    /// Generate a token for a logged-in user.
    pub fn generate(&self, user: &User) -> Result<String, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let now = Utc::now();
        let claims = Claims {
            sub: user.id,
            user_type: user.user_type,
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.expiry_hours)).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| TokenError::Generation(e.to_string()))
    }

    /// Verify a token and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        if self.secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            jsonwebtoken::errors::ErrorKind::ImmatureSignature => TokenError::NotYetValid,
            _ => TokenError::Invalid,
        })?;

        Ok(data.claims)
    }
}

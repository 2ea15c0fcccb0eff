//! JWT token generation and validation
//!
//! Provides access and refresh token management with pre-computed keys.
//! Signing and verification are pure functions of the secret and the
//! claims, so a [`JwtService`] can be shared freely across tasks.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Kind of token, carried in the `token_type` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenType::Access => f.write_str("access"),
            TokenType::Refresh => f.write_str("refresh"),
        }
    }
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub token_type: TokenType,
    /// Unique token ID
    pub jti: String,
}

impl Claims {
    /// Account ID the token is bound to
    pub fn account_id(&self) -> Result<Uuid, TokenError> {
        Uuid::parse_str(&self.sub).map_err(|_| TokenError::Malformed)
    }
}

/// Token issuing and verification errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token is malformed")]
    Malformed,

    #[error("expected a {expected} token")]
    WrongType { expected: TokenType },

    #[error("token subject is not an active account")]
    AccountUnavailable,

    #[error("failed to sign token: {0}")]
    Encoding(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        }
    }
}

/// Pre-computed JWT keys
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }
}

/// Token lifetimes
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub access_token_expiry_secs: i64,
    pub refresh_token_expiry_secs: i64,
}

/// JWT service for token operations
///
/// Keys are derived once at construction and wrapped in Arc, so cloning
/// the service is cheap.
#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    config: JwtConfig,
    validation: Arc<Validation>,
}

impl JwtService {
    /// Create a new JWT service with pre-computed keys
    ///
    /// Call this once at startup and share the result through `AppState`.
    pub fn new(secret: &str, access_token_expiry_secs: i64, refresh_token_expiry_secs: i64) -> Self {
        let mut validation = Validation::default();
        validation.leeway = 0;

        Self {
            keys: JwtKeys::new(secret),
            config: JwtConfig {
                access_token_expiry_secs,
                refresh_token_expiry_secs,
            },
            validation: Arc::new(validation),
        }
    }

    /// Generate an access token for an account
    #[inline]
    pub fn generate_access_token(&self, account_id: Uuid) -> Result<String, TokenError> {
        self.generate_token(account_id, TokenType::Access, self.config.access_token_expiry_secs)
    }

    /// Generate a refresh token for an account
    #[inline]
    pub fn generate_refresh_token(&self, account_id: Uuid) -> Result<String, TokenError> {
        self.generate_token(account_id, TokenType::Refresh, self.config.refresh_token_expiry_secs)
    }

    fn generate_token(
        &self,
        account_id: Uuid,
        token_type: TokenType,
        expiry_secs: i64,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(expiry_secs);

        let claims = Claims {
            sub: account_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            token_type,
            jti: Uuid::new_v4().simple().to_string(),
        };

        encode(&Header::default(), &claims, &self.keys.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Validate signature and expiry and return the claims
    #[inline]
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        let token_data = decode::<Claims>(token, &self.keys.decoding, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Validate an access token specifically
    #[inline]
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_typed(token, TokenType::Access)
    }

    /// Validate a refresh token specifically
    #[inline]
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate_typed(token, TokenType::Refresh)
    }

    fn validate_typed(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let claims = self.validate_token(token)?;
        if claims.token_type != expected {
            return Err(TokenError::WrongType { expected });
        }
        Ok(claims)
    }

    #[inline]
    pub fn access_token_expiry_secs(&self) -> i64 {
        self.config.access_token_expiry_secs
    }

    #[inline]
    pub fn refresh_token_expiry_secs(&self) -> i64 {
        self.config.refresh_token_expiry_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> JwtService {
        JwtService::new("test-secret", 300, 86400)
    }

    #[test]
    fn test_generate_and_validate_access_token() {
        let service = create_test_service();
        let account_id = Uuid::new_v4();

        let token = service.generate_access_token(account_id).unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.account_id().unwrap(), account_id);
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.exp - claims.iat, 300);
    }

    #[test]
    fn test_generate_and_validate_refresh_token() {
        let service = create_test_service();
        let account_id = Uuid::new_v4();

        let token = service.generate_refresh_token(account_id).unwrap();
        let claims = service.validate_refresh_token(&token).unwrap();

        assert_eq!(claims.sub, account_id.to_string());
        assert_eq!(claims.token_type, TokenType::Refresh);
        assert_eq!(claims.exp - claims.iat, 86400);
    }

    #[test]
    fn test_token_ids_are_unique() {
        let service = create_test_service();
        let account_id = Uuid::new_v4();

        let a = service.generate_refresh_token(account_id).unwrap();
        let b = service.generate_refresh_token(account_id).unwrap();

        let a = service.validate_token(&a).unwrap();
        let b = service.validate_token(&b).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        let service = create_test_service();
        let token = service.generate_access_token(Uuid::new_v4()).unwrap();

        assert_eq!(
            service.validate_refresh_token(&token).unwrap_err(),
            TokenError::WrongType {
                expected: TokenType::Refresh
            }
        );
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let service = create_test_service();
        let token = service.generate_refresh_token(Uuid::new_v4()).unwrap();

        assert!(service.validate_access_token(&token).is_err());
    }

    #[test]
    fn test_invalid_token_rejected() {
        let service = create_test_service();
        assert_eq!(
            service.validate_token("invalid.token.here").unwrap_err(),
            TokenError::Malformed
        );
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = JwtService::new("test-secret", -10, -10);
        let token = service.generate_refresh_token(Uuid::new_v4()).unwrap();

        assert_eq!(
            service.validate_refresh_token(&token).unwrap_err(),
            TokenError::Expired
        );
    }

    #[test]
    fn test_token_signed_with_other_secret_rejected() {
        let service = create_test_service();
        let other = JwtService::new("another-secret", 300, 86400);
        let token = other.generate_access_token(Uuid::new_v4()).unwrap();

        assert_eq!(
            service.validate_access_token(&token).unwrap_err(),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn test_swapped_payload_rejected() {
        let service = create_test_service();
        let victim = service.generate_refresh_token(Uuid::new_v4()).unwrap();
        let attacker = service.generate_refresh_token(Uuid::new_v4()).unwrap();

        let victim_parts: Vec<&str> = victim.split('.').collect();
        let attacker_parts: Vec<&str> = attacker.split('.').collect();
        let forged = format!(
            "{}.{}.{}",
            victim_parts[0], victim_parts[1], attacker_parts[2]
        );

        assert_eq!(
            service.validate_refresh_token(&forged).unwrap_err(),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn test_service_is_clone_cheap() {
        let service = create_test_service();
        let cloned = service.clone();
        let token = service.generate_access_token(Uuid::new_v4()).unwrap();
        assert!(cloned.validate_access_token(&token).is_ok());
    }
}

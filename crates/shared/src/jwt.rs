//! JWT validation for tokens issued by the external identity provider.
//!
//! The backend never manages credentials; it only checks the shared-secret
//! signature and lifts the opaque subject out of the claims. Token issuance
//! exists for development tooling and tests.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::OwnerId;

/// JWT configuration.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key shared with the identity provider.
    pub secret: String,
    /// Access token expiration in minutes (dev issuance only).
    pub access_token_expires_minutes: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "change-me-in-production".to_string(),
            access_token_expires_minutes: 15,
        }
    }
}

/// Errors that can occur during JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Token encoding failed.
    #[error("failed to encode token: {0}")]
    EncodingError(String),

    /// Token decoding failed.
    #[error("failed to decode token: {0}")]
    DecodingError(String),

    /// Token has expired.
    #[error("token has expired")]
    Expired,
}

/// JWT claims for access tokens. The subject is the opaque owner identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (owner identifier from the identity provider).
    pub sub: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for an owner.
    #[must_use]
    pub fn new(owner: &OwnerId, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: owner.as_str().to_string(),
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the owner identifier from the claims.
    #[must_use]
    pub fn owner_id(&self) -> OwnerId {
        OwnerId::new(self.sub.clone())
    }
}

/// JWT service for token operations.
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("config", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    /// Creates a new JWT service with the given configuration.
    #[must_use]
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Generates an access token for an owner (development tooling).
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if token generation fails.
    pub fn generate_access_token(&self, owner: &OwnerId) -> Result<String, JwtError> {
        let expires_at = Utc::now() + Duration::minutes(self.config.access_token_expires_minutes);
        let claims = Claims::new(owner, expires_at);

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }

    /// Validates and decodes a token.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::Expired` if the token has expired.
    /// Returns `JwtError::DecodingError` if the token is malformed.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let validation = Validation::default();

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::DecodingError(e.to_string()),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn create_test_service() -> JwtService {
        JwtService::new(JwtConfig {
            secret: "test-secret-key-for-testing".to_string(),
            access_token_expires_minutes: 15,
        })
    }

    #[test]
    fn test_token_roundtrip_preserves_subject() {
        let service = create_test_service();
        let owner = OwnerId::new("user_2abcDEF123");

        let token = service.generate_access_token(&owner).unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.owner_id(), owner);
        assert!(claims.exp > claims.iat);
    }

    #[rstest]
    #[case("")]
    #[case("garbage")]
    #[case("a.b.c")]
    fn test_validate_rejects_malformed(#[case] token: &str) {
        let service = create_test_service();
        assert!(matches!(
            service.validate_token(token),
            Err(JwtError::DecodingError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_wrong_secret() {
        let service = create_test_service();
        let owner = OwnerId::new("user_1");
        let token = service.generate_access_token(&owner).unwrap();

        let other = JwtService::new(JwtConfig {
            secret: "a-different-secret".to_string(),
            access_token_expires_minutes: 15,
        });

        assert!(other.validate_token(&token).is_err());
    }

    #[test]
    fn test_validate_rejects_expired() {
        let service = create_test_service();
        let owner = OwnerId::new("user_1");
        let claims = Claims::new(&owner, Utc::now() - Duration::hours(2));
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test-secret-key-for-testing".as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            service.validate_token(&token),
            Err(JwtError::Expired)
        ));
    }
}

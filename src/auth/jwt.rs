//! JWT issue and validation.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AuthContext, AuthError};
use crate::domain::{Role, UserId};

/// Default token lifetime.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// JWT claims for Verdantia
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// JWT ID
    pub jti: String,

    /// Display name
    pub username: String,

    /// Account role (`participant` | `authority`)
    pub role: String,
}

/// JWT validator and issuer
pub struct JwtValidator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
}

impl JwtValidator {
    pub fn new(secret: &[u8], issuer: &str, audience: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: issuer.to_string(),
            audience: audience.to_string(),
        }
    }

    /// Issue a token for an authenticated user.
    pub fn issue(
        &self,
        user_id: &UserId,
        username: &str,
        role: Role,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        let now = Utc::now();

        let claims = Claims {
            sub: user_id.to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            username: username.to_string(),
            role: role.as_str().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    /// Validate a token and return the caller's auth context.
    pub fn validate(&self, token: &str) -> Result<AuthContext, AuthError> {
        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken(e.to_string()),
            })?;

        let claims = token_data.claims;

        let user_id = Uuid::parse_str(&claims.sub)
            .map(UserId::from_uuid)
            .map_err(|_| AuthError::InvalidToken("invalid user id".to_string()))?;

        Ok(AuthContext {
            user_id,
            username: claims.username,
            role: Role::parse_or_participant(&claims.role),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_validator() -> JwtValidator {
        JwtValidator::new(b"test-secret-key-for-testing-only", "verdantia", "verdantia-api")
    }

    #[test]
    fn issue_and_validate() {
        let validator = create_validator();
        let user_id = UserId::new();

        let token = validator
            .issue(&user_id, "asha", Role::Participant, Duration::hours(1))
            .unwrap();
        let context = validator.validate(&token).unwrap();

        assert_eq!(context.user_id, user_id);
        assert_eq!(context.username, "asha");
        assert_eq!(context.role, Role::Participant);
        assert!(!context.is_authority());
    }

    #[test]
    fn authority_role_survives_roundtrip() {
        let validator = create_validator();
        let token = validator
            .issue(&UserId::new(), "gov", Role::Authority, Duration::hours(1))
            .unwrap();
        let context = validator.validate(&token).unwrap();
        assert!(context.is_authority());
    }

    #[test]
    fn expired_token_is_rejected() {
        let validator = create_validator();
        // -120 seconds to exceed the default 60-second leeway in jsonwebtoken
        let token = validator
            .issue(&UserId::new(), "asha", Role::Participant, Duration::seconds(-120))
            .unwrap();

        let result = validator.validate(&token);
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let issuing = create_validator();
        let validating =
            JwtValidator::new(b"test-secret-key-for-testing-only", "verdantia", "other-api");

        let token = issuing
            .issue(&UserId::new(), "asha", Role::Participant, Duration::hours(1))
            .unwrap();
        assert!(matches!(
            validating.validate(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }
}

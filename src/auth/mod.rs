//! Authentication and authorization for Verdantia
//!
//! The HTTP layer authenticates every call with a JWT and hands the core
//! an [`AuthContext`] of `(user id, username, role)`, which the core
//! trusts completely. Role checks happen exactly once per request via
//! [`AuthContext::require_authority`] rather than ad-hoc comparisons in
//! each handler.
//!
//! # Configuration
//!
//! - `JWT_SECRET`: HMAC secret for token signing/validation (required)
//! - `RATE_LIMIT_PER_MINUTE`: optional per-user request ceiling

mod jwt;
mod middleware;
mod password;

pub use jwt::{Claims, JwtValidator, TOKEN_TTL_HOURS};
pub use middleware::{auth_middleware, AuthContextExt, AuthMiddlewareState, RateLimiter};
pub use password::{hash_password, verify_password};

use crate::domain::{Role, UserId};

/// Authenticated caller identity attached to each request.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
}

impl AuthContext {
    /// The single capability check for authority-only operations.
    pub fn require_authority(&self) -> Result<(), AuthError> {
        if self.role == Role::Authority {
            Ok(())
        } else {
            Err(AuthError::InsufficientPermissions)
        }
    }

    pub fn is_authority(&self) -> bool {
        self.role == Role::Authority
    }
}

/// Authentication error
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing authentication")]
    MissingAuth,

    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    TokenExpired,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("insufficient permissions")]
    InsufficientPermissions,

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("internal auth error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authority_check() {
        let participant = AuthContext {
            user_id: UserId::new(),
            username: "u".to_string(),
            role: Role::Participant,
        };
        let authority = AuthContext {
            user_id: UserId::new(),
            username: "gov".to_string(),
            role: Role::Authority,
        };

        assert!(matches!(
            participant.require_authority(),
            Err(AuthError::InsufficientPermissions)
        ));
        assert!(authority.require_authority().is_ok());
    }
}

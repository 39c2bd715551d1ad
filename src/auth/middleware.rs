//! Authentication middleware for Axum
//!
//! Extracts the bearer token, validates it, and attaches the resulting
//! [`AuthContext`] to the request. Routes mounted behind this middleware
//! can rely on the context being present.

use axum::{
    body::Body,
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::{AuthContext, AuthError, JwtValidator};

/// Auth context extension for request
#[derive(Clone)]
pub struct AuthContextExt(pub AuthContext);

/// Authentication middleware configuration/state.
#[derive(Clone)]
pub struct AuthMiddlewareState {
    pub jwt_validator: Arc<JwtValidator>,
    /// Optional global rate limiter.
    pub rate_limiter: Option<Arc<RateLimiter>>,
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AuthMiddlewareState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let context = match authenticate(&state.jwt_validator, auth_header) {
        Ok(context) => context,
        Err(e) => return auth_error_response(e),
    };

    if let Some(ref limiter) = state.rate_limiter {
        let key = format!("user:{}", context.user_id);
        if let Err(e) = limiter.check(&key) {
            return auth_error_response(e);
        }
    }

    request.extensions_mut().insert(AuthContextExt(context));
    next.run(request).await
}

fn authenticate(
    validator: &JwtValidator,
    auth_header: Option<&str>,
) -> Result<AuthContext, AuthError> {
    let header = auth_header.ok_or(AuthError::MissingAuth)?;
    let token = header.strip_prefix("Bearer ").ok_or(AuthError::MissingAuth)?;
    validator.validate(token.trim())
}

/// Convert auth error to HTTP response, using the same structured body
/// the handlers produce.
fn auth_error_response(error: AuthError) -> Response {
    crate::api::error::ApiError::from(error).into_response()
}

/// Rate limiter for API requests
pub struct RateLimiter {
    /// Requests allowed per window per key
    requests_per_minute: u32,
    window: std::time::Duration,
    /// In-memory request counts; advisory only, not shared state the
    /// ledgers depend on.
    counts: std::sync::RwLock<std::collections::HashMap<String, (u32, std::time::Instant)>>,
}

impl RateLimiter {
    pub fn new(requests_per_minute: u32) -> Self {
        Self::with_window(requests_per_minute, std::time::Duration::from_secs(60))
    }

    fn with_window(requests_per_minute: u32, window: std::time::Duration) -> Self {
        Self {
            requests_per_minute,
            window,
            counts: std::sync::RwLock::new(std::collections::HashMap::new()),
        }
    }

    /// Check if request is allowed
    pub fn check(&self, key: &str) -> Result<(), AuthError> {
        let mut counts = self.counts.write().unwrap();
        let now = std::time::Instant::now();

        // Drop elapsed windows so the map never grows with every key
        // ever seen.
        counts.retain(|_, (_, started)| now.duration_since(*started) < self.window);

        let entry = counts.entry(key.to_string()).or_insert((0, now));
        if entry.0 >= self.requests_per_minute {
            return Err(AuthError::RateLimited);
        }

        entry.0 += 1;
        Ok(())
    }

    #[cfg(test)]
    fn tracked_keys(&self) -> usize {
        self.counts.read().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Role, UserId};
    use chrono::Duration;

    #[test]
    fn rate_limiter_caps_requests() {
        let limiter = RateLimiter::new(5);
        let key = "test-key";

        for _ in 0..5 {
            assert!(limiter.check(key).is_ok());
        }
        assert!(matches!(limiter.check(key), Err(AuthError::RateLimited)));
    }

    #[test]
    fn rate_limiter_evicts_elapsed_windows() {
        let limiter = RateLimiter::with_window(1, std::time::Duration::from_millis(20));

        assert!(limiter.check("a").is_ok());
        assert!(limiter.check("b").is_ok());
        assert!(matches!(limiter.check("a"), Err(AuthError::RateLimited)));
        assert_eq!(limiter.tracked_keys(), 2);

        std::thread::sleep(std::time::Duration::from_millis(30));

        // The elapsed windows are gone and the key is allowed again.
        assert!(limiter.check("a").is_ok());
        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[test]
    fn bearer_header_is_required() {
        let validator = JwtValidator::new(b"secret", "verdantia", "verdantia-api");

        assert!(matches!(
            authenticate(&validator, None),
            Err(AuthError::MissingAuth)
        ));
        assert!(matches!(
            authenticate(&validator, Some("Basic dXNlcjpwYXNz")),
            Err(AuthError::MissingAuth)
        ));

        let token = validator
            .issue(&UserId::new(), "asha", Role::Participant, Duration::hours(1))
            .unwrap();
        let context = authenticate(&validator, Some(&format!("Bearer {token}"))).unwrap();
        assert_eq!(context.username, "asha");
    }
}

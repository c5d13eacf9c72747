//! # Middleware Module
//!
//! Global rate limiting for the survey HTTP API.
//!
//! ## Configuration
//!
//! - `SURVEY_RATE_LIMIT`: requests per second across all clients
//!   (default: 50, `0` disables the limiter)

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Environment variable holding the rate limit.
pub const RATE_LIMIT_ENV: &str = "SURVEY_RATE_LIMIT";

/// Requests per second when `SURVEY_RATE_LIMIT` is unset or unparsable.
pub const DEFAULT_RATE_LIMIT: u32 = 50;

// =============================================================================
// RATE LIMITER
// =============================================================================

/// Global rate limiter type alias.
pub type GlobalRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Create a global rate limiter allowing `requests_per_second`.
pub fn create_rate_limiter(requests_per_second: NonZeroU32) -> GlobalRateLimiter {
    Arc::new(RateLimiter::direct(Quota::per_second(requests_per_second)))
}

/// Parse a rate limit setting. `None` means the limiter is disabled.
pub fn parse_rate_limit(value: Option<&str>) -> Option<NonZeroU32> {
    let rps = value
        .and_then(|s| s.trim().parse::<u32>().ok())
        .unwrap_or(DEFAULT_RATE_LIMIT);
    NonZeroU32::new(rps)
}

/// Rate limit from `SURVEY_RATE_LIMIT`.
pub fn rate_limit_from_env() -> Option<NonZeroU32> {
    parse_rate_limit(std::env::var(RATE_LIMIT_ENV).ok().as_deref())
}

/// Rejects the request with 429 when the global budget is spent.
pub async fn rate_limit_middleware(
    State(limiter): State<GlobalRateLimiter>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, &'static str)> {
    if limiter.check().is_ok() {
        Ok(next.run(request).await)
    } else {
        tracing::warn!(event = "rate_limited", path = %request.uri().path(), "Rate limit exceeded");
        Err((StatusCode::TOO_MANY_REQUESTS, "Too Many Requests"))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_applies_when_unset_or_garbage() {
        assert_eq!(parse_rate_limit(None), NonZeroU32::new(DEFAULT_RATE_LIMIT));
        assert_eq!(parse_rate_limit(Some("fast")), NonZeroU32::new(DEFAULT_RATE_LIMIT));
    }

    #[test]
    fn zero_disables() {
        assert_eq!(parse_rate_limit(Some("0")), None);
    }

    #[test]
    fn explicit_value_is_used() {
        assert_eq!(parse_rate_limit(Some(" 7 ")), NonZeroU32::new(7));
    }

    #[test]
    fn limiter_exhausts_its_burst() {
        let limiter = create_rate_limiter(NonZeroU32::MIN);
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }
}

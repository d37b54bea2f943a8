//! Global request rate limiting

use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{Quota, RateLimiter, clock::DefaultClock, state::InMemoryState, state::NotKeyed};

use super::GatewayState;

/// One budget shared by every endpoint
pub type GatewayLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Limiter admitting `requests_per_minute` requests, bursting up to the same amount
///
/// A zero budget is raised to one.
#[must_use]
pub fn limiter_per_minute(requests_per_minute: u32) -> GatewayLimiter {
    let budget = NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN);
    Arc::new(RateLimiter::direct(Quota::per_minute(budget)))
}

/// Reject with 429 once the shared budget is spent; no-op without a limiter
pub async fn rate_limit_middleware(
    State(state): State<Arc<GatewayState>>,
    req: Request,
    next: Next,
) -> Response {
    let exhausted = state
        .rate_limiter
        .as_ref()
        .is_some_and(|limiter| limiter.check().is_err());

    if exhausted {
        tracing::warn!(path = %req.uri().path(), "rate limit exceeded");
        return StatusCode::TOO_MANY_REQUESTS.into_response();
    }
    next.run(req).await
}

//! Rate limiting middleware
//!
//! Per-IP token buckets built on `governor`. Each limited route group gets
//! its own `RateLimit` so lookups and image requests are budgeted separately.
//!
//! The client IP is the first `X-Forwarded-For` entry when present, else the
//! socket peer address, else 127.0.0.1.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::warn;

use super::error::ApiError;

/// Keyed limiter shared by every request of one route group
#[derive(Clone)]
pub struct RateLimit {
    limiter: Arc<DefaultKeyedRateLimiter<IpAddr>>,
}

impl RateLimit {
    /// Allows `requests` per minute per client IP
    pub fn per_minute(requests: u32) -> Self {
        let quota = Quota::per_minute(NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN));
        Self {
            limiter: Arc::new(RateLimiter::keyed(quota)),
        }
    }

    /// Takes one token from the bucket of `ip`
    pub fn check(&self, ip: IpAddr) -> bool {
        self.limiter.check_key(&ip).is_ok()
    }

    /// Forgets buckets that are full again
    pub fn prune(&self) {
        self.limiter.retain_recent();
    }
}

/// Rejects the request with 429 once the client's bucket is empty
pub async fn enforce_rate_limit(
    State(limit): State<RateLimit>,
    request: Request,
    next: Next,
) -> Response {
    let ip = client_ip(&request);

    if !limit.check(ip) {
        warn!("Rate limit exceeded for IP: {}", ip);
        return ApiError::RateLimited.into_response();
    }

    next.run(request).await
}

fn client_ip(request: &Request) -> IpAddr {
    let forwarded = request
        .headers()
        .get("X-Forwarded-For")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok());

    if let Some(ip) = forwarded {
        return ip;
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::from([127, 0, 0, 1]))
}

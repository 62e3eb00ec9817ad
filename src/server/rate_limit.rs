// src/server/rate_limit.rs
// Per-client rate limiting for /bfhl

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter as GovRateLimiter};
use tracing::warn;

use crate::config::RateLimitConfig;
use crate::error::BfhlError;

type KeyedLimiter = GovRateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock>;

/// Key used when the connection address is unavailable (e.g. in-process tests)
const UNKNOWN_CLIENT: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Allows `max_requests` per `window` for each client IP, replenishing evenly
pub struct RateLimiter {
    limiter: KeyedLimiter,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Result<Self> {
        let max = NonZeroU32::new(config.max_requests)
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limit"))?;
        let quota = config
            .replenish_period()
            .and_then(Quota::with_period)
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limit window"))?
            .allow_burst(max);

        Ok(Self {
            limiter: GovRateLimiter::keyed(quota),
        })
    }

    /// Record one request for `client`; false once its quota is spent
    pub fn try_acquire(&self, client: IpAddr) -> bool {
        self.limiter.check_key(&client).is_ok()
    }

    /// Drop state for clients whose quota has fully replenished
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }
}

/// Middleware rejecting over-quota clients before the body is read
pub async fn enforce(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(UNKNOWN_CLIENT);

    if !limiter.try_acquire(client) {
        warn!(client = %client, "Rate limit exceeded");
        return BfhlError::RateLimited.into_response();
    }

    next.run(request).await
}

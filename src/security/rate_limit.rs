//! Inbound message flood protection.
//!
//! Uses the `governor` crate's token bucket per connection slot. Limiter
//! state is dropped on disconnect so a reused slot starts with a full bucket.

use crate::config::RateLimitConfig;
use dashmap::DashMap;
use governor::{Quota, RateLimiter as GovRateLimiter};
use std::num::NonZeroU32;
use tracing::debug;

/// Type alias for governor's direct rate limiter.
type DirectRateLimiter = governor::DefaultDirectRateLimiter;

const FALLBACK_RATE: NonZeroU32 = NonZeroU32::MIN;

/// Thread-safe per-connection message limiter.
#[derive(Debug)]
pub struct RateLimitManager {
    message_limiters: DashMap<u8, DirectRateLimiter>,
    quota: Quota,
}

impl RateLimitManager {
    pub fn new(config: &RateLimitConfig) -> Self {
        let rate = NonZeroU32::new(config.message_rate_per_second).unwrap_or(FALLBACK_RATE);
        let burst = NonZeroU32::new(config.message_burst.max(config.message_rate_per_second))
            .unwrap_or(rate);
        Self {
            message_limiters: DashMap::new(),
            quota: Quota::per_second(rate).allow_burst(burst),
        }
    }

    /// Check if a connection can send another message.
    ///
    /// Returns `true` if allowed, `false` if rate limited.
    pub fn check_message_rate(&self, conn: u8) -> bool {
        let limiter = self
            .message_limiters
            .entry(conn)
            .or_insert_with(|| GovRateLimiter::direct(self.quota));

        let allowed = limiter.check().is_ok();
        if !allowed {
            debug!(conn, "message rate limit exceeded");
        }
        allowed
    }

    /// Remove a connection's limiter (on disconnect).
    pub fn remove_client(&self, conn: u8) {
        self.message_limiters.remove(&conn);
    }

    pub fn tracked(&self) -> usize {
        self.message_limiters.len()
    }
}

//! API rate limiting.
//!
//! Fixed-window counters held in memory. Two uses: sign-in and signup
//! attempts per client address, and the autocomplete throttle, which drops a
//! repeat of the same query from the same client within the configured
//! window.

#![allow(missing_docs)]

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use aerodict_common::{AppError, AppResult};
use axum::http::HeaderMap;
use tokio::sync::RwLock;
use tracing::warn;

/// Above this many tracked keys, expired entries are swept on the next check.
const MAX_TRACKED_KEYS: usize = 10_000;

/// Rate limit configuration for different endpoint types.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Window length.
    pub window: Duration,
}

impl RateLimitConfig {
    /// Create a new rate limit config.
    pub const fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }

    /// One request per `throttle_ms` milliseconds. Negative values disable
    /// the window.
    #[must_use]
    pub fn autocomplete(throttle_ms: i32) -> Self {
        Self::new(1, Duration::from_millis(u64::try_from(throttle_ms).unwrap_or(0)))
    }
}

/// Default limits.
pub mod limits {
    use std::time::Duration;

    use super::RateLimitConfig;

    /// Sign-in attempts.
    pub const AUTH: RateLimitConfig = RateLimitConfig::new(10, Duration::from_secs(300));

    /// Signup endpoint (very restrictive).
    pub const SIGNUP: RateLimitConfig = RateLimitConfig::new(5, Duration::from_secs(3600));
}

/// Rate limit state for a single key.
#[derive(Debug, Clone)]
struct RateLimitState {
    /// Request count in current window.
    count: u32,
    /// Window start time.
    window_start: Instant,
    window: Duration,
}

impl RateLimitState {
    fn new(window: Duration) -> Self {
        Self {
            count: 0,
            window_start: Instant::now(),
            window,
        }
    }

    fn expired(&self, now: Instant) -> bool {
        now.duration_since(self.window_start) >= self.window
    }
}

/// API rate limiter.
#[derive(Clone)]
pub struct ApiRateLimiter {
    /// State per key.
    states: Arc<RwLock<HashMap<String, RateLimitState>>>,
    max_keys: usize,
}

impl Default for ApiRateLimiter {
    fn default() -> Self {
        Self::with_max_keys(MAX_TRACKED_KEYS)
    }
}

impl ApiRateLimiter {
    /// Create a new rate limiter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn with_max_keys(max_keys: usize) -> Self {
        Self {
            states: Arc::default(),
            max_keys,
        }
    }

    /// Check if a request is allowed and record it.
    pub async fn check(&self, key: &str, config: &RateLimitConfig) -> RateLimitResult {
        let mut states = self.states.write().await;
        let now = Instant::now();

        if states.len() >= self.max_keys {
            states.retain(|_, state| !state.expired(now));
        }

        let state = states
            .entry(key.to_string())
            .or_insert_with(|| RateLimitState::new(config.window));
        state.window = config.window;

        if state.expired(now) {
            state.count = 0;
            state.window_start = now;
        }

        let reset = config
            .window
            .saturating_sub(now.duration_since(state.window_start));

        if state.count >= config.max_requests {
            return RateLimitResult::Limited {
                retry_after: reset,
                limit: config.max_requests,
            };
        }

        state.count += 1;
        RateLimitResult::Allowed {
            remaining: config.max_requests.saturating_sub(state.count),
            limit: config.max_requests,
            reset,
        }
    }

    #[cfg(test)]
    async fn key_count(&self) -> usize {
        self.states.read().await.len()
    }
}

/// Rate limit check result.
#[derive(Debug, Clone)]
pub enum RateLimitResult {
    /// Request is allowed.
    Allowed {
        /// Remaining requests in window.
        remaining: u32,
        /// Total limit.
        limit: u32,
        /// Time until window reset.
        reset: Duration,
    },
    /// Request is rate limited.
    Limited {
        /// Time until the window resets.
        retry_after: Duration,
        /// Total limit.
        limit: u32,
    },
}

impl RateLimitResult {
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Limiters shared by the handlers.
#[derive(Clone, Default)]
pub struct RateLimiterState {
    /// Sign-in and signup attempts, keyed by client address.
    pub auth_limiter: ApiRateLimiter,
    /// Autocomplete throttle, keyed by client address and query.
    pub autocomplete_limiter: ApiRateLimiter,
}

impl RateLimiterState {
    /// Create a new rate limiter state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count an authentication attempt from `client`.
    pub async fn guard_auth(
        &self,
        action: &str,
        client: &str,
        config: &RateLimitConfig,
    ) -> AppResult<()> {
        let key = format!("{action}:{client}");
        match self.auth_limiter.check(&key, config).await {
            RateLimitResult::Allowed { .. } => Ok(()),
            RateLimitResult::Limited { retry_after, .. } => {
                warn!(
                    action = action,
                    client = client,
                    retry_after_secs = retry_after.as_secs(),
                    "Authentication attempts rate limited"
                );
                Err(AppError::RateLimited)
            }
        }
    }

    /// Whether `client` may run `query` now. The query is compared
    /// case-insensitively.
    pub async fn autocomplete_allowed(&self, client: &str, query: &str, throttle_ms: i32) -> bool {
        let key = format!("{client}:{}", query.trim().to_lowercase());
        self.autocomplete_limiter
            .check(&key, &RateLimitConfig::autocomplete(throttle_ms))
            .await
            .is_allowed()
    }
}

/// Extract the client IP from proxy headers.
#[must_use]
pub fn extract_client_ip(headers: &HeaderMap) -> Option<IpAddr> {
    // X-Forwarded-For first; its first entry is the originating client.
    if let Some(xff) = headers.get("x-forwarded-for")
        && let Ok(xff_str) = xff.to_str()
        && let Some(first_ip) = xff_str.split(',').next()
        && let Ok(ip) = first_ip.trim().parse::<IpAddr>()
    {
        return Some(ip);
    }

    if let Some(real_ip) = headers.get("x-real-ip")
        && let Ok(ip_str) = real_ip.to_str()
        && let Ok(ip) = ip_str.trim().parse::<IpAddr>()
    {
        return Some(ip);
    }

    None
}

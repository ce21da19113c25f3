//! HTTP API layer for aerodict.
//!
//! This crate provides the JSON API and the crawler-facing root routes:
//!
//! - **Endpoints**: public glossary, suggestions, accounts and administration
//! - **Extractors**: authenticated user, administrator, client address
//! - **Middleware**: bearer-token authentication and shared state
//! - **Rate limiting**: sign-in attempts and the autocomplete throttle
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod rate_limit;
pub mod response;

pub use endpoints::{router, seo_router};
pub use middleware::{AppState, auth_middleware};
pub use rate_limit::{ApiRateLimiter, RateLimitConfig, RateLimiterState};

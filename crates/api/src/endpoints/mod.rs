//! API endpoints.

mod account;
mod admin;
mod auth;
mod meta;
mod seo;
mod suggestions;
mod terms;
mod upload;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router, mounted under `/api`.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(terms::router())
        .nest("/i", account::router())
        .nest("/meta", meta::router())
        .nest("/suggestions", suggestions::router())
        .nest("/admin", admin::router())
}

/// Root routes for crawlers and probes: sitemap, robots and health.
pub fn seo_router() -> Router<AppState> {
    seo::router()
}

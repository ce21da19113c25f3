//! Meta endpoints.

use aerodict_common::AppResult;
use aerodict_core::PublicSiteSettings;
use axum::{Router, extract::State, routing::get};

use crate::{middleware::AppState, response::ApiResponse};

/// Branding, landing-page content and the public feature toggles.
async fn meta(State(state): State<AppState>) -> AppResult<ApiResponse<PublicSiteSettings>> {
    Ok(ApiResponse::ok(state.site_settings_service.public().await?))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(meta))
}

//! Profile of the signed-in user.

use aerodict_common::AppResult;
use aerodict_core::UpdateProfileInput;
use aerodict_db::entities::user;
use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Profile response. The token is never echoed back.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<FixedOffset>,
}

impl From<user::Model> for ProfileResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

async fn me(AuthUser(user): AuthUser) -> AppResult<ApiResponse<ProfileResponse>> {
    Ok(ApiResponse::ok(user.into()))
}

async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<UpdateProfileInput>,
) -> AppResult<ApiResponse<ProfileResponse>> {
    let updated = state.account_service.update_profile(&user.id, req).await?;
    Ok(ApiResponse::ok(updated.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(me))
        .route("/update", post(update))
}

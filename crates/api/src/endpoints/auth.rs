//! Authentication endpoints.

use aerodict_common::AppResult;
use aerodict_core::SignupInput;
use aerodict_db::entities::user;
use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, ClientAddr},
    middleware::AppState,
    rate_limit::limits,
    response::ApiResponse,
};

/// Session returned by signup and signin.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: String,
    pub username: String,
    pub token: String,
    pub is_admin: bool,
}

impl From<user::Model> for SessionResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            token: user.token,
            is_admin: user.is_admin,
        }
    }
}

/// Create a new account.
async fn signup(
    State(state): State<AppState>,
    ClientAddr(client): ClientAddr,
    Json(req): Json<SignupInput>,
) -> AppResult<ApiResponse<SessionResponse>> {
    state
        .rate_limiter
        .guard_auth("signup", &client, &limits::SIGNUP)
        .await?;

    let user = state.account_service.signup(req).await?;
    Ok(ApiResponse::ok(user.into()))
}

/// Signin request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SigninRequest {
    pub username: String,
    pub password: String,
}

/// Sign in with username and password.
async fn signin(
    State(state): State<AppState>,
    ClientAddr(client): ClientAddr,
    Json(req): Json<SigninRequest>,
) -> AppResult<ApiResponse<SessionResponse>> {
    state
        .rate_limiter
        .guard_auth("signin", &client, &limits::AUTH)
        .await?;

    let user = state
        .account_service
        .authenticate(&req.username, &req.password)
        .await?;

    Ok(ApiResponse::ok(user.into()))
}

/// Signout response.
#[derive(Serialize)]
pub struct SignoutResponse {
    pub ok: bool,
}

/// Sign out by rotating the token, which invalidates the current one.
async fn signout(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<SignoutResponse>> {
    state.account_service.regenerate_token(&user.id).await?;

    Ok(ApiResponse::ok(SignoutResponse { ok: true }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/signout", post(signout))
}

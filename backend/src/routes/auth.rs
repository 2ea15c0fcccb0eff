//! Account routes
//!
//! Registration, login, token refresh and the current-account lookup.

use super::extract::JsonBody;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::RegistrationForm;
use crate::state::AppState;
use accounts_shared::{
    LoginRequest, LoginResponse, PublicAccount, RefreshRequest, RefreshResponse, RegisterResponse,
};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

/// Create account routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/users/", post(register))
        .route("/users/login", post(login))
        .route("/users/token/refresh/", post(refresh_token))
        .route("/users/me", get(current_account))
}

/// Register a new account
///
/// POST /api/v1/users/
async fn register(
    State(state): State<AppState>,
    JsonBody(form): JsonBody<RegistrationForm>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let user = state.registration.register(form).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User created successfully".to_string(),
            user,
        }),
    ))
}

/// Login with email and password
///
/// POST /api/v1/users/login
async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let response = state.login.login(&req.email, &req.password).await?;
    Ok(Json(response))
}

/// Exchange a refresh token for a new access token
///
/// POST /api/v1/users/token/refresh/
async fn refresh_token(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let response = state.login.refresh(&req.refresh).await?;
    Ok(Json(response))
}

/// Account behind the bearer access token
///
/// GET /api/v1/users/me
async fn current_account(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<Json<PublicAccount>> {
    let account = state.login.current_account(auth_user.account_id).await?;
    Ok(Json(account))
}

//! Registration, login and the principal's own account.

use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::{Form, Json};

use super::ApiResult;
use crate::dto::{ChangePasswordRequest, LoginForm, MessageResponse, RegisterRequest, TokenResponse, UserResponse};
use crate::web::error::ApiError;
use crate::web::extract::{CurrentUser, ValidJson};
use crate::web::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> ApiResult<Json<UserResponse>> {
    let user = state.users.register(req.into()).await?;
    Ok(Json(user.into()))
}

/// OAuth2 password flow: the form's `username` field carries the email.
pub async fn login(
    State(state): State<AppState>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Form(form) = form?;
    let user = state
        .users
        .authenticate(&form.username, &form.password)
        .await?
        .ok_or(ApiError::BadCredentials)?;

    let token = state.gate.issue_session(&user)?;
    Ok(Json(TokenResponse::bearer(token)))
}

pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserResponse> {
    Json(user.into())
}

pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidJson(req): ValidJson<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    // Re-check against the stored hash, not just the token.
    state
        .users
        .authenticate(&user.email, &req.current_password)
        .await?
        .ok_or(ApiError::BadCredentials)?;

    state.users.change_password(&user, &req.new_password).await?;
    Ok(Json(MessageResponse::new("password updated")))
}

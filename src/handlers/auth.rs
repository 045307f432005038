// src/handlers/auth.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{LoginUserPayload, RefreshPayload, RegisterUserPayload},
};

pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let tokens = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await?;

    Ok(Json(tokens))
}

pub async fn refresh(
    State(app_state): State<AppState>,
    Json(payload): Json<RefreshPayload>,
) -> Result<impl IntoResponse, AppError> {
    let token = app_state
        .auth_service
        .refresh_access(&payload.refresh_token)
        .await?;

    Ok(Json(token))
}

pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> impl IntoResponse {
    Json(user)
}

pub async fn register(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = app_state
        .auth_service
        .register_user(&actor, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

// src/handlers/users.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, pagination::Pagination},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::EditUserPayload,
};

pub async fn list_users(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Query(pagination): Query<Pagination>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.auth_service.list_users(&actor, &pagination).await?;
    Ok(Json(page))
}

pub async fn edit_user(
    State(app_state): State<AppState>,
    AuthenticatedUser(actor): AuthenticatedUser,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<EditUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = app_state
        .auth_service
        .edit_user(&actor, user_id, &payload)
        .await?;

    Ok(Json(user))
}

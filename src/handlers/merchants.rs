// src/handlers/merchants.rs

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    common::{error::AppError, pagination::Pagination},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::tenancy::CreateMerchantPayload,
};

#[derive(Debug, Deserialize)]
pub struct MerchantListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub name: Option<String>,
}

pub async fn list_merchants(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<MerchantListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let pagination = Pagination {
        page: query.page,
        limit: query.limit,
    };
    let page = app_state
        .merchant_service
        .list(&user, query.name.as_deref(), &pagination)
        .await?;
    Ok(Json(page))
}

pub async fn create_merchant(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateMerchantPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let merchant = app_state
        .merchant_service
        .create(&user, &payload.name)
        .await?;

    Ok((StatusCode::CREATED, Json(merchant)))
}

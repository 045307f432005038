// src/handlers/assets.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{error::AppError, pagination::Pagination},
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::asset::{CreateAssetPayload, EditAssetPayload},
};

#[derive(Debug, Deserialize)]
pub struct AssetListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub name: Option<String>,
}

pub async fn list_assets(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<AssetListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let pagination = Pagination {
        page: query.page,
        limit: query.limit,
    };
    let page = app_state
        .asset_service
        .list(&user, query.name.as_deref(), &pagination)
        .await?;
    Ok(Json(page))
}

pub async fn create_asset(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateAssetPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let asset = app_state.asset_service.create(&user, &payload).await?;

    Ok((StatusCode::CREATED, Json(asset)))
}

pub async fn edit_asset(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(asset_id): Path<Uuid>,
    Json(payload): Json<EditAssetPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let asset = app_state
        .asset_service
        .edit(&user, asset_id, &payload)
        .await?;

    Ok(Json(asset))
}

pub async fn delete_asset(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(asset_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let asset = app_state.asset_service.delete(&user, asset_id).await?;

    Ok(Json(asset))
}

/// Recomputa o saldo do ativo a partir do histórico (correção de deriva).
pub async fn refresh_asset(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(asset_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let asset = app_state
        .ledger_service
        .refresh_asset(&user, asset_id)
        .await?;

    Ok(Json(asset))
}

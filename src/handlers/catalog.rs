// src/handlers/catalog.rs

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
    models::catalog::{
        CreateGroupPayload, CreateProductPayload, EditGroupPayload, EditProductPayload,
    },
};

#[derive(Debug, Deserialize)]
pub struct CatalogListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub name: Option<String>,
}

impl CatalogListQuery {
    fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
        }
    }
}

// ---
// Produtos
// ---

pub async fn list_products(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<CatalogListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state
        .catalog_service
        .list_products(&user, query.name.as_deref(), &query.pagination())
        .await?;
    Ok(Json(page))
}

pub async fn create_product(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state
        .catalog_service
        .create_product(&user, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn edit_product(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<EditProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state
        .catalog_service
        .edit_product(&user, product_id, &payload)
        .await?;

    Ok(Json(product))
}

pub async fn delete_product(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state
        .catalog_service
        .delete_product(&user, product_id)
        .await?;

    Ok(Json(product))
}

// ---
// Grupos de produto
// ---

pub async fn list_groups(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<CatalogListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state
        .catalog_service
        .list_groups(&user, query.name.as_deref(), &query.pagination())
        .await?;
    Ok(Json(page))
}

pub async fn create_group(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateGroupPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let group = app_state
        .catalog_service
        .create_group(&user, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(group)))
}

pub async fn edit_group(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(group_id): Path<Uuid>,
    Json(payload): Json<EditGroupPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let group = app_state
        .catalog_service
        .edit_group(&user, group_id, &payload)
        .await?;

    Ok(Json(group))
}

pub async fn delete_group(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(group_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let group = app_state
        .catalog_service
        .delete_group(&user, group_id)
        .await?;

    Ok(Json(group))
}

/// Recomputa o saldo do grupo a partir do histórico (correção de deriva).
pub async fn refresh_group(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(group_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let group = app_state
        .ledger_service
        .refresh_group(&user, group_id)
        .await?;

    Ok(Json(group))
}

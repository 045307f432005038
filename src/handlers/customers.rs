// src/handlers/customers.rs

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
    models::customer::{CreateCustomerPayload, EditCustomerPayload},
};

#[derive(Debug, Deserialize)]
pub struct CustomerListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub name: Option<String>,
}

pub async fn list_customers(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<CustomerListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let pagination = Pagination {
        page: query.page,
        limit: query.limit,
    };
    let page = app_state
        .customer_service
        .list(&user, query.name.as_deref(), &pagination)
        .await?;
    Ok(Json(page))
}

pub async fn create_customer(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateCustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let customer = app_state.customer_service.create(&user, &payload).await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn edit_customer(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(customer_id): Path<Uuid>,
    Json(payload): Json<EditCustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let customer = app_state
        .customer_service
        .edit(&user, customer_id, &payload)
        .await?;

    Ok(Json(customer))
}

pub async fn delete_customer(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(customer_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let customer = app_state
        .customer_service
        .delete(&user, customer_id)
        .await?;

    Ok(Json(customer))
}

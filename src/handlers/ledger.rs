// src/handlers/ledger.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::{error::AppError, pagination::Pagination},
    config::AppState,
    db::EntryFilter,
    middleware::auth::AuthenticatedUser,
    models::ledger::{EntryTarget, EntryType},
};

// ---
// Validação customizada
// ---
fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.message = Some("A quantidade deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

// Criação e edição compartilham o formato: o lançamento é substituído por
// inteiro na edição, com o pareamento revalidado contra o tipo novo.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EntryPayload {
    pub date: NaiveDate,

    #[serde(rename = "type")]
    pub entry_type: EntryType,

    #[validate(custom(function = validate_positive))]
    pub quantity: Decimal,

    pub info: Option<String>,
    pub customer_id: Option<Uuid>,

    // Exatamente um dos dois
    pub product_id: Option<Uuid>,
    pub asset_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub entry_type: Option<String>,
    pub product_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub info: Option<String>,
}

pub async fn list_entries(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<EntryListQuery>,
) -> Result<impl IntoResponse, AppError> {
    // Tipo vindo da query string passa pelo parser fechado.
    let entry_type = query
        .entry_type
        .as_deref()
        .map(str::parse::<EntryType>)
        .transpose()?;

    let pagination = Pagination {
        page: query.page,
        limit: query.limit,
    };
    let filter = EntryFilter {
        start_date: query.start_date,
        end_date: query.end_date,
        entry_type,
        product_id: query.product_id,
        customer_id: query.customer_id,
        info: query.info,
        ..Default::default()
    };

    let page = app_state
        .ledger_service
        .list_entries(&user, filter, query.group_id, &pagination)
        .await?;

    Ok(Json(page))
}

pub async fn create_entry(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<EntryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let target = EntryTarget::from_ids(payload.product_id, payload.asset_id)?;

    let entry = app_state
        .ledger_service
        .create_entry(
            &user,
            payload.date,
            target,
            payload.entry_type,
            payload.quantity,
            payload.info.as_deref(),
            payload.customer_id,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn edit_entry(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(entry_id): Path<Uuid>,
    Json(payload): Json<EntryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let target = EntryTarget::from_ids(payload.product_id, payload.asset_id)?;

    let entry = app_state
        .ledger_service
        .edit_entry(
            &user,
            entry_id,
            payload.date,
            target,
            payload.entry_type,
            payload.quantity,
            payload.info.as_deref(),
            payload.customer_id,
        )
        .await?;

    Ok(Json(entry))
}

pub async fn delete_entry(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(entry_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let entry = app_state.ledger_service.delete_entry(&user, entry_id).await?;

    Ok(Json(entry))
}

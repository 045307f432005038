// src/handlers/reports.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState, middleware::auth::AuthenticatedUser};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueQuery {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyQuery {
    pub product_id: Uuid,
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct BorrowQuery {
    pub date: Option<NaiveDate>,
}

pub async fn revenue(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<RevenueQuery>,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state
        .report_service
        .revenue(&user, query.start_date, query.end_date)
        .await?;
    Ok(Json(summary))
}

pub async fn weekly(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<WeeklyQuery>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state
        .report_service
        .weekly(&user, query.product_id, query.date)
        .await?;
    Ok(Json(report))
}

pub async fn borrows(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Query(query): Query<BorrowQuery>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state.report_service.borrows(&user, query.date).await?;
    Ok(Json(report))
}

// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub merchant_id: Uuid,
    pub group_id: Option<Uuid>,
    pub name: String,
    pub price: Decimal,
    pub buying_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// `quantity` é um saldo derivado dos lançamentos dos produtos membros.
// Fora da semente inicial, só o gerenciador de lançamentos mexe nele.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductGroup {
    pub id: Uuid,
    pub merchant_id: Uuid,
    pub name: String,
    pub quantity: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub buying_price: Decimal,
    pub group_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditProductPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub buying_price: Option<Decimal>,
    pub group_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroupPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    pub name: String,
    #[serde(default)]
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EditGroupPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    pub name: Option<String>,
    pub quantity: Option<Decimal>,
}

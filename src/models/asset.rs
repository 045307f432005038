// src/models/asset.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

// Ativo físico do fluxo legado de galões. O saldo segue as mesmas regras
// de reconciliação dos grupos de produto.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: Uuid,
    pub merchant_id: Uuid,
    pub name: String,
    pub quantity: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAssetPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    pub name: String,
    #[serde(default)]
    pub quantity: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EditAssetPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    pub name: Option<String>,
    pub quantity: Option<Decimal>,
}

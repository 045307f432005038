// src/models/tenancy.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

// Um estabelecimento (tenant). Tudo que ele possui carrega o id dele.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Merchant {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMerchantPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    pub name: String,
}

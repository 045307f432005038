// src/models/customer.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

// Contraparte obrigatória dos lançamentos sell/borrow/return.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub merchant_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    pub name: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "O telefone é obrigatório."))]
    pub phone: String,
    #[validate(length(min = 1, message = "O endereço é obrigatório."))]
    pub address: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EditCustomerPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    pub name: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Grupo que habilita administração do próprio estabelecimento.
pub const ADMIN_GROUP: i32 = 1;

/// Escopo de atuação de um principal. O super-admin da plataforma é a
/// variante explícita, nunca um `merchant_id` nulo espalhado pelo código.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Platform,
    Tenant(Uuid),
}

impl Scope {
    /// Filtro de consulta correspondente: `None` enxerga todos os tenants.
    pub fn merchant_filter(&self) -> Option<Uuid> {
        match self {
            Scope::Platform => None,
            Scope::Tenant(id) => Some(*id),
        }
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub merchant_id: Option<Uuid>,
    pub name: String,
    pub email: String,

    #[serde(skip_serializing)] // nunca sai na API
    pub password_hash: String,

    pub group_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn scope(&self) -> Scope {
        match self.merchant_id {
            Some(id) => Scope::Tenant(id),
            None => Scope::Platform,
        }
    }

    pub fn is_admin_group(&self) -> bool {
        self.group_id == ADMIN_GROUP
    }
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    pub name: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
    pub group_id: i32,
    pub merchant_id: Uuid,
}

// Dados para login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshPayload {
    pub refresh_token: String,
}

// Edição de usuário: administrador ajusta qualquer campo; membro comum
// só alcança a própria conta (regra em services::access).
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditUserPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    pub name: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: Option<String>,
    pub group_id: Option<i32>,
}

// Resposta de autenticação com o par de tokens
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessResponse {
    pub token: String,
}

/// Distingue o token de acesso (curto) do de renovação (longo).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub kind: TokenKind,
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(merchant_id: Option<Uuid>, group_id: i32) -> User {
        User {
            id: Uuid::new_v4(),
            merchant_id,
            name: "Teste".into(),
            email: "teste@example.com".into(),
            password_hash: String::new(),
            group_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn scope_distinguishes_platform_from_tenant() {
        let mid = Uuid::new_v4();
        assert_eq!(user(None, ADMIN_GROUP).scope(), Scope::Platform);
        assert_eq!(user(Some(mid), 2).scope(), Scope::Tenant(mid));
        assert_eq!(user(Some(mid), 2).scope().merchant_filter(), Some(mid));
        assert_eq!(user(None, 2).scope().merchant_filter(), None);
    }
}

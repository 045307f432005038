// src/common/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia. Cada variante
// é um sinal estável para o cliente; nenhuma é re-tentada internamente.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Acesso negado")]
    Forbidden,

    // O recurso do payload pertence a outro estabelecimento. A resposta é
    // genérica de propósito: não revela se o recurso existe.
    #[error("Recurso fora do escopo do estabelecimento")]
    TenantMismatch,

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Nome já está em uso")]
    NameAlreadyExists,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Estabelecimento não encontrado")]
    MerchantNotFound,

    #[error("Produto não encontrado")]
    ProductNotFound,

    #[error("Grupo de produtos não encontrado")]
    GroupNotFound,

    #[error("Cliente não encontrado")]
    CustomerNotFound,

    #[error("Ativo não encontrado")]
    AssetNotFound,

    #[error("Lançamento não encontrado")]
    EntryNotFound,

    #[error("Tipo de lançamento desconhecido: {0}")]
    UnknownEntryType(String),

    #[error("customer_id é obrigatório para os tipos sell, borrow e return")]
    CustomerRequired,

    #[error("customer_id não é permitido para o tipo buy")]
    CustomerNotAllowed,

    #[error("Informe exatamente um entre product_id e asset_id")]
    InvalidTarget,

    #[error("Filtre por product_id ou por group_id, não ambos")]
    FilterConflict,

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos.".to_string())
            }
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),
            AppError::Forbidden | AppError::TenantMismatch => {
                (StatusCode::FORBIDDEN, "Acesso negado.".to_string())
            }

            AppError::EmailAlreadyExists => {
                (StatusCode::CONFLICT, "Este e-mail já está em uso.".to_string())
            }
            AppError::NameAlreadyExists => {
                (StatusCode::CONFLICT, "Este nome já está em uso.".to_string())
            }

            ref e @ (AppError::UserNotFound
            | AppError::MerchantNotFound
            | AppError::ProductNotFound
            | AppError::GroupNotFound
            | AppError::CustomerNotFound
            | AppError::AssetNotFound
            | AppError::EntryNotFound) => (StatusCode::NOT_FOUND, e.to_string()),

            ref e @ (AppError::UnknownEntryType(_)
            | AppError::CustomerRequired
            | AppError::CustomerNotAllowed
            | AppError::InvalidTarget
            | AppError::FilterConflict) => (StatusCode::BAD_REQUEST, e.to_string()),

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

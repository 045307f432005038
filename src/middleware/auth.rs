// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{common::error::AppError, config::AppState, models::auth::User};

// O middleware em si: valida o Bearer token e anexa o principal à
// requisição. Tudo que passa por aqui tem um `User` nos extensions.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AppError::InvalidToken)?;

    let user = app_state
        .auth_service
        .validate_token(bearer.token())
        .await?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::InvalidToken)
    }
}

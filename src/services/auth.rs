// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use sqlx::PgPool;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, Pagination},
    },
    db::{MerchantRepository, UserRepository},
    models::auth::{
        AccessResponse, AuthResponse, Claims, EditUserPayload, RegisterUserPayload, Scope,
        TokenKind, User,
    },
    services::access,
};

// Token de acesso curto; o de renovação dura a semana.
const ACCESS_TOKEN_MINUTES: i64 = 15;
const REFRESH_TOKEN_DAYS: i64 = 7;

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    merchant_repo: MerchantRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        merchant_repo: MerchantRepository,
        jwt_secret: String,
        pool: PgPool,
    ) -> Self {
        Self {
            user_repo,
            merchant_repo,
            jwt_secret,
            pool,
        }
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || {
            verify(&password_clone, &password_hash_clone)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        Ok(AuthResponse {
            token: self.create_token(user.id, TokenKind::Access)?,
            refresh_token: self.create_token(user.id, TokenKind::Refresh)?,
        })
    }

    /// Troca um token de renovação válido por um novo token de acesso.
    pub async fn refresh_access(&self, refresh_token: &str) -> Result<AccessResponse, AppError> {
        let claims = self.decode_token(refresh_token)?;
        if claims.kind != TokenKind::Refresh {
            return Err(AppError::InvalidToken);
        }

        // O usuário precisa continuar existindo.
        let user = self
            .user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)?;

        Ok(AccessResponse {
            token: self.create_token(user.id, TokenKind::Access)?,
        })
    }

    /// Valida um token de acesso e carrega o principal.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = self.decode_token(token)?;
        if claims.kind != TokenKind::Access {
            return Err(AppError::InvalidToken);
        }

        self.user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    /// Cria uma conta. Plataforma registra para qualquer estabelecimento;
    /// admin de tenant, só para o próprio.
    pub async fn register_user(
        &self,
        actor: &User,
        payload: &RegisterUserPayload,
    ) -> Result<User, AppError> {
        match actor.scope() {
            Scope::Platform => {}
            Scope::Tenant(own) => {
                if !actor.is_admin_group() {
                    return Err(AppError::Forbidden);
                }
                if payload.merchant_id != own {
                    return Err(AppError::TenantMismatch);
                }
            }
        }

        self.merchant_repo
            .find_by_id(payload.merchant_id)
            .await?
            .ok_or(AppError::MerchantNotFound)?;

        if self.user_repo.find_by_email(&payload.email).await?.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }

        let password_clone = payload.password.clone();
        let hashed_password = tokio::task::spawn_blocking(move || {
            hash(&password_clone, bcrypt::DEFAULT_COST)
        })
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        self.user_repo
            .create_user(
                &self.pool,
                Some(payload.merchant_id),
                &payload.name,
                &payload.email,
                &hashed_password,
                payload.group_id,
            )
            .await
    }

    pub async fn list_users(
        &self,
        actor: &User,
        pagination: &Pagination,
    ) -> Result<Page<User>, AppError> {
        if !access::can_view(actor) {
            return Err(AppError::Forbidden);
        }
        let (total, users) = self
            .user_repo
            .list(actor.scope().merchant_filter(), pagination)
            .await?;
        Ok(Page::new(total, pagination, users))
    }

    pub async fn edit_user(
        &self,
        actor: &User,
        user_id: Uuid,
        payload: &EditUserPayload,
    ) -> Result<User, AppError> {
        let target = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if !access::can_edit_user(actor, &target) {
            return Err(AppError::Forbidden);
        }

        // Membro comum edita o próprio perfil, mas não o próprio papel.
        if payload.group_id.is_some() && !actor.is_admin_group() {
            return Err(AppError::Forbidden);
        }

        let password_hash = match &payload.password {
            Some(password) => {
                let password_clone = password.clone();
                let hashed = tokio::task::spawn_blocking(move || {
                    hash(&password_clone, bcrypt::DEFAULT_COST)
                })
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
                Some(hashed)
            }
            None => None,
        };

        self.user_repo
            .update_user(
                &self.pool,
                target.id,
                payload.name.as_deref(),
                payload.email.as_deref(),
                password_hash.as_deref(),
                payload.group_id,
            )
            .await
    }

    fn create_token(&self, user_id: Uuid, kind: TokenKind) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = match kind {
            TokenKind::Access => now + chrono::Duration::minutes(ACCESS_TOKEN_MINUTES),
            TokenKind::Refresh => now + chrono::Duration::days(REFRESH_TOKEN_DAYS),
        };

        let claims = Claims {
            sub: user_id,
            kind,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }

    fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;
        Ok(token_data.claims)
    }
}

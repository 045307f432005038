// src/services/merchant_service.rs

use sqlx::PgPool;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, Pagination},
    },
    db::MerchantRepository,
    models::{
        auth::{Scope, User},
        tenancy::Merchant,
    },
};

// Administração de estabelecimentos: superfície exclusiva da plataforma.
#[derive(Clone)]
pub struct MerchantService {
    repo: MerchantRepository,
    pool: PgPool,
}

impl MerchantService {
    pub fn new(repo: MerchantRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    fn require_platform(user: &User) -> Result<(), AppError> {
        match user.scope() {
            Scope::Platform => Ok(()),
            Scope::Tenant(_) => Err(AppError::Forbidden),
        }
    }

    pub async fn list(
        &self,
        user: &User,
        name_search: Option<&str>,
        pagination: &Pagination,
    ) -> Result<Page<Merchant>, AppError> {
        Self::require_platform(user)?;
        let (total, merchants) = self.repo.list(name_search, pagination).await?;
        Ok(Page::new(total, pagination, merchants))
    }

    pub async fn create(&self, user: &User, name: &str) -> Result<Merchant, AppError> {
        Self::require_platform(user)?;

        if self.repo.find_by_name(name).await?.is_some() {
            return Err(AppError::NameAlreadyExists);
        }

        self.repo.create(&self.pool, name).await
    }
}

// src/services/asset_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, Pagination},
    },
    db::AssetRepository,
    models::{
        asset::{Asset, CreateAssetPayload, EditAssetPayload},
        auth::{Scope, User},
    },
    services::access,
};

// Fluxo legado de galões. O saldo aceita ajuste direto na edição (como o
// fluxo sempre permitiu); o recompute fica no LedgerService.
#[derive(Clone)]
pub struct AssetService {
    repo: AssetRepository,
    pool: PgPool,
}

impl AssetService {
    pub fn new(repo: AssetRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    fn acting_tenant(user: &User) -> Result<Uuid, AppError> {
        match user.scope() {
            Scope::Tenant(id) => Ok(id),
            Scope::Platform => Err(AppError::Forbidden),
        }
    }

    pub async fn list(
        &self,
        user: &User,
        name_search: Option<&str>,
        pagination: &Pagination,
    ) -> Result<Page<Asset>, AppError> {
        let (total, assets) = self
            .repo
            .list(user.scope().merchant_filter(), name_search, pagination)
            .await?;
        Ok(Page::new(total, pagination, assets))
    }

    pub async fn create(&self, user: &User, payload: &CreateAssetPayload) -> Result<Asset, AppError> {
        if !access::can_admin(user) {
            return Err(AppError::Forbidden);
        }
        let merchant_id = Self::acting_tenant(user)?;

        self.repo
            .create(&self.pool, merchant_id, &payload.name, payload.quantity)
            .await
    }

    pub async fn edit(
        &self,
        user: &User,
        asset_id: Uuid,
        payload: &EditAssetPayload,
    ) -> Result<Asset, AppError> {
        let merchant_id = Self::acting_tenant(user)?;
        let asset = self
            .repo
            .find(merchant_id, asset_id)
            .await?
            .ok_or(AppError::AssetNotFound)?;
        if !access::can_mutate(user, asset.merchant_id) {
            return Err(AppError::Forbidden);
        }

        self.repo
            .update(
                &self.pool,
                asset.id,
                payload.name.as_deref(),
                payload.quantity,
            )
            .await
    }

    pub async fn delete(&self, user: &User, asset_id: Uuid) -> Result<Asset, AppError> {
        let merchant_id = Self::acting_tenant(user)?;
        let asset = self
            .repo
            .find(merchant_id, asset_id)
            .await?
            .ok_or(AppError::AssetNotFound)?;
        if !access::can_mutate(user, asset.merchant_id) {
            return Err(AppError::Forbidden);
        }

        self.repo.delete(&self.pool, asset.id).await?;
        Ok(asset)
    }
}

// src/services/catalog_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, Pagination},
    },
    db::CatalogRepository,
    models::{
        auth::{Scope, User},
        catalog::{
            CreateGroupPayload, CreateProductPayload, EditGroupPayload, EditProductPayload,
            Product, ProductGroup,
        },
    },
    services::access,
};

#[derive(Clone)]
pub struct CatalogService {
    repo: CatalogRepository,
    pool: PgPool,
}

impl CatalogService {
    pub fn new(repo: CatalogRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    fn acting_tenant(user: &User) -> Result<Uuid, AppError> {
        match user.scope() {
            Scope::Tenant(id) => Ok(id),
            Scope::Platform => Err(AppError::Forbidden),
        }
    }

    // ---
    // Produtos
    // ---

    pub async fn list_products(
        &self,
        user: &User,
        name_search: Option<&str>,
        pagination: &Pagination,
    ) -> Result<Page<Product>, AppError> {
        let (total, products) = self
            .repo
            .list_products(user.scope().merchant_filter(), name_search, pagination)
            .await?;
        Ok(Page::new(total, pagination, products))
    }

    pub async fn create_product(
        &self,
        user: &User,
        payload: &CreateProductPayload,
    ) -> Result<Product, AppError> {
        if !access::can_admin(user) {
            return Err(AppError::Forbidden);
        }
        let merchant_id = Self::acting_tenant(user)?;

        // O grupo, se informado, precisa existir dentro do mesmo tenant.
        if let Some(group_id) = payload.group_id {
            self.repo
                .find_group(merchant_id, group_id)
                .await?
                .ok_or(AppError::GroupNotFound)?;
        }

        self.repo
            .create_product(
                &self.pool,
                merchant_id,
                payload.group_id,
                &payload.name,
                payload.price,
                payload.buying_price,
            )
            .await
    }

    pub async fn edit_product(
        &self,
        user: &User,
        product_id: Uuid,
        payload: &EditProductPayload,
    ) -> Result<Product, AppError> {
        let merchant_id = Self::acting_tenant(user)?;
        let product = self
            .repo
            .find_product(merchant_id, product_id)
            .await?
            .ok_or(AppError::ProductNotFound)?;
        if !access::can_mutate(user, product.merchant_id) {
            return Err(AppError::Forbidden);
        }

        if let Some(group_id) = payload.group_id {
            self.repo
                .find_group(merchant_id, group_id)
                .await?
                .ok_or(AppError::GroupNotFound)?;
        }

        // Editar o preço do produto nunca reescreve lançamentos passados:
        // eles guardam o retrato tirado na criação.
        self.repo
            .update_product(
                &self.pool,
                product.id,
                payload.name.as_deref(),
                payload.price,
                payload.buying_price,
                payload.group_id,
            )
            .await
    }

    pub async fn delete_product(&self, user: &User, product_id: Uuid) -> Result<Product, AppError> {
        let merchant_id = Self::acting_tenant(user)?;
        let product = self
            .repo
            .find_product(merchant_id, product_id)
            .await?
            .ok_or(AppError::ProductNotFound)?;
        if !access::can_mutate(user, product.merchant_id) {
            return Err(AppError::Forbidden);
        }

        self.repo.delete_product(&self.pool, product.id).await?;
        Ok(product)
    }

    // ---
    // Grupos de produto
    // ---

    pub async fn list_groups(
        &self,
        user: &User,
        name_search: Option<&str>,
        pagination: &Pagination,
    ) -> Result<Page<ProductGroup>, AppError> {
        if !access::can_view(user) {
            return Err(AppError::Forbidden);
        }
        let (total, groups) = self
            .repo
            .list_groups(user.scope().merchant_filter(), name_search, pagination)
            .await?;
        Ok(Page::new(total, pagination, groups))
    }

    pub async fn create_group(
        &self,
        user: &User,
        payload: &CreateGroupPayload,
    ) -> Result<ProductGroup, AppError> {
        if !access::can_admin(user) {
            return Err(AppError::Forbidden);
        }
        let merchant_id = Self::acting_tenant(user)?;

        self.repo
            .create_group(&self.pool, merchant_id, &payload.name, payload.quantity)
            .await
    }

    pub async fn edit_group(
        &self,
        user: &User,
        group_id: Uuid,
        payload: &EditGroupPayload,
    ) -> Result<ProductGroup, AppError> {
        let merchant_id = Self::acting_tenant(user)?;
        let group = self
            .repo
            .find_group(merchant_id, group_id)
            .await?
            .ok_or(AppError::GroupNotFound)?;
        if !access::can_mutate(user, group.merchant_id) {
            return Err(AppError::Forbidden);
        }

        self.repo
            .update_group(
                &self.pool,
                group.id,
                payload.name.as_deref(),
                payload.quantity,
            )
            .await
    }

    pub async fn delete_group(&self, user: &User, group_id: Uuid) -> Result<ProductGroup, AppError> {
        let merchant_id = Self::acting_tenant(user)?;
        let group = self
            .repo
            .find_group(merchant_id, group_id)
            .await?
            .ok_or(AppError::GroupNotFound)?;
        if !access::can_mutate(user, group.merchant_id) {
            return Err(AppError::Forbidden);
        }

        self.repo.delete_group(&self.pool, group.id).await?;
        Ok(group)
    }
}

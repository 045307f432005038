// src/db/catalog_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::Pagination,
    },
    models::catalog::{Product, ProductGroup},
};

#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Produtos
    // ---

    pub async fn list_products(
        &self,
        merchant_id: Option<Uuid>,
        name_search: Option<&str>,
        pagination: &Pagination,
    ) -> Result<(i64, Vec<Product>), AppError> {
        let pattern = name_search.map(|n| format!("%{}%", n));

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM products
            WHERE ($1::uuid IS NULL OR merchant_id = $1)
              AND ($2::text IS NULL OR name ILIKE $2)
            "#,
        )
        .bind(merchant_id)
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE ($1::uuid IS NULL OR merchant_id = $1)
              AND ($2::text IS NULL OR name ILIKE $2)
            ORDER BY updated_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(merchant_id)
        .bind(pattern.as_deref())
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((total, products))
    }

    /// Busca sempre restrita ao tenant dono: referência cruzada não resolve.
    pub async fn find_product(
        &self,
        merchant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE id = $1 AND merchant_id = $2",
        )
        .bind(id)
        .bind(merchant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    /// Variante para leituras: a plataforma (`None`) enxerga qualquer tenant.
    pub async fn find_product_in_scope(
        &self,
        merchant_id: Option<Uuid>,
        id: Uuid,
    ) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE id = $1 AND ($2::uuid IS NULL OR merchant_id = $2)",
        )
        .bind(id)
        .bind(merchant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    pub async fn create_product<'e, E>(
        &self,
        executor: E,
        merchant_id: Uuid,
        group_id: Option<Uuid>,
        name: &str,
        price: Decimal,
        buying_price: Decimal,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (merchant_id, group_id, name, price, buying_price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(merchant_id)
        .bind(group_id)
        .bind(name)
        .bind(price)
        .bind(buying_price)
        .fetch_one(executor)
        .await?;
        Ok(product)
    }

    pub async fn update_product<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        price: Option<Decimal>,
        buying_price: Option<Decimal>,
        group_id: Option<Uuid>,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name = COALESCE($2, name),
                price = COALESCE($3, price),
                buying_price = COALESCE($4, buying_price),
                group_id = COALESCE($5, group_id),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(price)
        .bind(buying_price)
        .bind(group_id)
        .fetch_one(executor)
        .await?;
        Ok(product)
    }

    pub async fn delete_product<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // ---
    // Grupos de produto
    // ---

    pub async fn list_groups(
        &self,
        merchant_id: Option<Uuid>,
        name_search: Option<&str>,
        pagination: &Pagination,
    ) -> Result<(i64, Vec<ProductGroup>), AppError> {
        let pattern = name_search.map(|n| format!("%{}%", n));

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM product_groups
            WHERE ($1::uuid IS NULL OR merchant_id = $1)
              AND ($2::text IS NULL OR name ILIKE $2)
            "#,
        )
        .bind(merchant_id)
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let groups = sqlx::query_as::<_, ProductGroup>(
            r#"
            SELECT * FROM product_groups
            WHERE ($1::uuid IS NULL OR merchant_id = $1)
              AND ($2::text IS NULL OR name ILIKE $2)
            ORDER BY updated_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(merchant_id)
        .bind(pattern.as_deref())
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((total, groups))
    }

    pub async fn find_group(
        &self,
        merchant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<ProductGroup>, AppError> {
        let group = sqlx::query_as::<_, ProductGroup>(
            "SELECT * FROM product_groups WHERE id = $1 AND merchant_id = $2",
        )
        .bind(id)
        .bind(merchant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(group)
    }

    pub async fn create_group<'e, E>(
        &self,
        executor: E,
        merchant_id: Uuid,
        name: &str,
        quantity: Decimal,
    ) -> Result<ProductGroup, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let group = sqlx::query_as::<_, ProductGroup>(
            r#"
            INSERT INTO product_groups (merchant_id, name, quantity)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(merchant_id)
        .bind(name)
        .bind(quantity)
        .fetch_one(executor)
        .await?;
        Ok(group)
    }

    pub async fn update_group<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        quantity: Option<Decimal>,
    ) -> Result<ProductGroup, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let group = sqlx::query_as::<_, ProductGroup>(
            r#"
            UPDATE product_groups SET
                name = COALESCE($2, name),
                quantity = COALESCE($3, quantity),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(quantity)
        .fetch_one(executor)
        .await?;
        Ok(group)
    }

    pub async fn delete_group<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM product_groups WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Ids dos produtos membros de um grupo (filtro de listagem por grupo).
    pub async fn products_in_group(&self, group_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT id FROM products WHERE group_id = $1")
            .bind(group_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }
}

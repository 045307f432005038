// src/db/asset_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::Pagination,
    },
    models::asset::Asset,
};

#[derive(Clone)]
pub struct AssetRepository {
    pool: PgPool,
}

impl AssetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        merchant_id: Option<Uuid>,
        name_search: Option<&str>,
        pagination: &Pagination,
    ) -> Result<(i64, Vec<Asset>), AppError> {
        let pattern = name_search.map(|n| format!("%{}%", n));

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM assets
            WHERE ($1::uuid IS NULL OR merchant_id = $1)
              AND ($2::text IS NULL OR name ILIKE $2)
            "#,
        )
        .bind(merchant_id)
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let assets = sqlx::query_as::<_, Asset>(
            r#"
            SELECT * FROM assets
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

        Ok((total, assets))
    }

    pub async fn find(&self, merchant_id: Uuid, id: Uuid) -> Result<Option<Asset>, AppError> {
        let asset = sqlx::query_as::<_, Asset>(
            "SELECT * FROM assets WHERE id = $1 AND merchant_id = $2",
        )
        .bind(id)
        .bind(merchant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(asset)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        merchant_id: Uuid,
        name: &str,
        quantity: Decimal,
    ) -> Result<Asset, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Asset>(
            r#"
            INSERT INTO assets (merchant_id, name, quantity)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(merchant_id)
        .bind(name)
        .bind(quantity)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::NameAlreadyExists;
                }
            }
            e.into()
        })
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        quantity: Option<Decimal>,
    ) -> Result<Asset, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let asset = sqlx::query_as::<_, Asset>(
            r#"
            UPDATE assets SET
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
        Ok(asset)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

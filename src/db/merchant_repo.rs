// src/db/merchant_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::Pagination,
    },
    models::tenancy::Merchant,
};

#[derive(Clone)]
pub struct MerchantRepository {
    pool: PgPool,
}

impl MerchantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Merchant>, AppError> {
        let merchant = sqlx::query_as::<_, Merchant>("SELECT * FROM merchants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(merchant)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Merchant>, AppError> {
        let merchant = sqlx::query_as::<_, Merchant>("SELECT * FROM merchants WHERE name ILIKE $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(merchant)
    }

    pub async fn list(
        &self,
        name_search: Option<&str>,
        pagination: &Pagination,
    ) -> Result<(i64, Vec<Merchant>), AppError> {
        let pattern = name_search.map(|n| format!("%{}%", n));

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM merchants WHERE ($1::text IS NULL OR name ILIKE $1)",
        )
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let merchants = sqlx::query_as::<_, Merchant>(
            r#"
            SELECT * FROM merchants
            WHERE ($1::text IS NULL OR name ILIKE $1)
            ORDER BY updated_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(pattern.as_deref())
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((total, merchants))
    }

    pub async fn create<'e, E>(&self, executor: E, name: &str) -> Result<Merchant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Merchant>(
            "INSERT INTO merchants (name) VALUES ($1) RETURNING *",
        )
        .bind(name)
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
}

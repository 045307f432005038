// src/db/customer_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::Pagination,
    },
    models::customer::Customer,
};

#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        merchant_id: Option<Uuid>,
        name_search: Option<&str>,
        pagination: &Pagination,
    ) -> Result<(i64, Vec<Customer>), AppError> {
        let pattern = name_search.map(|n| format!("%{}%", n));

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM customers
            WHERE ($1::uuid IS NULL OR merchant_id = $1)
              AND ($2::text IS NULL OR name ILIKE $2)
            "#,
        )
        .bind(merchant_id)
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT * FROM customers
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

        Ok((total, customers))
    }

    pub async fn find(&self, merchant_id: Uuid, id: Uuid) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE id = $1 AND merchant_id = $2",
        )
        .bind(id)
        .bind(merchant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(customer)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }

    /// Clientes do escopo, para o relatório de empréstimos.
    pub async fn all_in_scope(&self, merchant_id: Option<Uuid>) -> Result<Vec<Customer>, AppError> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT * FROM customers
            WHERE ($1::uuid IS NULL OR merchant_id = $1)
            ORDER BY name ASC
            "#,
        )
        .bind(merchant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(customers)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        merchant_id: Uuid,
        name: &str,
        email: Option<&str>,
        phone: &str,
        address: &str,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (merchant_id, name, email, phone, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(merchant_id)
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(address)
        .fetch_one(executor)
        .await
        .map_err(map_unique_violation)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                phone = COALESCE($4, phone),
                address = COALESCE($5, address),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(address)
        .fetch_one(executor)
        .await
        .map_err(map_unique_violation)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}

fn map_unique_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::NameAlreadyExists;
        }
    }
    e.into()
}

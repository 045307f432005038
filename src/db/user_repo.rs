// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::Pagination,
    },
    models::auth::User,
};

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Lista usuários do escopo: `None` (plataforma) enxerga todos.
    pub async fn list(
        &self,
        merchant_id: Option<Uuid>,
        pagination: &Pagination,
    ) -> Result<(i64, Vec<User>), AppError> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM users WHERE ($1::uuid IS NULL OR merchant_id = $1)",
        )
        .bind(merchant_id)
        .fetch_one(&self.pool)
        .await?;

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE ($1::uuid IS NULL OR merchant_id = $1)
            ORDER BY created_at ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(merchant_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((total, users))
    }

    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        merchant_id: Option<Uuid>,
        name: &str,
        email: &str,
        password_hash: &str,
        group_id: i32,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (merchant_id, name, email, password_hash, group_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(merchant_id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(group_id)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            e.into()
        })
    }

    /// Atualização parcial: campos `None` mantêm o valor atual.
    pub async fn update_user<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        email: Option<&str>,
        password_hash: Option<&str>,
        group_id: Option<i32>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                group_id = COALESCE($5, group_id),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(group_id)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            e.into()
        })
    }
}

// src/db/ledger_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::Pagination,
    },
    models::{
        asset::Asset,
        catalog::ProductGroup,
        ledger::{EntryType, LedgerEntry},
    },
};

/// Filtros da listagem de lançamentos. `merchant_id = None` é o escopo da
/// plataforma (enxerga todos os tenants).
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub merchant_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub entry_type: Option<EntryType>,
    pub product_id: Option<Uuid>,
    pub product_ids: Option<Vec<Uuid>>,
    pub customer_id: Option<Uuid>,
    pub info: Option<String>,
}

#[derive(Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Lançamentos
    // ---

    pub async fn find_entry(&self, id: Uuid) -> Result<Option<LedgerEntry>, AppError> {
        let entry = sqlx::query_as::<_, LedgerEntry>("SELECT * FROM ledger_entries WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(entry)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_entry<'e, E>(
        &self,
        executor: E,
        merchant_id: Uuid,
        date: NaiveDate,
        entry_type: EntryType,
        quantity: Decimal,
        price: Decimal,
        buying_price: Decimal,
        info: Option<&str>,
        customer_id: Option<Uuid>,
        product_id: Option<Uuid>,
        asset_id: Option<Uuid>,
    ) -> Result<LedgerEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, LedgerEntry>(
            r#"
            INSERT INTO ledger_entries
                (merchant_id, date, entry_type, quantity, price, buying_price,
                 info, customer_id, product_id, asset_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(merchant_id)
        .bind(date)
        .bind(entry_type)
        .bind(quantity)
        .bind(price)
        .bind(buying_price)
        .bind(info)
        .bind(customer_id)
        .bind(product_id)
        .bind(asset_id)
        .fetch_one(executor)
        .await?;
        Ok(entry)
    }

    /// Substituição completa do lançamento (a edição valida tudo antes).
    #[allow(clippy::too_many_arguments)]
    pub async fn update_entry<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        date: NaiveDate,
        entry_type: EntryType,
        quantity: Decimal,
        price: Decimal,
        buying_price: Decimal,
        info: Option<&str>,
        customer_id: Option<Uuid>,
        product_id: Option<Uuid>,
        asset_id: Option<Uuid>,
    ) -> Result<LedgerEntry, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let entry = sqlx::query_as::<_, LedgerEntry>(
            r#"
            UPDATE ledger_entries SET
                date = $2,
                entry_type = $3,
                quantity = $4,
                price = $5,
                buying_price = $6,
                info = $7,
                customer_id = $8,
                product_id = $9,
                asset_id = $10,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(date)
        .bind(entry_type)
        .bind(quantity)
        .bind(price)
        .bind(buying_price)
        .bind(info)
        .bind(customer_id)
        .bind(product_id)
        .bind(asset_id)
        .fetch_one(executor)
        .await?;
        Ok(entry)
    }

    pub async fn delete_entry<'e, E>(&self, executor: E, id: Uuid) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM ledger_entries WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn list(
        &self,
        filter: &EntryFilter,
        pagination: &Pagination,
    ) -> Result<(i64, Vec<LedgerEntry>), AppError> {
        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM ledger_entries");
        push_filters(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = QueryBuilder::new("SELECT * FROM ledger_entries");
        push_filters(&mut qb, filter);
        qb.push(" ORDER BY updated_at DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let entries = qb
            .build_query_as::<LedgerEntry>()
            .fetch_all(&self.pool)
            .await?;

        Ok((total, entries))
    }

    pub async fn entries_in_range(
        &self,
        merchant_id: Option<Uuid>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<LedgerEntry>, AppError> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT * FROM ledger_entries
            WHERE ($1::uuid IS NULL OR merchant_id = $1)
              AND date >= $2 AND date <= $3
            ORDER BY date ASC
            "#,
        )
        .bind(merchant_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    pub async fn entries_for_product_range(
        &self,
        product_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<LedgerEntry>, AppError> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT * FROM ledger_entries
            WHERE product_id = $1 AND date >= $2 AND date <= $3
            ORDER BY date ASC
            "#,
        )
        .bind(product_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    /// Lançamentos borrow/return do escopo, opcionalmente até uma data.
    pub async fn borrow_return_entries(
        &self,
        merchant_id: Option<Uuid>,
        up_to: Option<NaiveDate>,
    ) -> Result<Vec<LedgerEntry>, AppError> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT * FROM ledger_entries
            WHERE ($1::uuid IS NULL OR merchant_id = $1)
              AND entry_type IN ('borrow', 'return')
              AND ($2::date IS NULL OR date <= $2)
            ORDER BY date ASC
            "#,
        )
        .bind(merchant_id)
        .bind(up_to)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    // ---
    // Saldos (livro-razão de saldo)
    // ---
    // O incremento roda dentro do banco: duas mutações concorrentes sobre o
    // mesmo saldo são serializadas pelo storage e nenhuma atualização se perde.

    /// Retorna 0 linhas afetadas se o grupo não existe mais; o chamador
    /// tolera o órfão.
    pub async fn adjust_group_quantity<'e, E>(
        &self,
        executor: E,
        group_id: Uuid,
        delta: Decimal,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE product_groups SET quantity = quantity + $2, updated_at = now() WHERE id = $1",
        )
        .bind(group_id)
        .bind(delta)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn adjust_asset_quantity<'e, E>(
        &self,
        executor: E,
        asset_id: Uuid,
        delta: Decimal,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE assets SET quantity = quantity + $2, updated_at = now() WHERE id = $1",
        )
        .bind(asset_id)
        .bind(delta)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn set_group_quantity<'e, E>(
        &self,
        executor: E,
        group_id: Uuid,
        quantity: Decimal,
    ) -> Result<ProductGroup, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let group = sqlx::query_as::<_, ProductGroup>(
            r#"
            UPDATE product_groups SET quantity = $2, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(group_id)
        .bind(quantity)
        .fetch_one(executor)
        .await?;
        Ok(group)
    }

    pub async fn set_asset_quantity<'e, E>(
        &self,
        executor: E,
        asset_id: Uuid,
        quantity: Decimal,
    ) -> Result<Asset, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let asset = sqlx::query_as::<_, Asset>(
            r#"
            UPDATE assets SET quantity = $2, updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(asset_id)
        .bind(quantity)
        .fetch_one(executor)
        .await?;
        Ok(asset)
    }

    /// Histórico completo que afeta um grupo, via produtos membros.
    pub async fn entries_for_group(
        &self,
        group_id: Uuid,
    ) -> Result<Vec<(EntryType, Decimal)>, AppError> {
        let rows = sqlx::query_as::<_, (EntryType, Decimal)>(
            r#"
            SELECT e.entry_type, e.quantity
            FROM ledger_entries e
            JOIN products p ON e.product_id = p.id
            WHERE p.group_id = $1
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn entries_for_asset(
        &self,
        asset_id: Uuid,
    ) -> Result<Vec<(EntryType, Decimal)>, AppError> {
        let rows = sqlx::query_as::<_, (EntryType, Decimal)>(
            "SELECT entry_type, quantity FROM ledger_entries WHERE asset_id = $1",
        )
        .bind(asset_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &EntryFilter) {
    qb.push(" WHERE 1 = 1");
    if let Some(merchant_id) = filter.merchant_id {
        qb.push(" AND merchant_id = ").push_bind(merchant_id);
    }
    if let Some(start) = filter.start_date {
        qb.push(" AND date >= ").push_bind(start);
    }
    if let Some(end) = filter.end_date {
        qb.push(" AND date <= ").push_bind(end);
    }
    if let Some(entry_type) = filter.entry_type {
        qb.push(" AND entry_type = ").push_bind(entry_type);
    }
    if let Some(product_id) = filter.product_id {
        qb.push(" AND product_id = ").push_bind(product_id);
    }
    if let Some(product_ids) = &filter.product_ids {
        qb.push(" AND product_id = ANY(").push_bind(product_ids.clone()).push(")");
    }
    if let Some(customer_id) = filter.customer_id {
        qb.push(" AND customer_id = ").push_bind(customer_id);
    }
    if let Some(info) = &filter.info {
        qb.push(" AND info ILIKE ").push_bind(format!("%{}%", info));
    }
}

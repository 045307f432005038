// src/services/report_service.rs

// Agregador de relatórios: só leitura, derivado dos lançamentos. Pode
// rodar em paralelo com mutações e observar um saldo no meio de uma
// atualização; nenhum isolamento de snapshot é prometido.

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CatalogRepository, CustomerRepository, LedgerRepository},
    models::{
        auth::User,
        customer::Customer,
        ledger::{EntryType, LedgerEntry},
        report::{BorrowReport, CustomerBorrowSummary, DaySales, RevenueSummary, WeeklyReport},
    },
    services::access,
};

/// Convenção de receita: `buy` é gasto (buying_price × qtde), o resto é
/// entrada (price × qtde). Independente da tabela de sinais do saldo —
/// são duas regras separadas de propósito.
fn summarize(entries: &[LedgerEntry]) -> RevenueSummary {
    let mut income = Decimal::ZERO;
    let mut spending = Decimal::ZERO;
    for entry in entries {
        match entry.entry_type {
            EntryType::Buy => spending += entry.buying_price * entry.quantity,
            _ => income += entry.price * entry.quantity,
        }
    }
    RevenueSummary {
        income,
        spending,
        revenue: income - spending,
    }
}

/// Segunda-feira da semana que contém a data.
fn week_start_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Exatamente 7 baldes Seg–Dom, preenchidos com zero nos dias sem
/// lançamento.
fn weekly_buckets(week_start: NaiveDate, entries: &[LedgerEntry]) -> Vec<DaySales> {
    (0..7)
        .map(|offset| {
            let day = week_start + Duration::days(offset);
            let of_day: Vec<LedgerEntry> = entries
                .iter()
                .filter(|e| e.date == day)
                .cloned()
                .collect();
            let summary = summarize(&of_day);
            DaySales {
                day: day.weekday().to_string(),
                date: day,
                income: summary.income,
                spending: summary.spending,
            }
        })
        .collect()
}

/// Saldo devedor por cliente: empréstimos menos devoluções. O coorte
/// inteiro aparece, inclusive clientes sem movimento.
fn borrow_summaries(customers: &[Customer], entries: &[LedgerEntry]) -> BorrowReport {
    let mut report = BorrowReport {
        customers: Vec::with_capacity(customers.len()),
        total_outstanding: Decimal::ZERO,
    };

    for customer in customers {
        let mut borrowed = Decimal::ZERO;
        let mut returned = Decimal::ZERO;
        for entry in entries.iter().filter(|e| e.customer_id == Some(customer.id)) {
            match entry.entry_type {
                EntryType::Borrow => borrowed += entry.quantity,
                EntryType::Return => returned += entry.quantity,
                _ => {}
            }
        }
        let outstanding = borrowed - returned;
        report.total_outstanding += outstanding;
        report.customers.push(CustomerBorrowSummary {
            customer_id: customer.id,
            customer_name: customer.name.clone(),
            borrowed,
            returned,
            outstanding,
        });
    }

    report
}

#[derive(Clone)]
pub struct ReportService {
    ledger_repo: LedgerRepository,
    customer_repo: CustomerRepository,
    catalog_repo: CatalogRepository,
}

impl ReportService {
    pub fn new(
        ledger_repo: LedgerRepository,
        customer_repo: CustomerRepository,
        catalog_repo: CatalogRepository,
    ) -> Self {
        Self {
            ledger_repo,
            customer_repo,
            catalog_repo,
        }
    }

    pub async fn revenue(
        &self,
        user: &User,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<RevenueSummary, AppError> {
        if !access::can_view(user) {
            return Err(AppError::Forbidden);
        }
        let entries = self
            .ledger_repo
            .entries_in_range(user.scope().merchant_filter(), start, end)
            .await?;
        Ok(summarize(&entries))
    }

    pub async fn weekly(
        &self,
        user: &User,
        product_id: Uuid,
        date: NaiveDate,
    ) -> Result<WeeklyReport, AppError> {
        if !access::can_view(user) {
            return Err(AppError::Forbidden);
        }
        let product = self
            .catalog_repo
            .find_product_in_scope(user.scope().merchant_filter(), product_id)
            .await?
            .ok_or(AppError::ProductNotFound)?;

        let week_start = week_start_of(date);
        let week_end = week_start + Duration::days(6);
        let entries = self
            .ledger_repo
            .entries_for_product_range(product.id, week_start, week_end)
            .await?;

        Ok(WeeklyReport {
            product_id: product.id,
            week_start,
            days: weekly_buckets(week_start, &entries),
        })
    }

    pub async fn borrows(
        &self,
        user: &User,
        up_to: Option<NaiveDate>,
    ) -> Result<BorrowReport, AppError> {
        if !access::can_view(user) {
            return Err(AppError::Forbidden);
        }
        let scope = user.scope().merchant_filter();
        let customers = self.customer_repo.all_in_scope(scope).await?;
        let entries = self.ledger_repo.borrow_return_entries(scope, up_to).await?;
        Ok(borrow_summaries(&customers, &entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn entry(
        entry_type: EntryType,
        quantity: Decimal,
        price: Decimal,
        buying_price: Decimal,
        date: NaiveDate,
        customer_id: Option<Uuid>,
    ) -> LedgerEntry {
        LedgerEntry {
            id: Uuid::new_v4(),
            merchant_id: Uuid::new_v4(),
            date,
            entry_type,
            quantity,
            price,
            buying_price,
            info: None,
            customer_id,
            product_id: Some(Uuid::new_v4()),
            asset_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn customer(name: &str) -> Customer {
        Customer {
            id: Uuid::new_v4(),
            merchant_id: Uuid::new_v4(),
            name: name.into(),
            email: None,
            phone: "11 99999-0000".into(),
            address: "Rua A, 1".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn revenue_splits_income_and_spending() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        // compra de 5 a custo 2 e venda de 3 a preço 10
        let entries = vec![
            entry(EntryType::Buy, dec!(5), dec!(3), dec!(2), date, None),
            entry(EntryType::Sell, dec!(3), dec!(10), dec!(2), date, Some(Uuid::new_v4())),
        ];

        let summary = summarize(&entries);
        assert_eq!(summary.spending, dec!(10));
        assert_eq!(summary.income, dec!(30));
        assert_eq!(summary.revenue, dec!(20));
    }

    #[test]
    fn revenue_counts_borrow_and_return_as_income() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let cid = Some(Uuid::new_v4());
        let entries = vec![
            entry(EntryType::Borrow, dec!(2), dec!(4), dec!(1), date, cid),
            entry(EntryType::Return, dec!(1), dec!(4), dec!(1), date, cid),
        ];

        let summary = summarize(&entries);
        assert_eq!(summary.income, dec!(12));
        assert_eq!(summary.spending, Decimal::ZERO);
    }

    #[test]
    fn week_starts_on_monday() {
        // 2024-03-07 é uma quinta-feira
        let thursday = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        assert_eq!(week_start_of(thursday), monday);
        assert_eq!(week_start_of(monday), monday);
    }

    #[test]
    fn weekly_buckets_are_zero_filled_and_exactly_seven() {
        let monday = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let wednesday = NaiveDate::from_ymd_opt(2024, 3, 6).unwrap();
        let entries = vec![
            entry(EntryType::Sell, dec!(2), dec!(10), dec!(5), monday, Some(Uuid::new_v4())),
            entry(EntryType::Buy, dec!(4), dec!(10), dec!(5), wednesday, None),
        ];

        let days = weekly_buckets(monday, &entries);
        assert_eq!(days.len(), 7);
        assert_eq!(days[0].day, "Mon");
        assert_eq!(days[6].day, "Sun");
        assert_eq!(days[0].income, dec!(20));
        assert_eq!(days[2].spending, dec!(20));
        // dias sem lançamento ficam zerados, mas presentes
        assert_eq!(days[1].income, Decimal::ZERO);
        assert_eq!(days[1].spending, Decimal::ZERO);
        assert_eq!(days[5].income, Decimal::ZERO);
    }

    #[test]
    fn borrow_report_outstanding_per_customer_and_total() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let alice = customer("Alice");
        let bruno = customer("Bruno");

        let mut borrow_a = entry(EntryType::Borrow, dec!(5), dec!(0), dec!(0), date, Some(alice.id));
        borrow_a.asset_id = Some(Uuid::new_v4());
        let mut return_a = entry(EntryType::Return, dec!(2), dec!(0), dec!(0), date, Some(alice.id));
        return_a.asset_id = Some(Uuid::new_v4());

        let report = borrow_summaries(&[alice.clone(), bruno.clone()], &[borrow_a, return_a]);

        assert_eq!(report.customers.len(), 2);
        assert_eq!(report.customers[0].outstanding, dec!(3));
        // cliente sem movimento aparece zerado
        assert_eq!(report.customers[1].outstanding, Decimal::ZERO);
        assert_eq!(report.total_outstanding, dec!(3));
    }

    #[test]
    fn borrow_report_ignores_sales_and_buys() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let alice = customer("Alice");
        let sale = entry(EntryType::Sell, dec!(9), dec!(10), dec!(5), date, Some(alice.id));

        let report = borrow_summaries(&[alice], &[sale]);
        assert_eq!(report.customers[0].outstanding, Decimal::ZERO);
        assert_eq!(report.total_outstanding, Decimal::ZERO);
    }
}

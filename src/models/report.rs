// src/models/report.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

// Relatórios são derivados dos lançamentos; nada aqui volta para o banco.

/// Receita de um intervalo: `buy` conta como gasto (buying_price × qtde),
/// os demais tipos como entrada (price × qtde). Convenção independente da
/// tabela de sinais do saldo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueSummary {
    pub income: Decimal,
    pub spending: Decimal,
    pub revenue: Decimal,
}

/// Um balde de dia da semana do relatório semanal (sempre 7, Seg–Dom).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySales {
    pub day: String,
    pub date: NaiveDate,
    pub income: Decimal,
    pub spending: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReport {
    pub product_id: Uuid,
    pub week_start: NaiveDate,
    pub days: Vec<DaySales>,
}

/// Saldo devedor de um cliente: empréstimos menos devoluções.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerBorrowSummary {
    pub customer_id: Uuid,
    pub customer_name: String,
    pub borrowed: Decimal,
    pub returned: Decimal,
    pub outstanding: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BorrowReport {
    pub customers: Vec<CustomerBorrowSummary>,
    pub total_outstanding: Decimal,
}

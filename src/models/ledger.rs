// src/models/ledger.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::common::error::AppError;

/// Tipos fechados de lançamento. Adicionar um tipo novo obriga a decidir,
/// em tempo de compilação, o sinal dele no saldo e a regra de cliente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "ledger_entry_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Buy,
    Sell,
    Borrow,
    Return,
}

impl EntryType {
    /// Tabela de sinais do saldo: compra e devolução entram, venda e
    /// empréstimo saem. O sinal mora aqui e em nenhum outro lugar.
    pub fn signed(&self, quantity: Decimal) -> Decimal {
        match self {
            EntryType::Buy | EntryType::Return => quantity,
            EntryType::Sell | EntryType::Borrow => -quantity,
        }
    }

    /// Regra de associação com cliente: `buy` proíbe, os demais exigem.
    pub fn requires_customer(&self) -> bool {
        !matches!(self, EntryType::Buy)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Buy => "buy",
            EntryType::Sell => "sell",
            EntryType::Borrow => "borrow",
            EntryType::Return => "return",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(EntryType::Buy),
            "sell" => Ok(EntryType::Sell),
            "borrow" => Ok(EntryType::Borrow),
            "return" => Ok(EntryType::Return),
            other => Err(AppError::UnknownEntryType(other.to_string())),
        }
    }
}

/// Soma com sinal de uma sequência de lançamentos. É a definição do saldo
/// de um grupo/ativo; o valor em cache precisa sempre convergir para ela.
pub fn signed_sum<I>(entries: I) -> Decimal
where
    I: IntoIterator<Item = (EntryType, Decimal)>,
{
    entries
        .into_iter()
        .fold(Decimal::ZERO, |acc, (entry_type, quantity)| {
            acc + entry_type.signed(quantity)
        })
}

/// Alvo de um lançamento: exatamente um produto ou um ativo legado.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryTarget {
    Product(Uuid),
    Asset(Uuid),
}

impl EntryTarget {
    /// Converte o par opcional vindo do payload; aceitar os dois (ou
    /// nenhum) é erro do chamador.
    pub fn from_ids(product_id: Option<Uuid>, asset_id: Option<Uuid>) -> Result<Self, AppError> {
        match (product_id, asset_id) {
            (Some(id), None) => Ok(EntryTarget::Product(id)),
            (None, Some(id)) => Ok(EntryTarget::Asset(id)),
            _ => Err(AppError::InvalidTarget),
        }
    }
}

// Um lançamento do livro-razão. `price`/`buying_price` são retratos do
// produto no momento da criação/edição, nunca recalculados depois.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: Uuid,
    pub merchant_id: Uuid,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub quantity: Decimal,
    pub price: Decimal,
    pub buying_price: Decimal,
    pub info: Option<String>,
    pub customer_id: Option<Uuid>,
    pub product_id: Option<Uuid>,
    pub asset_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn sign_table_is_exact() {
        assert_eq!(EntryType::Buy.signed(dec!(5)), dec!(5));
        assert_eq!(EntryType::Return.signed(dec!(5)), dec!(5));
        assert_eq!(EntryType::Sell.signed(dec!(5)), dec!(-5));
        assert_eq!(EntryType::Borrow.signed(dec!(5)), dec!(-5));
    }

    #[test]
    fn customer_rule_matrix() {
        assert!(!EntryType::Buy.requires_customer());
        assert!(EntryType::Sell.requires_customer());
        assert!(EntryType::Borrow.requires_customer());
        assert!(EntryType::Return.requires_customer());
    }

    #[test]
    fn signed_sum_follows_running_balance() {
        // compra de 10, venda de 4: saldo 6; sem a venda, 10
        let entries = vec![(EntryType::Buy, dec!(10)), (EntryType::Sell, dec!(4))];
        assert_eq!(signed_sum(entries.clone()), dec!(6));
        assert_eq!(signed_sum(entries.into_iter().take(1)), dec!(10));
    }

    #[test]
    fn signed_sum_may_go_negative() {
        // saldo negativo é estado legítimo (venda a descoberto)
        let entries = vec![(EntryType::Sell, dec!(3))];
        assert_eq!(signed_sum(entries), dec!(-3));
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(matches!(
            "steal".parse::<EntryType>(),
            Err(AppError::UnknownEntryType(_))
        ));
        assert_eq!("borrow".parse::<EntryType>().unwrap(), EntryType::Borrow);
    }

    #[test]
    fn target_requires_exactly_one_reference() {
        let id = Uuid::new_v4();
        assert!(EntryTarget::from_ids(Some(id), Some(id)).is_err());
        assert!(EntryTarget::from_ids(None, None).is_err());
        assert_eq!(
            EntryTarget::from_ids(Some(id), None).unwrap(),
            EntryTarget::Product(id)
        );
    }

    fn entry_type_strategy() -> impl Strategy<Value = EntryType> {
        prop_oneof![
            Just(EntryType::Buy),
            Just(EntryType::Sell),
            Just(EntryType::Borrow),
            Just(EntryType::Return),
        ]
    }

    fn entries_strategy() -> impl Strategy<Value = Vec<(EntryType, Decimal)>> {
        prop::collection::vec(
            (entry_type_strategy(), (1i64..10_000).prop_map(Decimal::from)),
            0..32,
        )
    }

    proptest! {
        // Aditividade: aplicar os deltas um a um equivale a recomputar do zero.
        #[test]
        fn prop_incremental_deltas_match_recompute(entries in entries_strategy()) {
            let incremental = entries
                .iter()
                .fold(Decimal::ZERO, |acc, (t, q)| acc + t.signed(*q));
            prop_assert_eq!(incremental, signed_sum(entries));
        }

        // Criar e depois remover o mesmo lançamento não move o saldo.
        #[test]
        fn prop_apply_then_reverse_cancels(
            t in entry_type_strategy(),
            q in (1i64..10_000).prop_map(Decimal::from),
            start in (-10_000i64..10_000).prop_map(Decimal::from),
        ) {
            let after = start + t.signed(q);
            prop_assert_eq!(after - t.signed(q), start);
        }
    }
}

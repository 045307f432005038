// src/services/ledger_service.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, Pagination},
    },
    db::{AssetRepository, CatalogRepository, CustomerRepository, EntryFilter, LedgerRepository},
    models::{
        asset::Asset,
        auth::{Scope, User},
        catalog::ProductGroup,
        ledger::{signed_sum, EntryTarget, EntryType, LedgerEntry},
    },
    services::access,
};

/// Saldo em cache afetado por um lançamento: grupo do produto ou ativo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BalanceRef {
    Group(Uuid),
    Asset(Uuid),
}

/// Um delta de saldo já assinado, pronto para aplicar no storage.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BalanceMove {
    target: BalanceRef,
    delta: Decimal,
}

/// Regra de pareamento tipo × cliente, nas duas direções.
fn check_customer_pairing(
    entry_type: EntryType,
    customer_id: Option<Uuid>,
) -> Result<(), AppError> {
    match (entry_type.requires_customer(), customer_id) {
        (true, None) => Err(AppError::CustomerRequired),
        (false, Some(_)) => Err(AppError::CustomerNotAllowed),
        _ => Ok(()),
    }
}

fn stage_apply(
    balance: Option<BalanceRef>,
    entry_type: EntryType,
    quantity: Decimal,
) -> Option<BalanceMove> {
    balance.map(|target| BalanceMove {
        target,
        delta: entry_type.signed(quantity),
    })
}

fn stage_reverse(
    balance: Option<BalanceRef>,
    entry_type: EntryType,
    quantity: Decimal,
) -> Option<BalanceMove> {
    balance.map(|target| BalanceMove {
        target,
        delta: -entry_type.signed(quantity),
    })
}

/// Edição: estorna o delta antigo no saldo antigo e aplica o novo no
/// saldo novo. Os dois movimentos são encenados juntos, antes de
/// qualquer persistência, e executados na mesma transação.
fn stage_edit(
    old_balance: Option<BalanceRef>,
    old_type: EntryType,
    old_quantity: Decimal,
    new_balance: Option<BalanceRef>,
    new_type: EntryType,
    new_quantity: Decimal,
) -> Vec<BalanceMove> {
    let mut moves = Vec::with_capacity(2);
    if let Some(mv) = stage_reverse(old_balance, old_type, old_quantity) {
        moves.push(mv);
    }
    if let Some(mv) = stage_apply(new_balance, new_type, new_quantity) {
        moves.push(mv);
    }
    moves
}

#[derive(Clone)]
pub struct LedgerService {
    ledger_repo: LedgerRepository,
    catalog_repo: CatalogRepository,
    customer_repo: CustomerRepository,
    asset_repo: AssetRepository,
    pool: PgPool,
}

/// Alvo já resolvido contra o banco: retratos de preço + saldo afetado.
struct ResolvedTarget {
    price: Decimal,
    buying_price: Decimal,
    product_id: Option<Uuid>,
    asset_id: Option<Uuid>,
    balance: Option<BalanceRef>,
}

impl LedgerService {
    pub fn new(
        ledger_repo: LedgerRepository,
        catalog_repo: CatalogRepository,
        customer_repo: CustomerRepository,
        asset_repo: AssetRepository,
        pool: PgPool,
    ) -> Self {
        Self {
            ledger_repo,
            catalog_repo,
            customer_repo,
            asset_repo,
            pool,
        }
    }

    /// Tenant do chamador. A plataforma não cria nem move lançamentos.
    fn acting_tenant(user: &User) -> Result<Uuid, AppError> {
        match user.scope() {
            Scope::Tenant(id) => Ok(id),
            Scope::Platform => Err(AppError::Forbidden),
        }
    }

    /// Resolve o alvo dentro do tenant e tira os retratos de preço.
    /// Referência cruzada não resolve: vira "não encontrado", sem vazar
    /// a existência do recurso.
    async fn resolve_target(
        &self,
        user: &User,
        merchant_id: Uuid,
        target: EntryTarget,
    ) -> Result<ResolvedTarget, AppError> {
        match target {
            EntryTarget::Product(product_id) => {
                let product = self
                    .catalog_repo
                    .find_product(merchant_id, product_id)
                    .await?
                    .ok_or(AppError::ProductNotFound)?;
                if !access::can_mutate(user, product.merchant_id) {
                    return Err(AppError::Forbidden);
                }
                Ok(ResolvedTarget {
                    price: product.price,
                    buying_price: product.buying_price,
                    product_id: Some(product.id),
                    asset_id: None,
                    balance: product.group_id.map(BalanceRef::Group),
                })
            }
            EntryTarget::Asset(asset_id) => {
                let asset = self
                    .asset_repo
                    .find(merchant_id, asset_id)
                    .await?
                    .ok_or(AppError::AssetNotFound)?;
                if !access::can_mutate(user, asset.merchant_id) {
                    return Err(AppError::Forbidden);
                }
                Ok(ResolvedTarget {
                    price: Decimal::ZERO,
                    buying_price: Decimal::ZERO,
                    product_id: None,
                    asset_id: Some(asset.id),
                    balance: Some(BalanceRef::Asset(asset.id)),
                })
            }
        }
    }

    async fn check_customer(
        &self,
        user: &User,
        merchant_id: Uuid,
        customer_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        if let Some(customer_id) = customer_id {
            let customer = self
                .customer_repo
                .find(merchant_id, customer_id)
                .await?
                .ok_or(AppError::CustomerNotFound)?;
            if !access::can_mutate(user, customer.merchant_id) {
                return Err(AppError::Forbidden);
            }
        }
        Ok(())
    }

    /// Saldo afetado pelo lançamento como está hoje no banco. Produto ou
    /// grupo apagado por baixo do lançamento é tolerado: sem saldo, o
    /// delta é pulado.
    async fn current_balance_of(&self, entry: &LedgerEntry) -> Result<Option<BalanceRef>, AppError> {
        if let Some(product_id) = entry.product_id {
            let product = self
                .catalog_repo
                .find_product(entry.merchant_id, product_id)
                .await?;
            return Ok(product.and_then(|p| p.group_id).map(BalanceRef::Group));
        }
        if let Some(asset_id) = entry.asset_id {
            let asset = self.asset_repo.find(entry.merchant_id, asset_id).await?;
            return Ok(asset.map(|a| BalanceRef::Asset(a.id)));
        }
        Ok(None)
    }

    async fn apply_move<'e, E>(&self, executor: E, mv: BalanceMove) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        match mv.target {
            BalanceRef::Group(id) => {
                self.ledger_repo
                    .adjust_group_quantity(executor, id, mv.delta)
                    .await?;
            }
            BalanceRef::Asset(id) => {
                self.ledger_repo
                    .adjust_asset_quantity(executor, id, mv.delta)
                    .await?;
            }
        }
        Ok(())
    }

    // ---
    // Operações
    // ---

    #[allow(clippy::too_many_arguments)]
    pub async fn create_entry(
        &self,
        user: &User,
        date: NaiveDate,
        target: EntryTarget,
        entry_type: EntryType,
        quantity: Decimal,
        info: Option<&str>,
        customer_id: Option<Uuid>,
    ) -> Result<LedgerEntry, AppError> {
        // Toda a validação vem antes de qualquer mutação.
        check_customer_pairing(entry_type, customer_id)?;
        let merchant_id = Self::acting_tenant(user)?;
        self.check_customer(user, merchant_id, customer_id).await?;
        let resolved = self.resolve_target(user, merchant_id, target).await?;

        let mut tx = self.pool.begin().await?;

        let entry = self
            .ledger_repo
            .insert_entry(
                &mut *tx,
                merchant_id,
                date,
                entry_type,
                quantity,
                resolved.price,
                resolved.buying_price,
                info,
                customer_id,
                resolved.product_id,
                resolved.asset_id,
            )
            .await?;

        if let Some(mv) = stage_apply(resolved.balance, entry_type, quantity) {
            self.apply_move(&mut *tx, mv).await?;
        }

        tx.commit().await?;
        Ok(entry)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn edit_entry(
        &self,
        user: &User,
        entry_id: Uuid,
        date: NaiveDate,
        target: EntryTarget,
        entry_type: EntryType,
        quantity: Decimal,
        info: Option<&str>,
        customer_id: Option<Uuid>,
    ) -> Result<LedgerEntry, AppError> {
        let entry = self
            .ledger_repo
            .find_entry(entry_id)
            .await?
            .ok_or(AppError::EntryNotFound)?;

        // O dono vem da linha persistida; impede realocar o lançamento
        // para um tenant que o chamador não controla.
        if !access::can_mutate(user, entry.merchant_id) {
            return Err(AppError::Forbidden);
        }

        // Pareamento revalidado contra o tipo NOVO, antes de mexer em saldo.
        check_customer_pairing(entry_type, customer_id)?;
        self.check_customer(user, entry.merchant_id, customer_id)
            .await?;

        let resolved = self
            .resolve_target(user, entry.merchant_id, target)
            .await?;
        let old_balance = self.current_balance_of(&entry).await?;

        // Estorno e aplicação encenados juntos: tudo ou nada.
        let moves = stage_edit(
            old_balance,
            entry.entry_type,
            entry.quantity,
            resolved.balance,
            entry_type,
            quantity,
        );

        let mut tx = self.pool.begin().await?;

        for mv in moves {
            self.apply_move(&mut *tx, mv).await?;
        }

        let updated = self
            .ledger_repo
            .update_entry(
                &mut *tx,
                entry.id,
                date,
                entry_type,
                quantity,
                resolved.price,
                resolved.buying_price,
                info,
                customer_id,
                resolved.product_id,
                resolved.asset_id,
            )
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn delete_entry(&self, user: &User, entry_id: Uuid) -> Result<LedgerEntry, AppError> {
        let entry = self
            .ledger_repo
            .find_entry(entry_id)
            .await?
            .ok_or(AppError::EntryNotFound)?;

        if !access::can_mutate(user, entry.merchant_id) {
            return Err(AppError::Forbidden);
        }

        let balance = self.current_balance_of(&entry).await?;

        let mut tx = self.pool.begin().await?;

        if let Some(mv) = stage_reverse(balance, entry.entry_type, entry.quantity) {
            self.apply_move(&mut *tx, mv).await?;
        }
        self.ledger_repo.delete_entry(&mut *tx, entry.id).await?;

        tx.commit().await?;
        Ok(entry)
    }

    pub async fn list_entries(
        &self,
        user: &User,
        mut filter: EntryFilter,
        group_id: Option<Uuid>,
        pagination: &Pagination,
    ) -> Result<Page<LedgerEntry>, AppError> {
        if !access::can_view(user) {
            return Err(AppError::Forbidden);
        }
        if filter.product_id.is_some() && group_id.is_some() {
            return Err(AppError::FilterConflict);
        }
        filter.merchant_id = user.scope().merchant_filter();

        // Filtro por grupo expande nos produtos membros.
        if let Some(group_id) = group_id {
            let ids = self.catalog_repo.products_in_group(group_id).await?;
            if ids.is_empty() {
                return Ok(Page::new(0, pagination, vec![]));
            }
            filter.product_ids = Some(ids);
        }

        let (total, entries) = self.ledger_repo.list(&filter, pagination).await?;
        Ok(Page::new(total, pagination, entries))
    }

    // ---
    // Recomputação (correção de deriva do saldo em cache)
    // ---

    /// Reconstrói o saldo do grupo a partir do histórico completo,
    /// ignorando o valor em cache. Idempotente.
    pub async fn refresh_group(&self, user: &User, group_id: Uuid) -> Result<ProductGroup, AppError> {
        let merchant_id = Self::acting_tenant(user)?;
        let group = self
            .catalog_repo
            .find_group(merchant_id, group_id)
            .await?
            .ok_or(AppError::GroupNotFound)?;
        if !access::can_mutate(user, group.merchant_id) {
            return Err(AppError::Forbidden);
        }

        let entries = self.ledger_repo.entries_for_group(group.id).await?;
        let total = signed_sum(entries);
        self.ledger_repo
            .set_group_quantity(&self.pool, group.id, total)
            .await
    }

    pub async fn refresh_asset(&self, user: &User, asset_id: Uuid) -> Result<Asset, AppError> {
        let merchant_id = Self::acting_tenant(user)?;
        let asset = self
            .asset_repo
            .find(merchant_id, asset_id)
            .await?
            .ok_or(AppError::AssetNotFound)?;
        if !access::can_mutate(user, asset.merchant_id) {
            return Err(AppError::Forbidden);
        }

        let entries = self.ledger_repo.entries_for_asset(asset.id).await?;
        let total = signed_sum(entries);
        self.ledger_repo
            .set_asset_quantity(&self.pool, asset.id, total)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn pairing_rule_both_directions() {
        let customer = Some(Uuid::new_v4());

        assert!(matches!(
            check_customer_pairing(EntryType::Sell, None),
            Err(AppError::CustomerRequired)
        ));
        assert!(matches!(
            check_customer_pairing(EntryType::Buy, customer),
            Err(AppError::CustomerNotAllowed)
        ));
        assert!(check_customer_pairing(EntryType::Buy, None).is_ok());
        assert!(check_customer_pairing(EntryType::Sell, customer).is_ok());
        assert!(check_customer_pairing(EntryType::Borrow, customer).is_ok());
        assert!(check_customer_pairing(EntryType::Return, customer).is_ok());
    }

    #[test]
    fn apply_and_reverse_are_inverses() {
        let group = Some(BalanceRef::Group(Uuid::new_v4()));

        let apply = stage_apply(group, EntryType::Buy, dec!(10)).unwrap();
        let reverse = stage_reverse(group, EntryType::Buy, dec!(10)).unwrap();
        assert_eq!(apply.delta, dec!(10));
        assert_eq!(reverse.delta, dec!(-10));
        assert_eq!(apply.delta + reverse.delta, Decimal::ZERO);

        let apply = stage_apply(group, EntryType::Sell, dec!(4)).unwrap();
        assert_eq!(apply.delta, dec!(-4));
    }

    #[test]
    fn orphaned_target_skips_the_delta() {
        // produto/grupo apagado por baixo do lançamento: nenhum movimento
        assert!(stage_apply(None, EntryType::Buy, dec!(10)).is_none());
        assert!(stage_reverse(None, EntryType::Sell, dec!(3)).is_none());
        assert!(stage_edit(None, EntryType::Buy, dec!(1), None, EntryType::Sell, dec!(2)).is_empty());
    }

    #[test]
    fn moving_entry_between_groups_conserves_quantity_when_type_unchanged() {
        let g1 = BalanceRef::Group(Uuid::new_v4());
        let g2 = BalanceRef::Group(Uuid::new_v4());

        let moves = stage_edit(
            Some(g1),
            EntryType::Buy,
            dec!(7),
            Some(g2),
            EntryType::Buy,
            dec!(7),
        );
        assert_eq!(moves.len(), 2);
        // G1 perde 7, G2 ganha 7: total conservado
        assert_eq!(moves[0], BalanceMove { target: g1, delta: dec!(-7) });
        assert_eq!(moves[1], BalanceMove { target: g2, delta: dec!(7) });
        assert_eq!(moves[0].delta + moves[1].delta, Decimal::ZERO);
    }

    #[test]
    fn moving_entry_with_type_change_is_not_conservative() {
        let g1 = BalanceRef::Group(Uuid::new_v4());
        let g2 = BalanceRef::Group(Uuid::new_v4());

        // buy em G1 vira sell em G2: estorna -7 e aplica -7
        let moves = stage_edit(
            Some(g1),
            EntryType::Buy,
            dec!(7),
            Some(g2),
            EntryType::Sell,
            dec!(7),
        );
        assert_eq!(moves[0].delta, dec!(-7));
        assert_eq!(moves[1].delta, dec!(-7));
        assert_ne!(moves[0].delta + moves[1].delta, Decimal::ZERO);
    }

    #[test]
    fn edit_within_same_group_reverses_then_applies() {
        let g = BalanceRef::Group(Uuid::new_v4());

        // venda de 4 vira venda de 9: líquido -5 no grupo
        let moves = stage_edit(
            Some(g),
            EntryType::Sell,
            dec!(4),
            Some(g),
            EntryType::Sell,
            dec!(9),
        );
        let net: Decimal = moves.iter().map(|m| m.delta).sum();
        assert_eq!(net, dec!(-5));
    }

    #[test]
    fn type_change_without_customer_fails_before_any_move_is_staged() {
        // O fluxo de edição chama check_customer_pairing antes de
        // stage_edit; um buy→sell sem customer_id morre aqui e nenhum
        // saldo é tocado.
        assert!(matches!(
            check_customer_pairing(EntryType::Sell, None),
            Err(AppError::CustomerRequired)
        ));
    }

    #[test]
    fn create_then_delete_cancels_on_running_balance() {
        // criação seguida de remoção: o saldo simulado volta ao início
        let group = Some(BalanceRef::Group(Uuid::new_v4()));
        let mut balance = dec!(10);

        let create = stage_apply(group, EntryType::Sell, dec!(4)).unwrap();
        balance += create.delta;
        assert_eq!(balance, dec!(6));

        let remove = stage_reverse(group, EntryType::Sell, dec!(4)).unwrap();
        balance += remove.delta;
        assert_eq!(balance, dec!(10));
    }
}

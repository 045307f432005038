// src/services/access.rs

// Portão de autorização: predicados puros sobre (principal, recurso).
// Nenhuma função aqui faz I/O ou retorna erro; o chamador converte
// `false` em AppError::Forbidden.

use uuid::Uuid;

use crate::models::auth::{Scope, User};

/// Leitura: super-admin da plataforma ou administrador de estabelecimento.
pub fn can_view(user: &User) -> bool {
    matches!(user.scope(), Scope::Platform) || user.is_admin_group()
}

/// Administração do próprio estabelecimento. A plataforma fica de fora:
/// admins administram, não negociam.
pub fn can_admin(user: &User) -> bool {
    matches!(user.scope(), Scope::Tenant(_)) && user.is_admin_group()
}

/// Mutação de um recurso: administrador do tenant que é o dono ATUAL do
/// recurso. O dono vem sempre da linha persistida, nunca do payload.
pub fn can_mutate(user: &User, owner_merchant_id: Uuid) -> bool {
    match user.scope() {
        Scope::Tenant(own) => user.is_admin_group() && own == owner_merchant_id,
        Scope::Platform => false,
    }
}

/// Edição de contas: membro comum só alcança a própria conta; admin de
/// tenant alcança as contas do próprio tenant; plataforma, todas.
pub fn can_edit_user(actor: &User, target: &User) -> bool {
    if !actor.is_admin_group() {
        return target.id == actor.id;
    }
    match actor.scope() {
        Scope::Tenant(own) => target.merchant_id == Some(own),
        Scope::Platform => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::ADMIN_GROUP;
    use chrono::Utc;

    fn user(merchant_id: Option<Uuid>, group_id: i32) -> User {
        User {
            id: Uuid::new_v4(),
            merchant_id,
            name: "Teste".into(),
            email: "teste@example.com".into(),
            password_hash: String::new(),
            group_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn platform_views_everything_but_never_trades() {
        let platform = user(None, ADMIN_GROUP);
        let tenant = Uuid::new_v4();

        assert!(can_view(&platform));
        assert!(!can_admin(&platform));
        assert!(!can_mutate(&platform, tenant));
    }

    #[test]
    fn tenant_admin_is_confined_to_own_tenant() {
        let tenant_a = Uuid::new_v4();
        let tenant_b = Uuid::new_v4();
        let admin_a = user(Some(tenant_a), ADMIN_GROUP);

        assert!(can_view(&admin_a));
        assert!(can_admin(&admin_a));
        assert!(can_mutate(&admin_a, tenant_a));
        // admin do tenant A contra recurso do tenant B: negado, não importa
        // o valor do group dele
        assert!(!can_mutate(&admin_a, tenant_b));
    }

    #[test]
    fn ordinary_member_has_no_ledger_rights() {
        let tenant = Uuid::new_v4();
        let member = user(Some(tenant), 2);

        assert!(!can_view(&member));
        assert!(!can_admin(&member));
        assert!(!can_mutate(&member, tenant));
    }

    #[test]
    fn user_edit_rules() {
        let tenant_a = Uuid::new_v4();
        let tenant_b = Uuid::new_v4();

        let platform = user(None, ADMIN_GROUP);
        let admin_a = user(Some(tenant_a), ADMIN_GROUP);
        let member_a = user(Some(tenant_a), 2);
        let member_b = user(Some(tenant_b), 2);

        // plataforma alcança qualquer conta
        assert!(can_edit_user(&platform, &member_b));
        // admin do tenant alcança contas do próprio tenant
        assert!(can_edit_user(&admin_a, &member_a));
        assert!(!can_edit_user(&admin_a, &member_b));
        // membro comum: somente a si mesmo
        assert!(can_edit_user(&member_a, &member_a));
        assert!(!can_edit_user(&member_a, &admin_a));
    }
}

// src/services/customer_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, Pagination},
    },
    db::CustomerRepository,
    models::{
        auth::{Scope, User},
        customer::{CreateCustomerPayload, Customer, EditCustomerPayload},
    },
    services::access,
};

#[derive(Clone)]
pub struct CustomerService {
    repo: CustomerRepository,
    pool: PgPool,
}

impl CustomerService {
    pub fn new(repo: CustomerRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    fn acting_tenant(user: &User) -> Result<Uuid, AppError> {
        match user.scope() {
            Scope::Tenant(id) => Ok(id),
            Scope::Platform => Err(AppError::Forbidden),
        }
    }

    pub async fn list(
        &self,
        user: &User,
        name_search: Option<&str>,
        pagination: &Pagination,
    ) -> Result<Page<Customer>, AppError> {
        if !access::can_view(user) {
            return Err(AppError::Forbidden);
        }
        let (total, customers) = self
            .repo
            .list(user.scope().merchant_filter(), name_search, pagination)
            .await?;
        Ok(Page::new(total, pagination, customers))
    }

    pub async fn create(
        &self,
        user: &User,
        payload: &CreateCustomerPayload,
    ) -> Result<Customer, AppError> {
        if !access::can_admin(user) {
            return Err(AppError::Forbidden);
        }
        let merchant_id = Self::acting_tenant(user)?;

        self.repo
            .create(
                &self.pool,
                merchant_id,
                &payload.name,
                payload.email.as_deref(),
                &payload.phone,
                &payload.address,
            )
            .await
    }

    pub async fn edit(
        &self,
        user: &User,
        customer_id: Uuid,
        payload: &EditCustomerPayload,
    ) -> Result<Customer, AppError> {
        let customer = self
            .repo
            .find_by_id(customer_id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;
        if !access::can_mutate(user, customer.merchant_id) {
            return Err(AppError::Forbidden);
        }

        self.repo
            .update(
                &self.pool,
                customer.id,
                payload.name.as_deref(),
                payload.email.as_deref(),
                payload.phone.as_deref(),
                payload.address.as_deref(),
            )
            .await
    }

    pub async fn delete(&self, user: &User, customer_id: Uuid) -> Result<Customer, AppError> {
        let customer = self
            .repo
            .find_by_id(customer_id)
            .await?
            .ok_or(AppError::CustomerNotFound)?;
        if !access::can_mutate(user, customer.merchant_id) {
            return Err(AppError::Forbidden);
        }

        self.repo.delete(&self.pool, customer.id).await?;
        Ok(customer)
    }
}

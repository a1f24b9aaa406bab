//! Customer management service

use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::customer::{CreateCustomer, Customer, CustomerPatch},
    repository::Repository,
    services::{
        access::{self, Access, Caller},
        rules,
    },
};

#[derive(Clone)]
pub struct CustomersService {
    repository: Repository,
    auth: AuthConfig,
}

impl CustomersService {
    pub fn new(repository: Repository, auth: AuthConfig) -> Self {
        Self { repository, auth }
    }

    pub async fn list(&self, caller: &Caller) -> AppResult<Vec<Customer>> {
        caller.require_role(&self.auth.admin_role)?;

        let customers = self.repository.customers.list_all().await?;
        if customers.is_empty() {
            return Err(AppError::NotFound("No customers found".to_string()));
        }
        Ok(customers)
    }

    /// Owner-gated read: a regular user may only read their own record.
    /// The authorization check runs before the existence check.
    pub async fn get(&self, id: i32, caller: &Caller) -> AppResult<Customer> {
        caller.require_any_role(&[&self.auth.user_role, &self.auth.admin_role])?;

        let caller_id = self.resolve_caller_id(caller).await?;
        if access::authorize(caller, &self.auth.admin_role, caller_id, id) == Access::Forbid {
            return Err(AppError::Authorization(
                "Customers may only view their own record".to_string(),
            ));
        }

        self.repository.customers.get_by_id(id).await
    }

    pub async fn get_by_email(&self, email: &str, caller: &Caller) -> AppResult<Customer> {
        caller.require_role(&self.auth.admin_role)?;

        self.repository
            .customers
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Customer with email {} not found", email)))
    }

    pub async fn create(&self, customer: CreateCustomer, caller: &Caller) -> AppResult<Customer> {
        caller.require_role(&self.auth.admin_role)?;
        customer
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        rules::check_customer_age(customer.date_of_birth, Utc::now().date_naive())
            .map_err(|v| AppError::Validation(v.to_string()))?;

        self.repository.customers.create(&customer).await
    }

    pub async fn update(
        &self,
        id: i32,
        patch: CustomerPatch,
        caller: &Caller,
    ) -> AppResult<Customer> {
        caller.require_role(&self.auth.admin_role)?;
        if !patch.has_changes() {
            return Err(AppError::BadRequest(
                "At least one field must be provided".to_string(),
            ));
        }
        patch
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        if patch.date_of_birth.is_some() {
            rules::check_customer_age(patch.date_of_birth, Utc::now().date_naive())
                .map_err(|v| AppError::Validation(v.to_string()))?;
        }

        self.repository.customers.update(id, &patch).await
    }

    /// Customers referenced by lendings are kept; the delete is refused
    /// rather than silently orphaning the ledger.
    pub async fn delete(&self, id: i32, caller: &Caller) -> AppResult<()> {
        caller.require_role(&self.auth.admin_role)?;

        self.repository.customers.get_by_id(id).await?;
        if self.repository.customers.has_rentals(id).await? {
            return Err(AppError::Conflict(
                "Customer is referenced by lendings and cannot be deleted".to_string(),
            ));
        }
        self.repository.customers.delete(id).await
    }

    async fn resolve_caller_id(&self, caller: &Caller) -> AppResult<Option<i32>> {
        match caller.email.as_deref() {
            Some(email) => Ok(self
                .repository
                .customers
                .find_by_email(email)
                .await?
                .map(|c| c.id)),
            None => Ok(None),
        }
    }
}

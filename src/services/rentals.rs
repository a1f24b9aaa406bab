//! Lending (rental) lifecycle service
//!
//! The only entity with temporal state. A lending is `Open` until a
//! return timestamp is recorded, which is terminal: a returned lending is
//! immutable. Create and update run inside a single transaction so the
//! precondition checks and the write cannot be torn apart by a concurrent
//! request.

use chrono::{Duration, Utc};
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::rental::{CreateRental, Rental, RentalPatch},
    repository::Repository,
    services::{
        access::{self, Access, Caller},
        rules,
    },
};

#[derive(Clone)]
pub struct RentalsService {
    repository: Repository,
    auth: AuthConfig,
}

impl RentalsService {
    pub fn new(repository: Repository, auth: AuthConfig) -> Self {
        Self { repository, auth }
    }

    /// List lendings: everything for admins, own lendings for regular
    /// users. An unresolvable caller sees nothing rather than an error.
    pub async fn list(&self, caller: &Caller) -> AppResult<Vec<Rental>> {
        caller.require_any_role(&[&self.auth.user_role, &self.auth.admin_role])?;

        let rentals = if caller.has_role(&self.auth.admin_role) {
            self.repository.rentals.list_all().await?
        } else {
            match self.resolve_caller_id(caller).await? {
                Some(customer_id) => self.repository.rentals.list_by_customer(customer_id).await?,
                None => Vec::new(),
            }
        };

        if rentals.is_empty() {
            return Err(AppError::NotFound("No lendings found".to_string()));
        }
        Ok(rentals)
    }

    /// Owner-gated read of a single lending
    pub async fn get_by_id(&self, id: i32, caller: &Caller) -> AppResult<Rental> {
        caller.require_any_role(&[&self.auth.user_role, &self.auth.admin_role])?;

        let rental = self
            .repository
            .rentals
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Lending with id {} not found", id)))?;

        let caller_id = self.resolve_caller_id(caller).await?;
        if access::authorize(caller, &self.auth.admin_role, caller_id, rental.customer_id)
            == Access::Forbid
        {
            return Err(AppError::Authorization(
                "Customers may only view their own lendings".to_string(),
            ));
        }
        Ok(rental)
    }

    /// Overdue lendings, optionally narrowed to one customer. A regular
    /// user asking for another customer's overdue list is forbidden before
    /// any row is touched.
    pub async fn list_overdue(
        &self,
        customer_id: Option<i32>,
        caller: &Caller,
    ) -> AppResult<Vec<Rental>> {
        caller.require_any_role(&[&self.auth.user_role, &self.auth.admin_role])?;

        let scope = if caller.has_role(&self.auth.admin_role) {
            customer_id
        } else {
            let caller_id = self.resolve_caller_id(caller).await?;
            if let Some(requested) = customer_id {
                if caller_id != Some(requested) {
                    return Err(AppError::Authorization(
                        "Customers may only view their own overdue lendings".to_string(),
                    ));
                }
            }
            match caller_id {
                Some(id) => Some(id),
                // Unresolved caller: empty scope, reported as no rows
                None => return Err(AppError::NotFound("No overdue lendings found".to_string())),
            }
        };

        let rentals = self.repository.rentals.list_overdue(scope).await?;
        if rentals.is_empty() {
            return Err(AppError::NotFound("No overdue lendings found".to_string()));
        }
        Ok(rentals)
    }

    /// Admin listing by customer id; unknown customer is a bad reference
    pub async fn list_by_customer(&self, customer_id: i32, caller: &Caller) -> AppResult<Vec<Rental>> {
        caller.require_role(&self.auth.admin_role)?;

        if self.repository.customers.find_by_id(customer_id).await?.is_none() {
            return Err(AppError::BadRequest(format!(
                "Customer with id {} does not exist",
                customer_id
            )));
        }

        let rentals = self.repository.rentals.list_by_customer(customer_id).await?;
        if rentals.is_empty() {
            return Err(AppError::NotFound("No lendings found".to_string()));
        }
        Ok(rentals)
    }

    /// Admin listing by thing id; unknown thing is a bad reference
    pub async fn list_by_thing(&self, thing_id: i32, caller: &Caller) -> AppResult<Vec<Rental>> {
        caller.require_role(&self.auth.admin_role)?;

        if self.repository.things.find_by_id(thing_id).await?.is_none() {
            return Err(AppError::BadRequest(format!(
                "Thing with id {} does not exist",
                thing_id
            )));
        }

        let rentals = self.repository.rentals.list_by_thing(thing_id).await?;
        if rentals.is_empty() {
            return Err(AppError::NotFound("No lendings found".to_string()));
        }
        Ok(rentals)
    }

    /// Lendings for all things sharing a short name, scoped to the caller
    /// unless admin
    pub async fn list_by_thing_short_name(
        &self,
        short_name: &str,
        caller: &Caller,
    ) -> AppResult<Vec<Rental>> {
        caller.require_any_role(&[&self.auth.user_role, &self.auth.admin_role])?;

        let scope = if caller.has_role(&self.auth.admin_role) {
            None
        } else {
            match self.resolve_caller_id(caller).await? {
                Some(id) => Some(id),
                None => return Err(AppError::NotFound("No lendings found".to_string())),
            }
        };

        let rentals = self
            .repository
            .rentals
            .list_by_thing_short_name(short_name, scope)
            .await?;
        if rentals.is_empty() {
            return Err(AppError::NotFound("No lendings found".to_string()));
        }
        Ok(rentals)
    }

    /// Create a lending. Admins may lend to anyone; a regular user only to
    /// themselves. If the thing carries an age restriction the target
    /// customer's birth date is checked; on failure nothing is persisted.
    pub async fn create(&self, request: CreateRental, caller: &Caller) -> AppResult<Rental> {
        caller.require_any_role(&[&self.auth.user_role, &self.auth.admin_role])?;
        request
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let caller_id = self.resolve_caller_id(caller).await?;
        if access::authorize(caller, &self.auth.admin_role, caller_id, request.customer_id)
            == Access::Forbid
        {
            return Err(AppError::Authorization(
                "Customers may only create lendings for themselves".to_string(),
            ));
        }

        let mut tx = self.repository.begin().await?;

        let customer = self
            .repository
            .customers
            .find_by_id_tx(&mut tx, request.customer_id)
            .await?
            .ok_or_else(|| {
                AppError::BadRequest(format!(
                    "Customer with id {} does not exist",
                    request.customer_id
                ))
            })?;
        let thing = self
            .repository
            .things
            .find_by_id_tx(&mut tx, request.thing_id)
            .await?
            .ok_or_else(|| {
                AppError::BadRequest(format!("Thing with id {} does not exist", request.thing_id))
            })?;

        // The eligibility rule only exists where a details row does
        if let Some(details) = self
            .repository
            .things
            .details_for_thing_tx(&mut tx, thing.id)
            .await?
        {
            rules::check_age_restriction(
                customer.date_of_birth,
                details.age_restriction,
                Utc::now().date_naive(),
            )
            .map_err(|v| AppError::Validation(v.to_string()))?;
        }

        let from = Utc::now();
        let until = from + Duration::days(request.duration_days);
        let rental = self
            .repository
            .rentals
            .insert(&mut tx, customer.id, thing.id, from, until)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Created lending {} (customer {}, thing {}, due {})",
            rental.id,
            rental.customer_id,
            rental.thing_id,
            rental.until
        );
        Ok(rental)
    }

    /// Apply a partial update to a lending. Authorization is evaluated
    /// against the current owner, not a newly assigned customer. A new
    /// duration recomputes `until` from the original `from`. A returned
    /// lending is immutable.
    pub async fn update(&self, patch: RentalPatch, caller: &Caller) -> AppResult<Rental> {
        caller.require_any_role(&[&self.auth.user_role, &self.auth.admin_role])?;
        if !patch.has_changes() {
            return Err(AppError::BadRequest(
                "At least one field must be provided".to_string(),
            ));
        }
        patch
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let mut tx = self.repository.begin().await?;

        let mut rental = self
            .repository
            .rentals
            .find_by_id_for_update(&mut tx, patch.lending_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Lending with id {} not found", patch.lending_id))
            })?;

        let caller_id = self.resolve_caller_id(caller).await?;
        if access::authorize(caller, &self.auth.admin_role, caller_id, rental.customer_id)
            == Access::Forbid
        {
            return Err(AppError::Authorization(
                "Customers may only update their own lendings".to_string(),
            ));
        }

        if rental.returned_on.is_some() {
            return Err(AppError::Conflict(
                "Lending has already been returned".to_string(),
            ));
        }

        if let Some(customer_id) = patch.customer_id {
            if self
                .repository
                .customers
                .find_by_id_tx(&mut tx, customer_id)
                .await?
                .is_none()
            {
                return Err(AppError::BadRequest(format!(
                    "Customer with id {} does not exist",
                    customer_id
                )));
            }
            rental.customer_id = customer_id;
        }
        if let Some(thing_id) = patch.thing_id {
            if self
                .repository
                .things
                .find_by_id_tx(&mut tx, thing_id)
                .await?
                .is_none()
            {
                return Err(AppError::BadRequest(format!(
                    "Thing with id {} does not exist",
                    thing_id
                )));
            }
            rental.thing_id = thing_id;
        }
        if let Some(returned_on) = patch.returned_on {
            rental.returned_on = Some(returned_on);
        }
        if let Some(duration_days) = patch.duration_days {
            // Anchored to the original start, never to the update time
            rental.until = rental.from + Duration::days(duration_days);
        }

        // Re-check eligibility against the final customer/thing pair
        if let Some(details) = self
            .repository
            .things
            .details_for_thing_tx(&mut tx, rental.thing_id)
            .await?
        {
            let customer = self
                .repository
                .customers
                .find_by_id_tx(&mut tx, rental.customer_id)
                .await?
                .ok_or_else(|| {
                    AppError::BadRequest(format!(
                        "Customer with id {} does not exist",
                        rental.customer_id
                    ))
                })?;
            rules::check_age_restriction(
                customer.date_of_birth,
                details.age_restriction,
                Utc::now().date_naive(),
            )
            .map_err(|v| AppError::Validation(v.to_string()))?;
        }

        self.repository.rentals.update_row(&mut tx, &rental).await?;
        tx.commit().await?;

        Ok(rental)
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

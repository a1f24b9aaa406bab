//! Repository layer for database operations

pub mod credentials;
pub mod customers;
pub mod rentals;
pub mod things;

use sqlx::{Pool, Postgres, Transaction};

use crate::error::AppResult;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub credentials: credentials::CredentialsRepository,
    pub customers: customers::CustomersRepository,
    pub things: things::ThingsRepository,
    pub rentals: rentals::RentalsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            credentials: credentials::CredentialsRepository::new(pool.clone()),
            customers: customers::CustomersRepository::new(pool.clone()),
            things: things::ThingsRepository::new(pool.clone()),
            rentals: rentals::RentalsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Begin a transaction. Used by services whose read-check-write
    /// sequences must be atomic.
    pub async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        Ok(self.pool.begin().await?)
    }
}

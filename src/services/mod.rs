//! Business logic services

pub mod access;
pub mod auth;
pub mod catalog;
pub mod customers;
pub mod rentals;
pub mod rules;

use crate::{config::AuthConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub customers: customers::CustomersService,
    pub rentals: rentals::RentalsService,
}

impl Services {
    /// Create all services with the given repository. Role names and token
    /// settings come from the injected configuration, never from ambient
    /// state.
    pub fn new(repository: Repository, auth_config: AuthConfig) -> Self {
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config.clone()),
            catalog: catalog::CatalogService::new(repository.clone(), auth_config.clone()),
            customers: customers::CustomersService::new(repository.clone(), auth_config.clone()),
            rentals: rentals::RentalsService::new(repository, auth_config),
        }
    }
}

//! Library customer model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Customer model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Customer {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    /// Email address, globally unique
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
}

/// Create customer request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCustomer {
    #[validate(length(min = 1, message = "First name must not be empty"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name must not be empty"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
}

/// Partial update of a customer. At least one field must be present.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CustomerPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

impl CustomerPatch {
    pub fn has_changes(&self) -> bool {
        self.first_name.is_some()
            || self.last_name.is_some()
            || self.email.is_some()
            || self.date_of_birth.is_some()
    }
}

/// Credential row backing the token issuer
#[derive(Debug, Clone, FromRow)]
pub struct Credential {
    pub id: i32,
    pub email: String,
    pub password_hash: String,
    pub roles: Vec<String>,
}

//! Thing (lendable item), shelf, detail and image models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// A lendable catalog item
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Thing {
    pub id: i32,
    pub short_name: String,
    pub description: String,
    /// Serial number, globally unique
    pub serial_nr: String,
    pub shelf_id: i32,
}

/// Optional extended attributes of a thing (1:1)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ThingDetails {
    pub id: i32,
    pub thing_id: i32,
    /// Minimum customer age in whole years
    pub age_restriction: i32,
}

/// A shelf holding zero or more things
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Shelf {
    pub id: i32,
    pub location: String,
}

/// Create thing request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateThing {
    #[validate(length(min = 1, message = "Short name must not be empty"))]
    pub short_name: String,
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: String,
    #[validate(length(min = 1, message = "Serial number must not be empty"))]
    pub serial_nr: String,
    pub shelf_id: i32,
    /// When present, a details row with this age restriction is attached
    #[validate(range(min = 0, max = 150, message = "Age restriction must be between 0 and 150"))]
    pub age_restriction: Option<i32>,
}

/// Partial update of a thing. At least one field must be present.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct ThingPatch {
    pub thing_id: i32,
    pub short_name: Option<String>,
    pub description: Option<String>,
    pub serial_nr: Option<String>,
    #[validate(range(min = 0, max = 150, message = "Age restriction must be between 0 and 150"))]
    pub age_restriction: Option<i32>,
}

impl ThingPatch {
    pub fn has_changes(&self) -> bool {
        self.short_name.is_some()
            || self.description.is_some()
            || self.serial_nr.is_some()
            || self.age_restriction.is_some()
    }
}

/// Create shelf request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateShelf {
    #[validate(length(min = 1, message = "Location must not be empty"))]
    pub location: String,
}

/// Create or replace the image attached to a thing's details.
/// The payload is base64-encoded; replacing deletes the prior image row.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ImageUpload {
    pub thing_id: i32,
    /// Base64-encoded binary payload
    pub data: String,
}

/// Reference to a thing's image, used by the delete endpoint
#[derive(Debug, Deserialize, ToSchema)]
pub struct ImageRef {
    pub thing_id: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_restriction_bounds_are_enforced() {
        let thing = CreateThing {
            short_name: "drill".to_string(),
            description: "Cordless drill".to_string(),
            serial_nr: "SER-1".to_string(),
            shelf_id: 1,
            age_restriction: Some(i32::MAX),
        };
        assert!(thing.validate().is_err());

        let patch = ThingPatch {
            thing_id: 1,
            age_restriction: Some(200),
            ..Default::default()
        };
        assert!(patch.validate().is_err());

        let patch = ThingPatch {
            thing_id: 1,
            age_restriction: Some(18),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());
    }
}

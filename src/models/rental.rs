//! Rental (lending) model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// A time-bounded association between a customer and a thing.
///
/// A rental is open while `returned_on` is null and overdue when it is
/// open and `until` has passed. `from <= until` holds at creation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Rental {
    pub id: i32,
    pub thing_id: i32,
    pub customer_id: i32,
    #[sqlx(rename = "rented_from")]
    #[serde(rename = "from")]
    pub from: DateTime<Utc>,
    #[sqlx(rename = "rented_until")]
    #[serde(rename = "until")]
    pub until: DateTime<Utc>,
    pub returned_on: Option<DateTime<Utc>>,
}

impl Rental {
    pub fn is_open(&self) -> bool {
        self.returned_on.is_none()
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_open() && self.until < now
    }
}

/// Create lending request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRental {
    pub customer_id: i32,
    pub thing_id: i32,
    #[validate(range(
        min = 1,
        max = 36500,
        message = "Lending duration must be between 1 and 36500 days"
    ))]
    pub duration_days: i64,
}

/// Partial update of a lending. At least one optional field must be
/// present besides the id; each present field is applied independently.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct RentalPatch {
    pub lending_id: i32,
    pub customer_id: Option<i32>,
    pub thing_id: Option<i32>,
    /// Recomputes `until` relative to the original `from`, not to now
    #[validate(range(
        min = 1,
        max = 36500,
        message = "Lending duration must be between 1 and 36500 days"
    ))]
    pub duration_days: Option<i64>,
    pub returned_on: Option<DateTime<Utc>>,
}

impl RentalPatch {
    pub fn has_changes(&self) -> bool {
        self.customer_id.is_some()
            || self.thing_id.is_some()
            || self.duration_days.is_some()
            || self.returned_on.is_some()
    }
}

/// Admin filter for listing lendings by customer or thing
#[derive(Debug, Deserialize, utoipa::IntoParams, ToSchema)]
pub struct RentalFilter {
    pub user_id: Option<i32>,
    pub thing_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn rental(returned: bool, until_offset_days: i64) -> Rental {
        let now = Utc::now();
        Rental {
            id: 1,
            thing_id: 1,
            customer_id: 1,
            from: now - Duration::days(7),
            until: now + Duration::days(until_offset_days),
            returned_on: returned.then_some(now),
        }
    }

    #[test]
    fn open_past_due_is_overdue() {
        let r = rental(false, -1);
        assert!(r.is_open());
        assert!(r.is_overdue(Utc::now()));
    }

    #[test]
    fn returned_rental_is_never_overdue() {
        let r = rental(true, -1);
        assert!(!r.is_open());
        assert!(!r.is_overdue(Utc::now()));
    }

    #[test]
    fn open_rental_within_window_is_not_overdue() {
        let r = rental(false, 3);
        assert!(!r.is_overdue(Utc::now()));
    }

    #[test]
    fn empty_patch_has_no_changes() {
        let patch = RentalPatch {
            lending_id: 5,
            ..Default::default()
        };
        assert!(!patch.has_changes());
    }

    #[test]
    fn absurd_durations_fail_validation() {
        // A duration large enough to overflow date arithmetic must be
        // rejected at the payload boundary, not reach the clock math.
        let request = CreateRental {
            customer_id: 1,
            thing_id: 1,
            duration_days: 200_000_000,
        };
        assert!(request.validate().is_err());

        let patch = RentalPatch {
            lending_id: 1,
            duration_days: Some(i64::MAX),
            ..Default::default()
        };
        assert!(patch.validate().is_err());

        let patch = RentalPatch {
            lending_id: 1,
            duration_days: Some(30),
            ..Default::default()
        };
        assert!(patch.validate().is_ok());
    }
}

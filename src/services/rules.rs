//! Business rule evaluation for lendings and customers
//!
//! Pure functions. The current date is a parameter so the rules can be
//! tested without touching the clock.

use chrono::{Months, NaiveDate};
use std::fmt;

/// Minimum whole-year age a customer must have reached, when a birth date
/// is recorded at all.
pub const MINIMUM_CUSTOMER_AGE_YEARS: i32 = 15;

/// A violated business rule, with a fixed human-readable message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleViolation {
    /// The customer is too young for an age-restricted thing
    IneligibleAge,
    /// The customer has no recorded birth date; age-restricted things are
    /// refused rather than lent unchecked
    MissingBirthDate,
    /// The customer does not meet the general minimum age
    UnderageCustomer,
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            RuleViolation::IneligibleAge => {
                "The customer is not old enough to borrow this thing"
            }
            RuleViolation::MissingBirthDate => {
                "The customer has no recorded birth date and cannot borrow age-restricted things"
            }
            RuleViolation::UnderageCustomer => {
                "The customer must be at least 15 years old"
            }
        };
        write!(f, "{}", msg)
    }
}

/// Whole-year addition; no partial-year rounding. Out-of-range inputs
/// clamp far into the future, which fails the comparison safely.
fn years_after(date: NaiveDate, years: i32) -> NaiveDate {
    if years <= 0 {
        return date;
    }
    (years as u32)
        .checked_mul(12)
        .and_then(|months| date.checked_add_months(Months::new(months)))
        .unwrap_or(NaiveDate::MAX)
}

/// Age-restriction rule for lending an age-restricted thing.
///
/// Eligible iff `date_of_birth + minimum_age_years <= today`. A missing
/// birth date is rejected: lending an age-restricted thing without any
/// evidence of age fails closed.
pub fn check_age_restriction(
    date_of_birth: Option<NaiveDate>,
    minimum_age_years: i32,
    today: NaiveDate,
) -> Result<(), RuleViolation> {
    let dob = date_of_birth.ok_or(RuleViolation::MissingBirthDate)?;
    if years_after(dob, minimum_age_years) <= today {
        Ok(())
    } else {
        Err(RuleViolation::IneligibleAge)
    }
}

/// General customer age rule, applied at customer creation and update.
/// A missing birth date passes vacuously.
pub fn check_customer_age(
    date_of_birth: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<(), RuleViolation> {
    match date_of_birth {
        None => Ok(()),
        Some(dob) => {
            if years_after(dob, MINIMUM_CUSTOMER_AGE_YEARS) <= today {
                Ok(())
            } else {
                Err(RuleViolation::UnderageCustomer)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn adult_passes_age_restriction() {
        // Born 2000-01-01, restriction 18, today 2024-06-01: 2018-01-01 <= today
        let result = check_age_restriction(Some(date(2000, 1, 1)), 18, date(2024, 6, 1));
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn too_young_for_restriction() {
        let result = check_age_restriction(Some(date(2000, 1, 1)), 25, date(2024, 6, 1));
        assert_eq!(result, Err(RuleViolation::IneligibleAge));
    }

    #[test]
    fn exact_birthday_is_eligible() {
        let result = check_age_restriction(Some(date(2006, 6, 1)), 18, date(2024, 6, 1));
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn day_before_birthday_is_not_eligible() {
        let result = check_age_restriction(Some(date(2006, 6, 2)), 18, date(2024, 6, 1));
        assert_eq!(result, Err(RuleViolation::IneligibleAge));
    }

    #[test]
    fn missing_birth_date_fails_closed() {
        let result = check_age_restriction(None, 18, date(2024, 6, 1));
        assert_eq!(result, Err(RuleViolation::MissingBirthDate));
    }

    #[test]
    fn unrestricted_zero_age_always_passes_with_birth_date() {
        let result = check_age_restriction(Some(date(2024, 1, 1)), 0, date(2024, 6, 1));
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn customer_of_fifteen_is_accepted() {
        let result = check_customer_age(Some(date(2009, 6, 1)), date(2024, 6, 1));
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn customer_under_fifteen_is_rejected() {
        let result = check_customer_age(Some(date(2010, 1, 1)), date(2024, 6, 1));
        assert_eq!(result, Err(RuleViolation::UnderageCustomer));
    }

    #[test]
    fn customer_without_birth_date_passes() {
        let result = check_customer_age(None, date(2024, 6, 1));
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn extreme_restriction_clamps_instead_of_overflowing() {
        // A month count past u32::MAX must clamp to ineligible, not panic
        let result = check_age_restriction(Some(date(2000, 1, 1)), i32::MAX, date(2024, 6, 1));
        assert_eq!(result, Err(RuleViolation::IneligibleAge));
    }

    #[test]
    fn negative_restriction_always_passes() {
        let result = check_age_restriction(Some(date(2020, 1, 1)), -5, date(2024, 6, 1));
        assert_eq!(result, Ok(()));
    }

    #[test]
    fn leap_day_birth_date_is_handled() {
        // 2008-02-29 + 16 years clamps to 2024-02-29 (leap year again)
        let result = check_age_restriction(Some(date(2008, 2, 29)), 16, date(2024, 2, 29));
        assert_eq!(result, Ok(()));
        let result = check_age_restriction(Some(date(2008, 2, 29)), 16, date(2024, 2, 28));
        assert_eq!(result, Err(RuleViolation::IneligibleAge));
    }
}

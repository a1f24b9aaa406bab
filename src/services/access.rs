//! Access-control evaluation
//!
//! Role and identity are derived from caller-presented claims; signature,
//! issuer, audience and expiry are validated before anything here runs.

use std::collections::HashSet;

use crate::{error::AppError, models::claims::Claims};

/// The authenticated caller as seen by services: a role set and an
/// optional credential email. Services never see raw tokens.
#[derive(Debug, Clone)]
pub struct Caller {
    pub roles: HashSet<String>,
    pub email: Option<String>,
}

impl Caller {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn require_role(&self, role: &str) -> Result<(), AppError> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!("Role '{}' required", role)))
        }
    }

    /// Require any of the given roles; used for user-level endpoints where
    /// the admin role also qualifies.
    pub fn require_any_role(&self, roles: &[&str]) -> Result<(), AppError> {
        if roles.iter().any(|r| self.has_role(r)) {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Insufficient rights for this operation".to_string(),
            ))
        }
    }
}

impl From<&Claims> for Caller {
    fn from(claims: &Claims) -> Self {
        Self {
            roles: claims.roles.iter().cloned().collect(),
            email: Some(claims.sub.clone()),
        }
    }
}

/// Outcome of an ownership authorization check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Forbid,
}

/// Admin callers are always allowed. Everyone else is allowed only when
/// their resolved customer id equals the resource owner; an unresolved
/// caller is treated the same as a mismatched owner and forbidden.
pub fn authorize(
    caller: &Caller,
    admin_role: &str,
    caller_customer_id: Option<i32>,
    resource_owner_id: i32,
) -> Access {
    if caller.has_role(admin_role) {
        return Access::Allow;
    }
    match caller_customer_id {
        Some(id) if id == resource_owner_id => Access::Allow,
        _ => Access::Forbid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller(roles: &[&str]) -> Caller {
        Caller {
            roles: roles.iter().map(|r| r.to_string()).collect(),
            email: Some("someone@example.org".to_string()),
        }
    }

    #[test]
    fn admin_is_always_allowed() {
        let c = caller(&["admin"]);
        assert_eq!(authorize(&c, "admin", None, 7), Access::Allow);
        assert_eq!(authorize(&c, "admin", Some(3), 7), Access::Allow);
    }

    #[test]
    fn owner_is_allowed() {
        let c = caller(&["user"]);
        assert_eq!(authorize(&c, "admin", Some(7), 7), Access::Allow);
    }

    #[test]
    fn non_owner_is_forbidden() {
        let c = caller(&["user"]);
        assert_eq!(authorize(&c, "admin", Some(3), 7), Access::Forbid);
    }

    #[test]
    fn unresolved_caller_is_forbidden() {
        let c = caller(&["user"]);
        assert_eq!(authorize(&c, "admin", None, 7), Access::Forbid);
    }

    #[test]
    fn role_requirements() {
        let c = caller(&["user"]);
        assert!(c.require_role("user").is_ok());
        assert!(c.require_role("admin").is_err());
        assert!(c.require_any_role(&["user", "admin"]).is_ok());
        assert!(c.require_any_role(&["admin"]).is_err());
    }
}

//! Token issuance and credential management

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{NaiveDate, Utc};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{claims::Claims, customer::CreateCustomer, customer::Customer},
    repository::Repository,
    services::{access::Caller, rules},
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Verify credentials and mint a signed claims token
    pub async fn login(&self, email: &str, password: &str) -> AppResult<String> {
        let credential = self
            .repository
            .credentials
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !Self::verify_password(&credential.password_hash, password)? {
            return Err(AppError::Authentication(
                "Invalid email or password".to_string(),
            ));
        }

        self.issue_token(&credential.email, &credential.roles)
    }

    /// Self-registration: creates a credential carrying the user role and
    /// the linked customer record. Both rows share one transaction; a
    /// failing credential insert (say a duplicate-email race past the
    /// pre-check) rolls the customer row back with it.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
        date_of_birth: Option<NaiveDate>,
    ) -> AppResult<Customer> {
        rules::check_customer_age(date_of_birth, Utc::now().date_naive())
            .map_err(|v| AppError::Validation(v.to_string()))?;

        if self
            .repository
            .credentials
            .find_by_email(email)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "A credential with this email already exists".to_string(),
            ));
        }

        let password_hash = Self::hash_password(password)?;
        let mut tx = self.repository.begin().await?;

        let customer = self
            .repository
            .customers
            .create_tx(
                &mut tx,
                &CreateCustomer {
                    first_name: first_name.to_string(),
                    last_name: last_name.to_string(),
                    email: email.to_string(),
                    date_of_birth,
                },
            )
            .await?;
        self.repository
            .credentials
            .create_tx(
                &mut tx,
                email,
                &password_hash,
                &[self.config.user_role.clone()],
            )
            .await?;

        tx.commit().await?;

        tracing::info!("Registered customer {} ({})", customer.id, email);
        Ok(customer)
    }

    /// Change the password of the calling credential
    pub async fn change_password(
        &self,
        email: &str,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let credential = self
            .repository
            .credentials
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !Self::verify_password(&credential.password_hash, current_password)? {
            return Err(AppError::Authentication(
                "Invalid email or password".to_string(),
            ));
        }

        let password_hash = Self::hash_password(new_password)?;
        self.repository
            .credentials
            .update_password(email, &password_hash)
            .await
    }

    /// Grant the admin role to an existing credential
    pub async fn grant_admin(&self, email: &str, caller: &Caller) -> AppResult<()> {
        caller.require_role(&self.config.admin_role)?;

        self.repository
            .credentials
            .add_role(email, &self.config.admin_role)
            .await?;
        tracing::info!("Granted admin role to {}", email);
        Ok(())
    }

    /// Revoke the admin role. The last remaining admin keeps it; revoking
    /// it would leave the system without any admin at all.
    pub async fn revoke_admin(&self, email: &str, caller: &Caller) -> AppResult<()> {
        caller.require_role(&self.config.admin_role)?;

        let credential = self
            .repository
            .credentials
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Credential for {} not found", email)))?;

        if credential.roles.iter().any(|r| r == &self.config.admin_role)
            && self
                .repository
                .credentials
                .count_with_role(&self.config.admin_role)
                .await?
                <= 1
        {
            return Err(AppError::Conflict(
                "Cannot revoke the only remaining admin".to_string(),
            ));
        }

        self.repository
            .credentials
            .remove_role(email, &self.config.admin_role)
            .await?;
        tracing::info!("Revoked admin role from {}", email);
        Ok(())
    }

    /// Delete a credential. The linked customer record, if any, stays; only
    /// the ability to log in is removed.
    pub async fn delete_credential(&self, email: &str, caller: &Caller) -> AppResult<()> {
        caller.require_role(&self.config.admin_role)?;

        self.repository.credentials.delete(email).await?;
        tracing::info!("Deleted credential for {}", email);
        Ok(())
    }

    /// Set a credential's password without knowing the current one
    pub async fn set_password(
        &self,
        email: &str,
        new_password: &str,
        caller: &Caller,
    ) -> AppResult<()> {
        caller.require_role(&self.config.admin_role)?;

        let password_hash = Self::hash_password(new_password)?;
        self.repository
            .credentials
            .update_password(email, &password_hash)
            .await
    }

    /// Seed an admin credential from configuration when none exists yet
    pub async fn bootstrap_admin(&self) -> AppResult<()> {
        let (Some(email), Some(password)) = (
            self.config.bootstrap_admin_email.as_deref(),
            self.config.bootstrap_admin_password.as_deref(),
        ) else {
            return Ok(());
        };

        if self
            .repository
            .credentials
            .any_with_role(&self.config.admin_role)
            .await?
        {
            return Ok(());
        }

        let password_hash = Self::hash_password(password)?;
        self.repository
            .credentials
            .create(
                email,
                &password_hash,
                &[
                    self.config.admin_role.clone(),
                    self.config.user_role.clone(),
                ],
            )
            .await?;

        tracing::info!("Bootstrapped admin credential for {}", email);
        Ok(())
    }

    fn issue_token(&self, email: &str, roles: &[String]) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_minutes as i64 * 60);

        let claims = Claims {
            sub: email.to_string(),
            roles: roles.to_vec(),
            iss: self.config.jwt_issuer.clone(),
            aud: self.config.jwt_audience.clone(),
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    fn hash_password(password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
        let parsed = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

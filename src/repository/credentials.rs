//! Credentials repository backing the token issuer

use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::customer::Credential,
};

#[derive(Clone)]
pub struct CredentialsRepository {
    pool: Pool<Postgres>,
}

impl CredentialsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<Credential>> {
        let credential = sqlx::query_as::<_, Credential>(
            "SELECT id, email, password_hash, roles FROM credentials WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(credential)
    }

    pub async fn create(
        &self,
        email: &str,
        password_hash: &str,
        roles: &[String],
    ) -> AppResult<Credential> {
        sqlx::query_as::<_, Credential>(
            r#"
            INSERT INTO credentials (email, password_hash, roles)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, roles
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(roles)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, "A credential with this email already exists"))
    }

    /// Transaction-scoped insert, paired with the customer insert during
    /// registration.
    pub async fn create_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        email: &str,
        password_hash: &str,
        roles: &[String],
    ) -> AppResult<Credential> {
        sqlx::query_as::<_, Credential>(
            r#"
            INSERT INTO credentials (email, password_hash, roles)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, roles
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(roles)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::from_db(e, "A credential with this email already exists"))
    }

    pub async fn update_password(&self, email: &str, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE credentials SET password_hash = $1 WHERE email = $2")
            .bind(password_hash)
            .bind(email)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Credential for {} not found",
                email
            )));
        }
        Ok(())
    }

    /// Add a role to a credential; adding a role it already carries is a
    /// no-op.
    pub async fn add_role(&self, email: &str, role: &str) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE credentials
            SET roles = array_append(roles, $2)
            WHERE email = $1 AND NOT ($2 = ANY(roles))
            "#,
        )
        .bind(email)
        .bind(role)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 && self.find_by_email(email).await?.is_none() {
            return Err(AppError::NotFound(format!(
                "Credential for {} not found",
                email
            )));
        }
        Ok(())
    }

    pub async fn remove_role(&self, email: &str, role: &str) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE credentials SET roles = array_remove(roles, $2) WHERE email = $1",
        )
        .bind(email)
        .bind(role)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Credential for {} not found",
                email
            )));
        }
        Ok(())
    }

    pub async fn delete(&self, email: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM credentials WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Credential for {} not found",
                email
            )));
        }
        Ok(())
    }

    pub async fn any_with_role(&self, role: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM credentials WHERE $1 = ANY(roles))")
                .bind(role)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    pub async fn count_with_role(&self, role: &str) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM credentials WHERE $1 = ANY(roles)")
                .bind(role)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}

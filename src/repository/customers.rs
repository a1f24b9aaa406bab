//! Customers repository for database operations

use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::customer::{CreateCustomer, Customer, CustomerPatch},
};

#[derive(Clone)]
pub struct CustomersRepository {
    pool: Pool<Postgres>,
}

impl CustomersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> AppResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>("SELECT * FROM customers ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(customers)
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Customer> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Customer with id {} not found", id)))
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }

    /// Transaction-scoped lookup, used while a lending create/update holds
    /// a transaction open.
    pub async fn find_by_id_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i32,
    ) -> AppResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(customer)
    }

    pub async fn create(&self, customer: &CreateCustomer) -> AppResult<Customer> {
        sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (first_name, last_name, email, date_of_birth)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(&customer.email)
        .bind(customer.date_of_birth)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, "A customer with this email already exists"))
    }

    /// Transaction-scoped insert, used by registration so the customer and
    /// credential rows commit or roll back together.
    pub async fn create_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer: &CreateCustomer,
    ) -> AppResult<Customer> {
        sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (first_name, last_name, email, date_of_birth)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(&customer.email)
        .bind(customer.date_of_birth)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| AppError::from_db(e, "A customer with this email already exists"))
    }

    pub async fn update(&self, id: i32, patch: &CustomerPatch) -> AppResult<Customer> {
        sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                date_of_birth = COALESCE($5, date_of_birth)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.first_name)
        .bind(&patch.last_name)
        .bind(&patch.email)
        .bind(patch.date_of_birth)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, "A customer with this email already exists"))?
        .ok_or_else(|| AppError::NotFound(format!("Customer with id {} not found", id)))
    }

    pub async fn has_rentals(&self, id: i32) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM rentals WHERE customer_id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Customer with id {} not found",
                id
            )));
        }
        Ok(())
    }
}

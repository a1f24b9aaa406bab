//! Rentals (lendings) repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Transaction};

use crate::{error::AppResult, models::rental::Rental};

#[derive(Clone)]
pub struct RentalsRepository {
    pool: Pool<Postgres>,
}

impl RentalsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> AppResult<Vec<Rental>> {
        let rentals = sqlx::query_as::<_, Rental>("SELECT * FROM rentals ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rentals)
    }

    pub async fn list_by_customer(&self, customer_id: i32) -> AppResult<Vec<Rental>> {
        let rentals =
            sqlx::query_as::<_, Rental>("SELECT * FROM rentals WHERE customer_id = $1 ORDER BY id")
                .bind(customer_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rentals)
    }

    pub async fn list_by_thing(&self, thing_id: i32) -> AppResult<Vec<Rental>> {
        let rentals =
            sqlx::query_as::<_, Rental>("SELECT * FROM rentals WHERE thing_id = $1 ORDER BY id")
                .bind(thing_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rentals)
    }

    /// Overdue lendings: open and past due, optionally scoped to a customer
    pub async fn list_overdue(&self, customer_id: Option<i32>) -> AppResult<Vec<Rental>> {
        let rentals = sqlx::query_as::<_, Rental>(
            r#"
            SELECT * FROM rentals
            WHERE rented_until < NOW()
              AND returned_on IS NULL
              AND ($1::int IS NULL OR customer_id = $1)
            ORDER BY rented_until
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rentals)
    }

    /// Lendings for things with the given short name, optionally scoped to
    /// a customer
    pub async fn list_by_thing_short_name(
        &self,
        short_name: &str,
        customer_id: Option<i32>,
    ) -> AppResult<Vec<Rental>> {
        let rentals = sqlx::query_as::<_, Rental>(
            r#"
            SELECT r.* FROM rentals r
            JOIN things t ON r.thing_id = t.id
            WHERE t.short_name = $1
              AND ($2::int IS NULL OR r.customer_id = $2)
            ORDER BY r.id
            "#,
        )
        .bind(short_name)
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rentals)
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<Rental>> {
        let rental = sqlx::query_as::<_, Rental>("SELECT * FROM rentals WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rental)
    }

    /// Fetch a rental with a row lock so a concurrent update cannot race
    /// the read-check-write sequence.
    pub async fn find_by_id_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i32,
    ) -> AppResult<Option<Rental>> {
        let rental = sqlx::query_as::<_, Rental>("SELECT * FROM rentals WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(rental)
    }

    pub async fn insert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        customer_id: i32,
        thing_id: i32,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> AppResult<Rental> {
        let rental = sqlx::query_as::<_, Rental>(
            r#"
            INSERT INTO rentals (customer_id, thing_id, rented_from, rented_until)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(customer_id)
        .bind(thing_id)
        .bind(from)
        .bind(until)
        .fetch_one(&mut **tx)
        .await?;
        Ok(rental)
    }

    pub async fn update_row(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        rental: &Rental,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE rentals SET
                customer_id = $2,
                thing_id = $3,
                rented_from = $4,
                rented_until = $5,
                returned_on = $6
            WHERE id = $1
            "#,
        )
        .bind(rental.id)
        .bind(rental.customer_id)
        .bind(rental.thing_id)
        .bind(rental.from)
        .bind(rental.until)
        .bind(rental.returned_on)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

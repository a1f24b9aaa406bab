//! Things repository: catalog items, shelves, details and images

use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::thing::{CreateThing, Shelf, Thing, ThingDetails, ThingPatch},
};

#[derive(Clone)]
pub struct ThingsRepository {
    pool: Pool<Postgres>,
}

impl ThingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> AppResult<Vec<Thing>> {
        let things = sqlx::query_as::<_, Thing>("SELECT * FROM things ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(things)
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<Thing>> {
        let thing = sqlx::query_as::<_, Thing>("SELECT * FROM things WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(thing)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Thing> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Thing with id {} not found", id)))
    }

    pub async fn list_by_short_name(&self, short_name: &str) -> AppResult<Vec<Thing>> {
        let things = sqlx::query_as::<_, Thing>(
            "SELECT * FROM things WHERE short_name = $1 ORDER BY id",
        )
        .bind(short_name)
        .fetch_all(&self.pool)
        .await?;
        Ok(things)
    }

    pub async fn find_by_id_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i32,
    ) -> AppResult<Option<Thing>> {
        let thing = sqlx::query_as::<_, Thing>("SELECT * FROM things WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(thing)
    }

    pub async fn details_for_thing(&self, thing_id: i32) -> AppResult<Option<ThingDetails>> {
        let details =
            sqlx::query_as::<_, ThingDetails>("SELECT * FROM thing_details WHERE thing_id = $1")
                .bind(thing_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(details)
    }

    pub async fn details_for_thing_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        thing_id: i32,
    ) -> AppResult<Option<ThingDetails>> {
        let details =
            sqlx::query_as::<_, ThingDetails>("SELECT * FROM thing_details WHERE thing_id = $1")
                .bind(thing_id)
                .fetch_optional(&mut **tx)
                .await?;
        Ok(details)
    }

    /// Create a thing, attaching a details row when an age restriction is
    /// given. Both inserts commit or fail together.
    pub async fn create(&self, thing: &CreateThing) -> AppResult<i32> {
        let mut tx = self.pool.begin().await?;

        let thing_id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO things (short_name, description, serial_nr, shelf_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&thing.short_name)
        .bind(&thing.description)
        .bind(&thing.serial_nr)
        .bind(thing.shelf_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_db(e, "A thing with this serial number already exists"))?;

        if let Some(age_restriction) = thing.age_restriction {
            sqlx::query("INSERT INTO thing_details (thing_id, age_restriction) VALUES ($1, $2)")
                .bind(thing_id)
                .bind(age_restriction)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(thing_id)
    }

    /// Apply a partial update. Setting an age restriction on a thing
    /// without a details row creates one.
    pub async fn update(&self, patch: &ThingPatch) -> AppResult<Thing> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Thing>(
            r#"
            UPDATE things SET
                short_name = COALESCE($2, short_name),
                description = COALESCE($3, description),
                serial_nr = COALESCE($4, serial_nr)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(patch.thing_id)
        .bind(&patch.short_name)
        .bind(&patch.description)
        .bind(&patch.serial_nr)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::from_db(e, "A thing with this serial number already exists"))?
        .ok_or_else(|| AppError::NotFound(format!("Thing with id {} not found", patch.thing_id)))?;

        if let Some(age_restriction) = patch.age_restriction {
            sqlx::query(
                r#"
                INSERT INTO thing_details (thing_id, age_restriction)
                VALUES ($1, $2)
                ON CONFLICT (thing_id) DO UPDATE SET age_restriction = EXCLUDED.age_restriction
                "#,
            )
            .bind(patch.thing_id)
            .bind(age_restriction)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a thing together with its rentals, details and image in one
    /// transaction. Partial deletion is never observable.
    pub async fn delete_cascade(&self, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM things WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;
        if !exists {
            return Err(AppError::NotFound(format!("Thing with id {} not found", id)));
        }

        sqlx::query("DELETE FROM rentals WHERE thing_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query(
            r#"
            DELETE FROM images
            WHERE thing_details_id IN (SELECT id FROM thing_details WHERE thing_id = $1)
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM thing_details WHERE thing_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM things WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn get_image(&self, thing_id: i32) -> AppResult<Option<Vec<u8>>> {
        let data: Option<Vec<u8>> = sqlx::query_scalar(
            r#"
            SELECT i.data
            FROM images i
            JOIN thing_details td ON i.thing_details_id = td.id
            WHERE td.thing_id = $1
            "#,
        )
        .bind(thing_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(data)
    }

    /// Replace the image attached to a details row. The prior image row is
    /// deleted rather than mutated.
    pub async fn replace_image(&self, thing_details_id: i32, data: &[u8]) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM images WHERE thing_details_id = $1")
            .bind(thing_details_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO images (thing_details_id, data) VALUES ($1, $2)")
            .bind(thing_details_id)
            .bind(data)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn delete_image(&self, thing_details_id: i32) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM images WHERE thing_details_id = $1")
            .bind(thing_details_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn find_shelf(&self, id: i32) -> AppResult<Option<Shelf>> {
        let shelf = sqlx::query_as::<_, Shelf>("SELECT * FROM shelves WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(shelf)
    }

    pub async fn create_shelf(&self, location: &str) -> AppResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO shelves (location) VALUES ($1) RETURNING id",
        )
        .bind(location)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }
}

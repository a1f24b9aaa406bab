//! Catalog management service: things, shelves, details and images

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::thing::{CreateShelf, CreateThing, Thing, ThingPatch},
    repository::Repository,
    services::access::Caller,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    auth: AuthConfig,
}

impl CatalogService {
    pub fn new(repository: Repository, auth: AuthConfig) -> Self {
        Self { repository, auth }
    }

    pub async fn list_things(&self, caller: &Caller) -> AppResult<Vec<Thing>> {
        caller.require_role(&self.auth.admin_role)?;

        let things = self.repository.things.list_all().await?;
        if things.is_empty() {
            return Err(AppError::NotFound("No things found".to_string()));
        }
        Ok(things)
    }

    pub async fn get_thing(&self, id: i32, caller: &Caller) -> AppResult<Thing> {
        caller.require_role(&self.auth.admin_role)?;
        self.repository.things.get_by_id(id).await
    }

    pub async fn get_things_by_short_name(
        &self,
        short_name: &str,
        caller: &Caller,
    ) -> AppResult<Vec<Thing>> {
        caller.require_role(&self.auth.admin_role)?;
        if short_name.is_empty() {
            return Err(AppError::BadRequest("Short name is empty".to_string()));
        }

        let things = self.repository.things.list_by_short_name(short_name).await?;
        if things.is_empty() {
            return Err(AppError::NotFound(format!(
                "No things with short name {} found",
                short_name
            )));
        }
        Ok(things)
    }

    pub async fn create_thing(&self, thing: CreateThing, caller: &Caller) -> AppResult<Thing> {
        caller.require_role(&self.auth.admin_role)?;
        thing
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.repository.things.find_shelf(thing.shelf_id).await?.is_none() {
            return Err(AppError::BadRequest(format!(
                "Shelf with id {} does not exist",
                thing.shelf_id
            )));
        }

        let id = self.repository.things.create(&thing).await?;
        self.repository.things.get_by_id(id).await
    }

    pub async fn update_thing(&self, patch: ThingPatch, caller: &Caller) -> AppResult<Thing> {
        caller.require_role(&self.auth.admin_role)?;
        if !patch.has_changes() {
            return Err(AppError::BadRequest(
                "At least one field must be provided".to_string(),
            ));
        }
        patch
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.repository.things.update(&patch).await
    }

    /// Deletes the thing and everything hanging off it (lendings, details,
    /// image) atomically.
    pub async fn delete_thing(&self, id: i32, caller: &Caller) -> AppResult<()> {
        caller.require_role(&self.auth.admin_role)?;
        self.repository.things.delete_cascade(id).await
    }

    pub async fn create_shelf(&self, shelf: CreateShelf, caller: &Caller) -> AppResult<i32> {
        caller.require_role(&self.auth.admin_role)?;
        shelf
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        self.repository.things.create_shelf(&shelf.location).await
    }

    pub async fn get_image(&self, thing_id: i32, caller: &Caller) -> AppResult<Vec<u8>> {
        caller.require_any_role(&[&self.auth.user_role, &self.auth.admin_role])?;

        self.repository
            .things
            .get_image(thing_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No image for thing {}", thing_id)))
    }

    /// Attach or replace the image of a thing. The thing must already
    /// carry a details row; the prior image row, if any, is deleted.
    pub async fn create_image(
        &self,
        thing_id: i32,
        data_base64: &str,
        caller: &Caller,
    ) -> AppResult<()> {
        caller.require_role(&self.auth.admin_role)?;

        let data = BASE64
            .decode(data_base64)
            .map_err(|_| AppError::BadRequest("Image payload is not valid base64".to_string()))?;
        if data.is_empty() {
            return Err(AppError::BadRequest("Image payload is empty".to_string()));
        }

        self.repository.things.get_by_id(thing_id).await?;
        let details = self
            .repository
            .things
            .details_for_thing(thing_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Thing {} has no details to attach an image to", thing_id))
            })?;

        self.repository.things.replace_image(details.id, &data).await
    }

    pub async fn delete_image(&self, thing_id: i32, caller: &Caller) -> AppResult<()> {
        caller.require_role(&self.auth.admin_role)?;

        let details = self
            .repository
            .things
            .details_for_thing(thing_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No image for thing {}", thing_id)))?;

        if !self.repository.things.delete_image(details.id).await? {
            return Err(AppError::NotFound(format!("No image for thing {}", thing_id)));
        }
        Ok(())
    }
}

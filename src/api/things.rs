//! Catalog endpoints: things, shelves and images

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::thing::{CreateShelf, CreateThing, ImageRef, ImageUpload, Thing, ThingPatch},
};

use super::AuthenticatedUser;

/// Response for create endpoints that only return the new id
#[derive(Serialize, ToSchema)]
pub struct CreatedResponse {
    pub id: i32,
}

/// List all things
#[utoipa::path(
    get,
    path = "/things/all",
    tag = "things",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of things", body = Vec<Thing>),
        (status = 404, description = "No things exist")
    )
)]
pub async fn list_things(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> AppResult<Json<Vec<Thing>>> {
    let things = state.services.catalog.list_things(&caller).await?;
    Ok(Json(things))
}

/// Get a thing by ID
#[utoipa::path(
    get,
    path = "/things/{id}",
    tag = "things",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Thing ID")),
    responses(
        (status = 200, description = "Thing details", body = Thing),
        (status = 404, description = "Thing not found")
    )
)]
pub async fn get_thing(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Thing>> {
    let thing = state.services.catalog.get_thing(id, &caller).await?;
    Ok(Json(thing))
}

/// Get things by short name
#[utoipa::path(
    get,
    path = "/things/short-name/{short_name}",
    tag = "things",
    security(("bearer_auth" = [])),
    params(("short_name" = String, Path, description = "Thing short name")),
    responses(
        (status = 200, description = "Matching things", body = Vec<Thing>),
        (status = 404, description = "No matching things")
    )
)]
pub async fn get_things_by_short_name(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(short_name): Path<String>,
) -> AppResult<Json<Vec<Thing>>> {
    let things = state
        .services
        .catalog
        .get_things_by_short_name(&short_name, &caller)
        .await?;
    Ok(Json(things))
}

/// Create a new thing on a shelf
#[utoipa::path(
    post,
    path = "/things",
    tag = "things",
    security(("bearer_auth" = [])),
    request_body = CreateThing,
    responses(
        (status = 201, description = "Thing created", body = Thing),
        (status = 400, description = "Invalid input or unknown shelf"),
        (status = 409, description = "Serial number already exists")
    )
)]
pub async fn create_thing(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Json(thing): Json<CreateThing>,
) -> AppResult<(StatusCode, Json<Thing>)> {
    let created = state.services.catalog.create_thing(thing, &caller).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Partially update a thing
#[utoipa::path(
    patch,
    path = "/things",
    tag = "things",
    security(("bearer_auth" = [])),
    request_body = ThingPatch,
    responses(
        (status = 200, description = "Thing updated", body = Thing),
        (status = 400, description = "No fields provided"),
        (status = 404, description = "Thing not found")
    )
)]
pub async fn update_thing(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Json(patch): Json<ThingPatch>,
) -> AppResult<Json<Thing>> {
    let updated = state.services.catalog.update_thing(patch, &caller).await?;
    Ok(Json(updated))
}

/// Delete a thing, cascading its lendings, details and image
#[utoipa::path(
    delete,
    path = "/things/{id}",
    tag = "things",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Thing ID")),
    responses(
        (status = 204, description = "Thing deleted"),
        (status = 404, description = "Thing not found")
    )
)]
pub async fn delete_thing(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.catalog.delete_thing(id, &caller).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Create a shelf
#[utoipa::path(
    post,
    path = "/shelves",
    tag = "things",
    security(("bearer_auth" = [])),
    request_body = CreateShelf,
    responses(
        (status = 201, description = "Shelf created", body = CreatedResponse)
    )
)]
pub async fn create_shelf(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Json(shelf): Json<CreateShelf>,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    let id = state.services.catalog.create_shelf(shelf, &caller).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// Get the image bytes attached to a thing
#[utoipa::path(
    get,
    path = "/things/image/{thing_id}",
    tag = "things",
    security(("bearer_auth" = [])),
    params(("thing_id" = i32, Path, description = "Thing ID")),
    responses(
        (status = 200, description = "Image bytes", content_type = "application/octet-stream"),
        (status = 404, description = "No image for this thing")
    )
)]
pub async fn get_image(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(thing_id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    let data = state.services.catalog.get_image(thing_id, &caller).await?;
    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], data))
}

/// Attach or replace the image of a thing
#[utoipa::path(
    post,
    path = "/things/image",
    tag = "things",
    security(("bearer_auth" = [])),
    request_body = ImageUpload,
    responses(
        (status = 201, description = "Image stored"),
        (status = 400, description = "Payload is not valid base64"),
        (status = 404, description = "Thing has no details row")
    )
)]
pub async fn create_image(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Json(upload): Json<ImageUpload>,
) -> AppResult<StatusCode> {
    state
        .services
        .catalog
        .create_image(upload.thing_id, &upload.data, &caller)
        .await?;
    Ok(StatusCode::CREATED)
}

/// Delete the image of a thing
#[utoipa::path(
    delete,
    path = "/things/image",
    tag = "things",
    security(("bearer_auth" = [])),
    request_body = ImageRef,
    responses(
        (status = 204, description = "Image deleted"),
        (status = 404, description = "No image for this thing")
    )
)]
pub async fn delete_image(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Json(image): Json<ImageRef>,
) -> AppResult<StatusCode> {
    state
        .services
        .catalog
        .delete_image(image.thing_id, &caller)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

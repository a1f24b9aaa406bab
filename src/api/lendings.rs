//! Lending management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::{AppError, AppResult},
    models::rental::{CreateRental, Rental, RentalFilter, RentalPatch},
};

use super::AuthenticatedUser;

/// List lendings, scoped to the caller unless admin
#[utoipa::path(
    get,
    path = "/lendings/all",
    tag = "lendings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of lendings", body = Vec<Rental>),
        (status = 404, description = "No lendings in scope")
    )
)]
pub async fn list_lendings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> AppResult<Json<Vec<Rental>>> {
    let rentals = state.services.rentals.list(&caller).await?;
    Ok(Json(rentals))
}

/// Get a lending by ID (owner or admin)
#[utoipa::path(
    get,
    path = "/lendings/{id}",
    tag = "lendings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Lending ID")),
    responses(
        (status = 200, description = "Lending details", body = Rental),
        (status = 403, description = "Lending belongs to another customer"),
        (status = 404, description = "Lending not found")
    )
)]
pub async fn get_lending(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Rental>> {
    let rental = state.services.rentals.get_by_id(id, &caller).await?;
    Ok(Json(rental))
}

/// List overdue lendings in the caller's scope
#[utoipa::path(
    get,
    path = "/lendings/overdue",
    tag = "lendings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Overdue lendings", body = Vec<Rental>),
        (status = 404, description = "No overdue lendings")
    )
)]
pub async fn list_overdue(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> AppResult<Json<Vec<Rental>>> {
    let rentals = state.services.rentals.list_overdue(None, &caller).await?;
    Ok(Json(rentals))
}

/// List overdue lendings of one customer
#[utoipa::path(
    get,
    path = "/lendings/overdue/{user_id}",
    tag = "lendings",
    security(("bearer_auth" = [])),
    params(("user_id" = i32, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Overdue lendings", body = Vec<Rental>),
        (status = 403, description = "Another customer's overdue list"),
        (status = 404, description = "No overdue lendings")
    )
)]
pub async fn list_overdue_for_customer(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<Rental>>> {
    let rentals = state
        .services
        .rentals
        .list_overdue(Some(user_id), &caller)
        .await?;
    Ok(Json(rentals))
}

/// Admin listing filtered by customer or thing
#[utoipa::path(
    get,
    path = "/lendings",
    tag = "lendings",
    security(("bearer_auth" = [])),
    params(RentalFilter),
    responses(
        (status = 200, description = "Matching lendings", body = Vec<Rental>),
        (status = 400, description = "Neither user_id nor thing_id given"),
        (status = 404, description = "No matching lendings")
    )
)]
pub async fn list_lendings_filtered(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Query(filter): Query<RentalFilter>,
) -> AppResult<Json<Vec<Rental>>> {
    let rentals = match (filter.user_id, filter.thing_id) {
        (Some(user_id), _) => {
            state
                .services
                .rentals
                .list_by_customer(user_id, &caller)
                .await?
        }
        (None, Some(thing_id)) => {
            state
                .services
                .rentals
                .list_by_thing(thing_id, &caller)
                .await?
        }
        (None, None) => {
            return Err(AppError::BadRequest(
                "Either user_id or thing_id must be provided".to_string(),
            ))
        }
    };
    Ok(Json(rentals))
}

/// List lendings for things with a given short name
#[utoipa::path(
    get,
    path = "/lendings/thing/{short_name}",
    tag = "lendings",
    security(("bearer_auth" = [])),
    params(("short_name" = String, Path, description = "Thing short name")),
    responses(
        (status = 200, description = "Matching lendings", body = Vec<Rental>),
        (status = 404, description = "No matching lendings")
    )
)]
pub async fn list_lendings_by_thing_short_name(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(short_name): Path<String>,
) -> AppResult<Json<Vec<Rental>>> {
    let rentals = state
        .services
        .rentals
        .list_by_thing_short_name(&short_name, &caller)
        .await?;
    Ok(Json(rentals))
}

/// Create a new lending
#[utoipa::path(
    post,
    path = "/lendings",
    tag = "lendings",
    security(("bearer_auth" = [])),
    request_body = CreateRental,
    responses(
        (status = 201, description = "Lending created", body = Rental),
        (status = 400, description = "Invalid input, unknown reference or age restriction"),
        (status = 403, description = "Lending for another customer")
    )
)]
pub async fn create_lending(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Json(request): Json<CreateRental>,
) -> AppResult<(StatusCode, Json<Rental>)> {
    let rental = state.services.rentals.create(request, &caller).await?;
    Ok((StatusCode::CREATED, Json(rental)))
}

/// Partially update a lending
#[utoipa::path(
    put,
    path = "/lendings",
    tag = "lendings",
    security(("bearer_auth" = [])),
    request_body = RentalPatch,
    responses(
        (status = 200, description = "Lending updated", body = Rental),
        (status = 400, description = "No fields provided, unknown reference or age restriction"),
        (status = 403, description = "Another customer's lending"),
        (status = 404, description = "Lending not found"),
        (status = 409, description = "Lending already returned")
    )
)]
pub async fn update_lending(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Json(patch): Json<RentalPatch>,
) -> AppResult<Json<Rental>> {
    let rental = state.services.rentals.update(patch, &caller).await?;
    Ok(Json(rental))
}

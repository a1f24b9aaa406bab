//! Customer management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::customer::{CreateCustomer, Customer, CustomerPatch},
};

use super::AuthenticatedUser;

/// List all customers
#[utoipa::path(
    get,
    path = "/customers/all",
    tag = "customers",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "List of customers", body = Vec<Customer>),
        (status = 404, description = "No customers exist")
    )
)]
pub async fn list_customers(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> AppResult<Json<Vec<Customer>>> {
    let customers = state.services.customers.list(&caller).await?;
    Ok(Json(customers))
}

/// Get a customer by ID (owner or admin)
#[utoipa::path(
    get,
    path = "/customers/{id}",
    tag = "customers",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer details", body = Customer),
        (status = 403, description = "Not the customer's own record"),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn get_customer(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Customer>> {
    let customer = state.services.customers.get(id, &caller).await?;
    Ok(Json(customer))
}

/// Get a customer by email
#[utoipa::path(
    get,
    path = "/customers/by-email/{email}",
    tag = "customers",
    security(("bearer_auth" = [])),
    params(("email" = String, Path, description = "Customer email")),
    responses(
        (status = 200, description = "Customer details", body = Customer),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn get_customer_by_email(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(email): Path<String>,
) -> AppResult<Json<Customer>> {
    let customer = state.services.customers.get_by_email(&email, &caller).await?;
    Ok(Json(customer))
}

/// Create a new customer
#[utoipa::path(
    post,
    path = "/customers",
    tag = "customers",
    security(("bearer_auth" = [])),
    request_body = CreateCustomer,
    responses(
        (status = 201, description = "Customer created", body = Customer),
        (status = 400, description = "Invalid input or under-age customer"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn create_customer(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Json(customer): Json<CreateCustomer>,
) -> AppResult<(StatusCode, Json<Customer>)> {
    let created = state.services.customers.create(customer, &caller).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Partially update a customer
#[utoipa::path(
    patch,
    path = "/customers/{id}",
    tag = "customers",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Customer ID")),
    request_body = CustomerPatch,
    responses(
        (status = 200, description = "Customer updated", body = Customer),
        (status = 400, description = "No fields provided or under-age customer"),
        (status = 404, description = "Customer not found")
    )
)]
pub async fn update_customer(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(patch): Json<CustomerPatch>,
) -> AppResult<Json<Customer>> {
    let updated = state.services.customers.update(id, patch, &caller).await?;
    Ok(Json(updated))
}

/// Delete a customer without lendings
#[utoipa::path(
    delete,
    path = "/customers/{id}",
    tag = "customers",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Customer ID")),
    responses(
        (status = 204, description = "Customer deleted"),
        (status = 404, description = "Customer not found"),
        (status = 409, description = "Customer is referenced by lendings")
    )
)]
pub async fn delete_customer(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.customers.delete(id, &caller).await?;
    Ok(StatusCode::NO_CONTENT)
}

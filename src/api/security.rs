//! Security endpoints: login, registration and password changes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::customer::Customer,
};

use super::AuthenticatedUser;

/// Login request
#[derive(Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub password: String,
}

/// Login response carrying the signed claims token
#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
}

/// Self-registration request
#[derive(Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "First name must not be empty"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name must not be empty"))]
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
}

/// Change password request for the calling credential
#[derive(Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Names the credential an admin-role operation applies to
#[derive(Deserialize, Validate, ToSchema)]
pub struct RoleGrantRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Admin-set password for an arbitrary credential
#[derive(Deserialize, Validate, ToSchema)]
pub struct SetPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Verify credentials and issue a bearer token
#[utoipa::path(
    post,
    path = "/security/login",
    tag = "security",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<crate::AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let token = state
        .services
        .auth
        .login(&request.email, &request.password)
        .await?;

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
    }))
}

/// Register a new customer with a user-role credential
#[utoipa::path(
    post,
    path = "/security/register",
    tag = "security",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Customer registered", body = Customer),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<crate::AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<Customer>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let customer = state
        .services
        .auth
        .register(
            &request.email,
            &request.password,
            &request.first_name,
            &request.last_name,
            request.date_of_birth,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

/// Change the calling credential's password
#[utoipa::path(
    put,
    path = "/security/password",
    tag = "security",
    security(("bearer_auth" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 401, description = "Current password incorrect")
    )
)]
pub async fn change_password(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Json(request): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let email = caller
        .email
        .ok_or_else(|| AppError::Authentication("Caller identity missing".to_string()))?;

    state
        .services
        .auth
        .change_password(&email, &request.current_password, &request.new_password)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Grant the admin role to a credential
#[utoipa::path(
    post,
    path = "/security/roles/admin",
    tag = "security",
    security(("bearer_auth" = [])),
    request_body = RoleGrantRequest,
    responses(
        (status = 204, description = "Admin role granted"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Credential not found")
    )
)]
pub async fn grant_admin(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Json(request): Json<RoleGrantRequest>,
) -> AppResult<StatusCode> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state.services.auth.grant_admin(&request.email, &caller).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Revoke the admin role from a credential
#[utoipa::path(
    delete,
    path = "/security/roles/admin",
    tag = "security",
    security(("bearer_auth" = [])),
    request_body = RoleGrantRequest,
    responses(
        (status = 204, description = "Admin role revoked"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Credential not found"),
        (status = 409, description = "Credential is the only remaining admin")
    )
)]
pub async fn revoke_admin(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Json(request): Json<RoleGrantRequest>,
) -> AppResult<StatusCode> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state.services.auth.revoke_admin(&request.email, &caller).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a credential, leaving any customer record in place
#[utoipa::path(
    delete,
    path = "/security/credentials/{email}",
    tag = "security",
    security(("bearer_auth" = [])),
    params(("email" = String, Path, description = "Credential email")),
    responses(
        (status = 204, description = "Credential deleted"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Credential not found")
    )
)]
pub async fn delete_credential(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(email): Path<String>,
) -> AppResult<StatusCode> {
    state.services.auth.delete_credential(&email, &caller).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Set a credential's password as admin
#[utoipa::path(
    put,
    path = "/security/credentials",
    tag = "security",
    security(("bearer_auth" = [])),
    request_body = SetPasswordRequest,
    responses(
        (status = 204, description = "Password set"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Credential not found")
    )
)]
pub async fn set_password(
    State(state): State<crate::AppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Json(request): Json<SetPasswordRequest>,
) -> AppResult<StatusCode> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    state
        .services
        .auth
        .set_password(&request.email, &request.new_password, &caller)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

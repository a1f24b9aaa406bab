//! API handlers for Lendstock REST endpoints

pub mod customers;
pub mod health;
pub mod lendings;
pub mod openapi;
pub mod security;
pub mod things;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{error::AppError, models::claims::Claims, services::access::Caller, AppState};

/// Extractor for the authenticated caller from a bearer JWT.
///
/// Token parsing happens exactly once per request, here; handlers and
/// services only ever see the resulting `Caller`.
pub struct AuthenticatedUser(pub Caller);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        if !auth_header.starts_with("Bearer ") {
            return Err(AppError::Authentication(
                "Invalid authorization header format".to_string(),
            ));
        }

        let token = &auth_header[7..];

        let claims = Claims::from_token(
            token,
            &state.config.auth.jwt_secret,
            &state.config.auth.jwt_issuer,
            &state.config.auth.jwt_audience,
        )
        .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(Caller::from(&claims)))
    }
}

//! Liveness and readiness endpoints

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

#[derive(Serialize, ToSchema)]
pub struct StatusResponse {
    pub service: String,
    pub status: String,
    pub version: String,
}

impl StatusResponse {
    fn with_status(status: &str) -> Self {
        Self {
            service: env!("CARGO_PKG_NAME").to_string(),
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Liveness probe; answers as long as the process runs
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is up", body = StatusResponse)
    )
)]
pub async fn health_check() -> Json<StatusResponse> {
    Json(StatusResponse::with_status("ok"))
}

/// Readiness probe; verifies the database answers before reporting ready
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready", body = StatusResponse),
        (status = 500, description = "Database unreachable")
    )
)]
pub async fn readiness_check(
    State(state): State<crate::AppState>,
) -> AppResult<Json<StatusResponse>> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.repository.pool)
        .await?;
    Ok(Json(StatusResponse::with_status("ready")))
}

//! Probes: health, readiness, version. Plus the envelopes for unmatched routes and methods.

use crate::error::AppError;
use crate::response::ApiResponse;
use crate::state::AppState;
use axum::extract::State;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Serialize)]
pub struct ReadyBody {
    status: &'static str,
    database: &'static str,
}

pub async fn health() -> ApiResponse<Value> {
    ApiResponse::ok("Service is healthy.", json!({ "status": "ok" }))
}

pub async fn ready(State(state): State<AppState>) -> Result<ApiResponse<ReadyBody>, AppError> {
    if let Err(e) = state.store.ping().await {
        tracing::warn!(error = %e, "readiness check failed");
        return Err(AppError::Unavailable("Database unavailable.".into()));
    }
    Ok(ApiResponse::ok(
        "Service is ready.",
        ReadyBody {
            status: "ok",
            database: "ok",
        },
    ))
}

pub async fn version() -> ApiResponse<Value> {
    ApiResponse::ok(
        "Version information.",
        json!({
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION")
        }),
    )
}

pub async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found.".into())
}

pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed("Method not allowed.".into())
}

//! Health Routes
//!
//! Health check endpoints for monitoring and Kubernetes probes.
//!
//! - GET /health/live - Liveness probe (process is alive)
//! - GET /health/ready - Readiness probe (log source reachable)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;

/// GET /health/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Returns 200 once the configured log store answers its health check.
pub async fn readiness(State(state): State<Arc<AppState>>) -> ApiResult<StatusCode> {
    let result = state.executor.check_health().await;
    if result.is_ok() {
        Ok(StatusCode::OK)
    } else {
        Err(ApiError::ServiceUnavailable(result.message))
    }
}

/// GET /health
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let result = state.executor.check_health().await;

    let status = if result.is_ok() { "healthy" } else { "unhealthy" };

    Json(HealthResponse {
        status: status.to_string(),
        source: state.executor.source_name().to_string(),
        message: result.message,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

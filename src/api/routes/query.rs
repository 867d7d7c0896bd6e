//! Query Routes
//!
//! - POST /api/v1/query - Execute a batch of queries
//!
//! The response maps each query's `refId` to its frames or its error.
//! A failing query never fails the request.

use axum::{extract::State, Json};
use std::collections::HashSet;
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::query::{BatchRequest, BatchResponse};

/// POST /api/v1/query
pub async fn execute_batch(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchRequest>,
) -> ApiResult<Json<BatchResponse>> {
    validate_batch(&req)?;

    let response = state.executor.execute_batch(req).await;
    Ok(Json(response))
}

/// Reject batches whose responses could not be told apart
fn validate_batch(req: &BatchRequest) -> ApiResult<()> {
    let mut seen = HashSet::new();

    for query in &req.queries {
        if query.ref_id.trim().is_empty() {
            return Err(ApiError::Validation("refId cannot be empty".to_string()));
        }
        if !seen.insert(query.ref_id.as_str()) {
            return Err(ApiError::Validation(format!(
                "duplicate refId: {}",
                query.ref_id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::{QueryInvocation, TimeWindow};
    use serde_json::json;

    fn batch(ids: &[&str]) -> BatchRequest {
        BatchRequest::new(
            ids.iter()
                .map(|id| QueryInvocation::new(*id, json!({}), TimeWindow::last_hours(1)))
                .collect(),
        )
    }

    #[test]
    fn test_validate_batch() {
        assert!(validate_batch(&batch(&["A", "B"])).is_ok());
        assert!(validate_batch(&batch(&[])).is_ok());
        assert!(matches!(
            validate_batch(&batch(&["A", "A"])),
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            validate_batch(&batch(&[" "])),
            Err(ApiError::Validation(_))
        ));
    }
}

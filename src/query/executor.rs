//! Query Executor
//!
//! Runs a batch of queries against a log source. Each query is an
//! independent pipeline:
//!
//! ```text
//! Invocation → Normalize → Fetch → Pivot → Frame
//! ```
//!
//! Queries in a batch run concurrently. A failing query only fails its own
//! response entry.

use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Instant;

use crate::frame::build_frame;
use crate::payload::{normalize, QueryInvocation};
use crate::query::error::{QueryError, QueryResult};
use crate::query::types::{BatchRequest, BatchResponse, CheckHealthResult, QueryResponse};
use crate::source::{LogSearch, LogSource};

/// Default number of records requested per search
pub const DEFAULT_LINE_LIMIT: usize = 500;

/// Query executor
pub struct QueryExecutor {
    source: Arc<dyn LogSource>,
    line_limit: usize,
}

impl QueryExecutor {
    /// Create a new query executor
    pub fn new(source: Arc<dyn LogSource>) -> Self {
        Self {
            source,
            line_limit: DEFAULT_LINE_LIMIT,
        }
    }

    /// Set the per-search record limit
    pub fn with_line_limit(mut self, line_limit: usize) -> Self {
        self.line_limit = line_limit;
        self
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Execute every query in a batch
    pub async fn execute_batch(&self, batch: BatchRequest) -> BatchResponse {
        let start = Instant::now();
        let total = batch.queries.len();

        let results = join_all(batch.queries.into_iter().map(|invocation| async move {
            let ref_id = invocation.ref_id.clone();
            let response = match self.execute(&invocation).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(
                        ref_id = %ref_id,
                        kind = e.kind(),
                        error = %e,
                        "Query failed"
                    );
                    QueryResponse::error(e.to_string())
                }
            };
            (ref_id, response)
        }))
        .await;

        let response = BatchResponse {
            responses: results.into_iter().collect(),
        };

        tracing::info!(
            queries = total,
            failed = response.error_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Batch executed"
        );

        response
    }

    /// Execute one query
    pub async fn execute(&self, invocation: &QueryInvocation) -> QueryResult<QueryResponse> {
        let payload = normalize(invocation)?;
        let ref_id = invocation.ref_id.clone();

        if !payload.needs_fetch() {
            return Ok(QueryResponse::frame(build_frame(&ref_id, &payload, &[])));
        }

        let search = LogSearch::for_payload(&payload, self.line_limit);
        let batch = self.source.get_logs(&search).await?;

        tracing::debug!(
            ref_id = %ref_id,
            records = batch.count,
            complete = batch.complete,
            "Fetched records"
        );

        let frame = tokio::task::spawn_blocking(move || {
            build_frame(&ref_id, &payload, &batch.records)
        })
        .await
        .map_err(|e| QueryError::Execution(e.to_string()))?;

        Ok(QueryResponse::frame(frame))
    }

    /// Check that the log source is reachable
    pub async fn check_health(&self) -> CheckHealthResult {
        match self.source.check_health().await {
            Ok(()) => CheckHealthResult::ok(),
            Err(e) => {
                tracing::warn!(source = self.source.name(), error = %e, "Health check failed");
                CheckHealthResult::error(e.to_string())
            }
        }
    }
}

//! Query Service
//!
//! Executes batches of host queries against a [`LogSource`](crate::source::LogSource):
//!
//! - **Types**: batch request/response and health check result
//! - **Executor**: per-query pipeline, concurrent across a batch
//!
//! # Example
//!
//! ```rust,ignore
//! use slsframe::query::{BatchRequest, QueryExecutor};
//!
//! let executor = QueryExecutor::new(source).with_line_limit(1000);
//! let response = executor.execute_batch(BatchRequest::new(queries)).await;
//!
//! for (ref_id, result) in &response.responses {
//!     println!("{}: {} frame(s)", ref_id, result.frames.len());
//! }
//! ```

mod error;
mod executor;
mod types;

pub use error::{QueryError, QueryResult};
pub use executor::{QueryExecutor, DEFAULT_LINE_LIMIT};
pub use types::{
    BatchRequest, BatchResponse, CheckHealthResult, HealthStatus, QueryResponse,
};

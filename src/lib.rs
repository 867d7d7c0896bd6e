//! # slsframe
//!
//! Turns schema-less log search results into typed, columnar frames for
//! charting and tabular display.
//!
//! Every log record is a flat map of string fields. Which fields are
//! numbers, which are labels and which one holds the timestamp is only
//! known after the whole result set has been scanned, so the conversion
//! classifies fields per query and then pivots records into series keyed
//! by their label values.
//!
//! ## Modules
//!
//! - [`payload`]: query payload normalization and defaults
//! - [`frame`]: classification, pivot and frame assembly
//! - [`source`]: log store boundary with memory and file-replay sources
//! - [`query`]: concurrent batch execution
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use slsframe::payload::{QueryInvocation, TimeWindow};
//! use slsframe::query::{BatchRequest, QueryExecutor};
//! use slsframe::source::FileSource;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let source = Arc::new(FileSource::new("./data", "demo", "access"));
//!     let executor = QueryExecutor::new(source);
//!
//!     let query = QueryInvocation::new(
//!         "A",
//!         serde_json::json!({"queryText": "status: 500", "format": "TimeSeries"}),
//!         TimeWindow::last_hours(1),
//!     );
//!
//!     let response = executor.execute_batch(BatchRequest::new(vec![query])).await;
//!     if let Some(result) = response.get("A") {
//!         println!("{} frame(s)", result.frames.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod frame;
pub mod payload;
pub mod query;
pub mod source;

// Re-export top-level types for convenience
pub use payload::{
    normalize, FrameFormat, PayloadError, QueryInvocation, QueryPayload, TimeWindow,
};

pub use frame::{build_frame, Field, FieldValues, Frame, FrameShape, RawRecord};

pub use source::{FileSource, LogBatch, LogSearch, LogSource, MemorySource, SourceError};

pub use query::{
    BatchRequest, BatchResponse, CheckHealthResult, QueryError, QueryExecutor, QueryResponse,
};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{Config, ConfigError, LoggingConfig};

//! Query error types
//!
//! Only payload and fetch failures reach this level; per-record anomalies
//! are absorbed by the pivot.

use thiserror::Error;

use crate::payload::PayloadError;
use crate::source::SourceError;

/// Errors that fail a single query
#[derive(Error, Debug)]
pub enum QueryError {
    /// The query's JSON could not be normalized
    #[error(transparent)]
    Payload(#[from] PayloadError),

    /// The log source search failed; its message is kept verbatim
    #[error(transparent)]
    Fetch(#[from] SourceError),

    /// The pivot task did not complete
    #[error("Execution error: {0}")]
    Execution(String),
}

impl QueryError {
    /// Short machine-readable category
    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::Payload(_) => "invalid_payload",
            QueryError::Fetch(_) => "remote_fetch",
            QueryError::Execution(_) => "execution",
        }
    }
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

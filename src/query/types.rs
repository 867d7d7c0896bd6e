//! Batch request and response types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::frame::Frame;
use crate::payload::QueryInvocation;

/// A batch of queries sent together by the host
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchRequest {
    pub queries: Vec<QueryInvocation>,
}

impl BatchRequest {
    pub fn new(queries: Vec<QueryInvocation>) -> Self {
        Self { queries }
    }
}

/// Outcome of one query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub frames: Vec<Frame>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResponse {
    pub fn frame(frame: Frame) -> Self {
        Self {
            frames: vec![frame],
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            frames: Vec::new(),
            error: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Responses keyed by the reference id of the originating query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub responses: BTreeMap<String, QueryResponse>,
}

impl BatchResponse {
    pub fn get(&self, ref_id: &str) -> Option<&QueryResponse> {
        self.responses.get(ref_id)
    }

    pub fn len(&self) -> usize {
        self.responses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.responses.is_empty()
    }

    /// Number of queries that failed
    pub fn error_count(&self) -> usize {
        self.responses.values().filter(|r| r.is_error()).count()
    }
}

/// Health status of the configured log store
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Error,
}

/// Result of a data source health check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckHealthResult {
    pub status: HealthStatus,
    pub message: String,
}

impl CheckHealthResult {
    pub const OK_MESSAGE: &'static str = "Data source is working";

    pub fn ok() -> Self {
        Self {
            status: HealthStatus::Ok,
            message: Self::OK_MESSAGE.to_string(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: HealthStatus::Error,
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == HealthStatus::Ok
    }
}

//! Data Transfer Objects
//!
//! Response types owned by the HTTP layer. Batch requests and responses
//! are the query service's own types and are served as-is.

use serde::{Deserialize, Serialize};

/// Full health status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: healthy or unhealthy
    pub status: String,
    /// Log source name
    pub source: String,
    /// Log source health message
    pub message: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}

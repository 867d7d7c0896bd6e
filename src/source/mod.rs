//! Log Sources
//!
//! The boundary to the log store. A source runs a search and hands back
//! the already-decoded records; the pivot never talks to the store itself.
//!
//! - [`MemorySource`]: records held in memory (tests, offline pivots)
//! - [`FileSource`]: replays `{data_dir}/{project}/{log_store}.json`
//!
//! A remote log service client plugs in by implementing [`LogSource`].

mod file;
mod memory;

pub use file::{decode_records, write_records, FileSource};
pub use memory::MemorySource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::frame::RawRecord;
use crate::payload::QueryPayload;

/// Metadata field carrying the ingest time in epoch seconds
pub const INGEST_TIME_FIELD: &str = "__time__";

/// Common trait for all log stores
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Short name used in logs and health messages
    fn name(&self) -> &str;

    /// Run a search and return the matching records
    async fn get_logs(&self, search: &LogSearch) -> SourceResult<LogBatch>;

    /// Verify the configured log store is reachable
    async fn check_health(&self) -> SourceResult<()>;
}

/// A search against the log store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSearch {
    /// Query expression
    pub query: String,
    /// Window start, epoch seconds (inclusive)
    pub from: i64,
    /// Window end, epoch seconds (exclusive)
    pub to: i64,
    /// Maximum number of records to return
    pub line: usize,
    /// Records to skip
    pub offset: usize,
    /// Newest first when true
    pub reverse: bool,
}

impl LogSearch {
    /// Search for a normalized payload's query and window
    pub fn for_payload(payload: &QueryPayload, line: usize) -> Self {
        Self {
            query: payload.query.clone(),
            from: payload.window_start,
            to: payload.window_end,
            line,
            offset: 0,
            reverse: false,
        }
    }

    /// Check whether an ingest time falls in the search window
    pub fn contains(&self, ingest_secs: i64) -> bool {
        ingest_secs >= self.from && ingest_secs < self.to
    }
}

/// Records returned by a search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogBatch {
    pub records: Vec<RawRecord>,
    /// Number of records returned
    pub count: usize,
    /// False when more records matched than were returned
    pub complete: bool,
}

impl LogBatch {
    pub fn new(records: Vec<RawRecord>, complete: bool) -> Self {
        Self {
            count: records.len(),
            records,
            complete,
        }
    }
}

/// Apply a search's window, ordering and paging to a record snapshot.
///
/// Records carrying `__time__` are filtered by the window; records without
/// it are always kept. No query-expression evaluation happens here.
pub fn select_records(records: &[RawRecord], search: &LogSearch) -> LogBatch {
    let mut matched: Vec<&RawRecord> = records
        .iter()
        .filter(|record| {
            match record
                .get(INGEST_TIME_FIELD)
                .and_then(|t| t.trim().parse::<i64>().ok())
            {
                Some(secs) => search.contains(secs),
                None => true,
            }
        })
        .collect();

    if search.reverse {
        matched.reverse();
    }

    let total = matched.len();
    let page: Vec<RawRecord> = matched
        .into_iter()
        .skip(search.offset)
        .take(search.line)
        .cloned()
        .collect();
    let complete = search.offset + page.len() >= total;

    LogBatch::new(page, complete)
}

/// Errors raised by log sources
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The search failed; the store's message is passed through as-is
    #[error("{0}")]
    Remote(String),

    /// The configured log store does not exist
    #[error("Log store not found: {0}")]
    NotFound(String),

    /// Stored records could not be decoded
    #[error("Invalid log data: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Decode(err.to_string())
    }
}

/// Result type for log source operations
pub type SourceResult<T> = Result<T, SourceError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn record(time: Option<&str>, msg: &str) -> RawRecord {
        let mut record = RawRecord::new();
        if let Some(t) = time {
            record.insert(INGEST_TIME_FIELD.to_string(), t.to_string());
        }
        record.insert("msg".to_string(), msg.to_string());
        record
    }

    fn search(from: i64, to: i64) -> LogSearch {
        LogSearch {
            query: "*".to_string(),
            from,
            to,
            line: 100,
            offset: 0,
            reverse: false,
        }
    }

    fn messages(batch: &LogBatch) -> Vec<&str> {
        batch.records.iter().map(|r| r["msg"].as_str()).collect()
    }

    #[test]
    fn test_window_filter() {
        let records = vec![
            record(Some("99"), "before"),
            record(Some("100"), "start"),
            record(Some("150"), "middle"),
            record(Some("200"), "end"),
            record(None, "untimed"),
        ];

        let batch = select_records(&records, &search(100, 200));

        assert_eq!(messages(&batch), vec!["start", "middle", "untimed"]);
        assert_eq!(batch.count, 3);
        assert!(batch.complete);
    }

    #[test]
    fn test_paging_and_reverse() {
        let records: Vec<RawRecord> = (0..5)
            .map(|i| record(Some(&(100 + i).to_string()), &i.to_string()))
            .collect();

        let mut s = search(0, 1000);
        s.line = 2;
        s.offset = 1;
        let batch = select_records(&records, &s);
        assert_eq!(messages(&batch), vec!["1", "2"]);
        assert!(!batch.complete);

        s.reverse = true;
        s.offset = 3;
        let batch = select_records(&records, &s);
        assert_eq!(messages(&batch), vec!["1", "0"]);
        assert!(batch.complete);
    }

    #[test]
    fn test_search_for_payload() {
        let payload = QueryPayload::new("status: 500").window(10, 20);
        let search = LogSearch::for_payload(&payload, 500);

        assert_eq!(search.query, "status: 500");
        assert_eq!(search.from, 10);
        assert_eq!(search.to, 20);
        assert_eq!(search.line, 500);
        assert!(!search.reverse);
    }

    #[test]
    fn test_remote_error_passthrough() {
        let err = SourceError::Remote("ProjectNotExist: project does not exist".to_string());
        assert_eq!(err.to_string(), "ProjectNotExist: project does not exist");
    }
}

//! Payload types
//!
//! - `QueryInvocation`: one query as the host hands it over
//! - `TimeWindow`: the host-selected time range
//! - `FrameFormat`: requested output shape
//! - `QueryPayload`: the fully normalized query

use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::time_format::DEFAULT_TIME_FORMAT;

/// Timestamp field used when the payload does not name one
pub const DEFAULT_TIME_FIELD: &str = "time";

/// Timezone used when the payload does not name one
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Shanghai;

/// Host query type that selects time-series output when `format` is unset
pub const TIME_SERIES_QUERY_TYPE: &str = "time series";

/// A single query as received from the host runtime
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryInvocation {
    /// Identifier echoed back on the matching response
    pub ref_id: String,
    /// Host-level query type ("time series", "table", or empty)
    #[serde(default)]
    pub query_type: String,
    /// Untyped query payload written by the query editor
    #[serde(default)]
    pub json: serde_json::Value,
    /// Time range selected in the host
    pub time_range: TimeWindow,
    /// Host hint for the number of points the panel can render
    #[serde(default)]
    pub max_data_points: i64,
}

impl QueryInvocation {
    /// Create an invocation with an empty query type and no point hint
    pub fn new(ref_id: impl Into<String>, json: serde_json::Value, time_range: TimeWindow) -> Self {
        Self {
            ref_id: ref_id.into(),
            query_type: String::new(),
            json,
            time_range,
            max_data_points: 0,
        }
    }

    /// Builder: set the host query type
    pub fn query_type(mut self, query_type: impl Into<String>) -> Self {
        self.query_type = query_type.into();
        self
    }

    /// Builder: set the max data points hint
    pub fn max_data_points(mut self, points: i64) -> Self {
        self.max_data_points = points;
        self
    }
}

/// Host time range (inclusive start, exclusive end)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Window covering the last N hours from now
    pub fn last_hours(hours: i64) -> Self {
        let to = Utc::now();
        Self {
            from: to - Duration::hours(hours),
            to,
        }
    }

    /// Start truncated to whole epoch seconds
    pub fn start_secs(&self) -> i64 {
        self.from.timestamp_millis() / 1000
    }

    /// End truncated to whole epoch seconds
    pub fn end_secs(&self) -> i64 {
        self.to.timestamp_millis() / 1000
    }
}

/// Output shape requested by a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameFormat {
    /// One string column per field, rows in record order
    Table,
    /// Shared time axis plus one numeric column per series and field
    TimeSeries,
    /// Any other requested value; yields an empty frame
    Unsupported(String),
}

impl FrameFormat {
    /// Resolve the payload format, falling back to the host query type
    pub fn resolve(format: Option<&str>, query_type: &str) -> Self {
        match format.map(str::trim).filter(|f| !f.is_empty()) {
            Some(name) => Self::from_name(name),
            None if query_type.eq_ignore_ascii_case(TIME_SERIES_QUERY_TYPE) => {
                FrameFormat::TimeSeries
            }
            None => FrameFormat::Table,
        }
    }

    fn from_name(name: &str) -> Self {
        let normalized = name.to_ascii_lowercase().replace([' ', '_'], "");
        match normalized.as_str() {
            "table" => FrameFormat::Table,
            "timeseries" => FrameFormat::TimeSeries,
            _ => FrameFormat::Unsupported(name.to_string()),
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, FrameFormat::Unsupported(_))
    }
}

impl std::fmt::Display for FrameFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameFormat::Table => write!(f, "Table"),
            FrameFormat::TimeSeries => write!(f, "TimeSeries"),
            FrameFormat::Unsupported(name) => write!(f, "{}", name),
        }
    }
}

/// A fully normalized query payload
///
/// `time_field`, `time_format` and `format` are never empty; the timezone
/// is always a resolved tz database zone.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPayload {
    /// Log query expression sent to the log store
    pub query: String,
    /// Requested output shape
    pub format: FrameFormat,
    /// Name of the field holding the record timestamp
    pub time_field: String,
    /// Zone the timestamp text is interpreted in
    pub timezone: Tz,
    /// strftime pattern of the timestamp text
    pub time_format: String,
    /// Window start, epoch seconds
    pub window_start: i64,
    /// Window end, epoch seconds
    pub window_end: i64,
    /// Point-count hint
    pub point_limit: i64,
    /// Hidden queries are neither fetched nor pivoted
    pub hidden: bool,
}

impl QueryPayload {
    /// Create a payload with default options and an empty window
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            format: FrameFormat::Table,
            time_field: DEFAULT_TIME_FIELD.to_string(),
            timezone: DEFAULT_TIMEZONE,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            window_start: 0,
            window_end: 0,
            point_limit: 0,
            hidden: false,
        }
    }

    /// Builder: set the output format
    pub fn format(mut self, format: FrameFormat) -> Self {
        self.format = format;
        self
    }

    /// Builder: set the timestamp field
    pub fn time_field(mut self, field: impl Into<String>) -> Self {
        self.time_field = field.into();
        self
    }

    /// Builder: set the timezone
    pub fn timezone(mut self, tz: Tz) -> Self {
        self.timezone = tz;
        self
    }

    /// Builder: set the strftime pattern
    pub fn time_format(mut self, pattern: impl Into<String>) -> Self {
        self.time_format = pattern.into();
        self
    }

    /// Builder: set the window in epoch seconds
    pub fn window(mut self, start: i64, end: i64) -> Self {
        self.window_start = start;
        self.window_end = end;
        self
    }

    /// Builder: mark the query hidden
    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Whether the log store must be queried at all
    pub fn needs_fetch(&self) -> bool {
        !self.hidden && self.format.is_supported()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_resolution() {
        assert_eq!(FrameFormat::resolve(Some("Table"), ""), FrameFormat::Table);
        assert_eq!(
            FrameFormat::resolve(Some("TimeSeries"), "table"),
            FrameFormat::TimeSeries
        );
        assert_eq!(
            FrameFormat::resolve(Some("time series"), ""),
            FrameFormat::TimeSeries
        );
        assert_eq!(
            FrameFormat::resolve(Some("Heatmap"), ""),
            FrameFormat::Unsupported("Heatmap".to_string())
        );
    }

    #[test]
    fn test_format_falls_back_to_query_type() {
        assert_eq!(
            FrameFormat::resolve(None, "time series"),
            FrameFormat::TimeSeries
        );
        assert_eq!(FrameFormat::resolve(Some(""), "table"), FrameFormat::Table);
        assert_eq!(FrameFormat::resolve(None, ""), FrameFormat::Table);
    }

    #[test]
    fn test_window_truncates_to_seconds() {
        let from = Utc.timestamp_millis_opt(1_700_000_000_999).unwrap();
        let to = Utc.timestamp_millis_opt(1_700_000_360_500).unwrap();
        let window = TimeWindow::new(from, to);

        assert_eq!(window.start_secs(), 1_700_000_000);
        assert_eq!(window.end_secs(), 1_700_000_360);
    }

    #[test]
    fn test_needs_fetch() {
        assert!(QueryPayload::new("*").needs_fetch());
        assert!(!QueryPayload::new("*").hidden(true).needs_fetch());
        assert!(!QueryPayload::new("*")
            .format(FrameFormat::Unsupported("Logs".to_string()))
            .needs_fetch());
    }

    #[test]
    fn test_invocation_deserialization() {
        let json = r#"{
            "refId": "A",
            "queryType": "time series",
            "json": {"queryText": "* | select count(*)"},
            "timeRange": {"from": "2023-01-01T00:00:00Z", "to": "2023-01-01T01:00:00Z"},
            "maxDataPoints": 1200
        }"#;

        let invocation: QueryInvocation = serde_json::from_str(json).unwrap();
        assert_eq!(invocation.ref_id, "A");
        assert_eq!(invocation.query_type, "time series");
        assert_eq!(invocation.max_data_points, 1200);
        assert_eq!(invocation.time_range.start_secs(), 1_672_531_200);
    }
}

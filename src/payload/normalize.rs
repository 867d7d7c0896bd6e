//! Payload normalization
//!
//! Decodes the query editor's JSON into a `QueryPayload`, filling defaults
//! for every option the editor left unset.

use chrono_tz::Tz;
use serde::Deserialize;

use super::error::{PayloadError, PayloadResult};
use super::time_format::{translate_time_format, DEFAULT_TIME_FORMAT};
use super::types::{
    FrameFormat, QueryInvocation, QueryPayload, TimeWindow, DEFAULT_TIMEZONE, DEFAULT_TIME_FIELD,
};

/// Query editor JSON as written by the frontend
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuery {
    #[serde(default)]
    query_text: String,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    time_field: Option<String>,
    #[serde(default)]
    timezone: Option<String>,
    #[serde(default)]
    time_format: Option<String>,
    #[serde(default)]
    max_data_points: Option<i64>,
    #[serde(default)]
    hide: bool,
}

/// Normalize one host invocation into a `QueryPayload`
pub fn normalize(invocation: &QueryInvocation) -> PayloadResult<QueryPayload> {
    let raw = RawQuery::deserialize(&invocation.json)?;
    build_payload(
        raw,
        &invocation.time_range,
        invocation.max_data_points,
        &invocation.query_type,
    )
}

/// Normalize a payload given as raw JSON bytes
pub fn normalize_bytes(
    json: &[u8],
    window: &TimeWindow,
    max_data_points: i64,
    query_type: &str,
) -> PayloadResult<QueryPayload> {
    let raw: RawQuery = serde_json::from_slice(json)?;
    build_payload(raw, window, max_data_points, query_type)
}

fn build_payload(
    raw: RawQuery,
    window: &TimeWindow,
    max_data_points: i64,
    query_type: &str,
) -> PayloadResult<QueryPayload> {
    let format = FrameFormat::resolve(raw.format.as_deref(), query_type);
    let time_field = non_empty(raw.time_field).unwrap_or_else(|| DEFAULT_TIME_FIELD.to_string());
    let timezone = match non_empty(raw.timezone) {
        Some(name) => name
            .parse::<Tz>()
            .map_err(|_| PayloadError::UnknownTimezone(name.clone()))?,
        None => DEFAULT_TIMEZONE,
    };
    let time_format = non_empty(raw.time_format)
        .map(|pattern| translate_time_format(&pattern))
        .unwrap_or_else(|| DEFAULT_TIME_FORMAT.to_string());
    let point_limit = raw.max_data_points.filter(|p| *p > 0).unwrap_or(max_data_points);

    let payload = QueryPayload {
        query: raw.query_text,
        format,
        time_field,
        timezone,
        time_format,
        window_start: window.start_secs(),
        window_end: window.end_secs(),
        point_limit,
        hidden: raw.hide,
    };

    tracing::info!(
        query = %payload.query,
        format = %payload.format,
        time_field = %payload.time_field,
        timezone = %payload.timezone,
        time_format = %payload.time_format,
        from = payload.window_start,
        to = payload.window_end,
        point_limit = payload.point_limit,
        hidden = payload.hidden,
        "Normalized query payload"
    );

    Ok(payload)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

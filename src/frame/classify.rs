//! Record classification and coercion
//!
//! Runs in two strict steps over one query's result set:
//!
//! 1. Attach a parsed timestamp to every record; records whose timestamp is
//!    missing or unparseable are dropped.
//! 2. Classify every non-reserved, non-time field over *all* retained
//!    records, freeze the classification, then coerce each record.
//!
//! Classification needs the complete set because a single string value
//! says nothing about the field's type.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::collections::{BTreeMap, HashMap};

use super::types::{is_reserved, FieldClassification, FieldKind, RawRecord, TypedRecord};
use crate::payload::QueryPayload;

/// A raw record with its parsed timestamp
#[derive(Debug, Clone, Copy)]
pub struct TimedRecord<'a> {
    pub time: DateTime<Utc>,
    pub raw: &'a RawRecord,
}

/// Records that survived timestamp parsing
#[derive(Debug, Default)]
pub struct TimedRecords<'a> {
    /// Retained records in input order
    pub records: Vec<TimedRecord<'a>>,
    /// Records dropped for a missing or unparseable timestamp
    pub dropped: usize,
}

/// Typed records plus the classification they were coerced with
#[derive(Debug, Clone, Default)]
pub struct Classified {
    pub records: Vec<TypedRecord>,
    pub classification: FieldClassification,
}

/// Parses timestamps and classifies fields for one query
#[derive(Debug, Clone)]
pub struct RecordClassifier {
    time_field: String,
    time_format: String,
    /// `time_format` with an optional fraction after the seconds
    fractional_format: Option<String>,
    timezone: Tz,
}

impl RecordClassifier {
    pub fn new(time_field: impl Into<String>, time_format: impl Into<String>, timezone: Tz) -> Self {
        let time_format = time_format.into();
        Self {
            time_field: time_field.into(),
            fractional_format: fractional_seconds_format(&time_format),
            time_format,
            timezone,
        }
    }

    /// Classifier configured from a normalized payload
    pub fn from_payload(payload: &QueryPayload) -> Self {
        Self::new(
            payload.time_field.clone(),
            payload.time_format.clone(),
            payload.timezone,
        )
    }

    pub fn time_field(&self) -> &str {
        &self.time_field
    }

    /// Whether a field takes part in classification and output
    pub fn is_value_field(&self, name: &str) -> bool {
        name != self.time_field && !is_reserved(name)
    }

    /// Parse a timestamp string.
    ///
    /// Tries the configured pattern as a local date-time in the query's
    /// zone, then with a fractional-seconds suffix (`10:00:00.123`), then
    /// as a date (local midnight), then falls back to epoch seconds or
    /// milliseconds for all-digit values. Ambiguous local times resolve to
    /// the earlier instant; nonexistent ones fail.
    pub fn parse_time(&self, value: &str) -> Option<DateTime<Utc>> {
        let value = value.trim();

        if let Ok(naive) = NaiveDateTime::parse_from_str(value, &self.time_format) {
            return self.localize(naive);
        }

        if let Some(pattern) = &self.fractional_format {
            if let Ok(naive) = NaiveDateTime::parse_from_str(value, pattern) {
                return self.localize(naive);
            }
        }

        if let Ok(date) = NaiveDate::parse_from_str(value, &self.time_format) {
            return self.localize(date.and_hms_opt(0, 0, 0)?);
        }

        parse_epoch(value)
    }

    fn localize(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self.timezone.from_local_datetime(&naive) {
            LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
            LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
            LocalResult::None => None,
        }
    }

    /// Attach timestamps, dropping records without a usable one
    pub fn attach_times<'a>(&self, records: &'a [RawRecord]) -> TimedRecords<'a> {
        let mut timed = TimedRecords {
            records: Vec::with_capacity(records.len()),
            dropped: 0,
        };

        for (index, raw) in records.iter().enumerate() {
            let parsed = raw
                .get(&self.time_field)
                .and_then(|value| self.parse_time(value));

            match parsed {
                Some(time) => timed.records.push(TimedRecord { time, raw }),
                None => {
                    tracing::debug!(
                        index,
                        time_field = %self.time_field,
                        value = raw.get(&self.time_field).map(String::as_str).unwrap_or("<absent>"),
                        "Dropping record with unparseable timestamp"
                    );
                    timed.dropped += 1;
                }
            }
        }

        if timed.dropped > 0 {
            tracing::info!(
                retained = timed.records.len(),
                dropped = timed.dropped,
                "Dropped records without a usable timestamp"
            );
        }

        timed
    }

    /// Classify fields over all retained records, then coerce
    pub fn classify(&self, timed: &[TimedRecord<'_>]) -> Classified {
        let classification = self.infer_classification(timed);

        let records = timed
            .iter()
            .map(|record| self.coerce(record, &classification))
            .collect();

        Classified {
            records,
            classification,
        }
    }

    /// Pass 1: a field is numeric iff every present value parses as a float
    fn infer_classification(&self, timed: &[TimedRecord<'_>]) -> FieldClassification {
        let mut saw_non_numeric: HashMap<&str, bool> = HashMap::new();

        for record in timed {
            for (name, value) in record.raw {
                if !self.is_value_field(name) {
                    continue;
                }
                let flag = saw_non_numeric.entry(name.as_str()).or_insert(false);
                if !*flag && parse_number(value).is_none() {
                    *flag = true;
                }
            }
        }

        let kinds: BTreeMap<String, FieldKind> = saw_non_numeric
            .into_iter()
            .map(|(name, non_numeric)| {
                let kind = if non_numeric {
                    FieldKind::Categorical
                } else {
                    FieldKind::Numeric
                };
                (name.to_string(), kind)
            })
            .collect();

        FieldClassification::from_kinds(kinds)
    }

    /// Pass 2: coerce one record with the frozen classification
    fn coerce(&self, record: &TimedRecord<'_>, classification: &FieldClassification) -> TypedRecord {
        let mut typed = TypedRecord::new(record.time);

        for (name, value) in record.raw {
            match classification.get(name) {
                Some(FieldKind::Numeric) => {
                    typed.numeric.insert(name.clone(), parse_number(value));
                }
                Some(FieldKind::Categorical) => {
                    typed.categorical.insert(name.clone(), value.clone());
                }
                None => {}
            }
        }

        typed
    }
}

/// Parse a finite decimal floating-point value.
///
/// `NaN` and `inf` spellings are text, not numbers.
pub fn parse_number(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|number| number.is_finite())
}

/// Seconds may carry a fraction the pattern does not spell out
fn fractional_seconds_format(pattern: &str) -> Option<String> {
    let has_fraction = ["%.f", "%f", "%.3f", "%.6f", "%.9f", "%3f", "%6f", "%9f"]
        .iter()
        .any(|spec| pattern.contains(spec));

    if pattern.contains("%S") && !has_fraction {
        Some(pattern.replacen("%S", "%S%.f", 1))
    } else {
        None
    }
}

/// Epoch seconds (up to 10 digits) or milliseconds (13 digits)
fn parse_epoch(value: &str) -> Option<DateTime<Utc>> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let number: i64 = value.parse().ok()?;
    match value.len() {
        1..=10 => Utc.timestamp_opt(number, 0).single(),
        13 => Utc.timestamp_millis_opt(number).single(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[(&str, &str)]) -> RawRecord {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn utc_classifier() -> RecordClassifier {
        RecordClassifier::new("time", "%Y-%m-%d %H:%M:%S", chrono_tz::UTC)
    }

    #[test]
    fn test_parse_time_in_timezone() {
        let classifier = RecordClassifier::new("time", "%Y-%m-%d %H:%M:%S", chrono_tz::Asia::Shanghai);
        let parsed = classifier.parse_time("2023-01-01 08:00:00").unwrap();

        // Shanghai is UTC+8
        assert_eq!(parsed, Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_time_date_only() {
        let classifier = RecordClassifier::new("day", "%Y/%m/%d", chrono_tz::UTC);
        let parsed = classifier.parse_time("2023/03/15").unwrap();

        assert_eq!(parsed, Utc.with_ymd_and_hms(2023, 3, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_time_epoch_fallback() {
        let classifier = utc_classifier();

        assert_eq!(
            classifier.parse_time("1672531200"),
            Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).single()
        );
        assert_eq!(
            classifier.parse_time("1672531200500").map(|t| t.timestamp_millis()),
            Some(1_672_531_200_500)
        );
        assert_eq!(classifier.parse_time("16725312005"), None);
        assert_eq!(classifier.parse_time("yesterday"), None);
        assert_eq!(classifier.parse_time(""), None);
    }

    #[test]
    fn test_parse_time_fractional_seconds() {
        let classifier = utc_classifier();

        assert_eq!(
            classifier
                .parse_time("2023-01-01 10:00:00.123")
                .map(|t| t.timestamp_millis()),
            Some(1_672_567_200_123)
        );
        assert_eq!(
            classifier.parse_time("2023-01-01 10:00:00"),
            Utc.with_ymd_and_hms(2023, 1, 1, 10, 0, 0).single()
        );
        assert_eq!(classifier.parse_time("2023-01-01 10:00:00.x"), None);
    }

    #[test]
    fn test_fractional_records_are_kept() {
        let records = vec![
            record(&[("time", "2023-01-01 10:00:00.123"), ("cpu", "1")]),
            record(&[("time", "2023-01-01 10:00:01.5"), ("cpu", "2")]),
        ];

        let timed = utc_classifier().attach_times(&records);

        assert_eq!(timed.records.len(), 2);
        assert_eq!(timed.dropped, 0);
    }

    #[test]
    fn test_nonexistent_local_time_fails() {
        // 2023-03-12 02:30 does not exist in New York (spring forward)
        let classifier = RecordClassifier::new("time", "%Y-%m-%d %H:%M:%S", chrono_tz::America::New_York);
        assert_eq!(classifier.parse_time("2023-03-12 02:30:00"), None);
    }

    #[test]
    fn test_attach_times_drops_bad_records() {
        let records = vec![
            record(&[("time", "2023-01-01 10:00:00"), ("host", "a")]),
            record(&[("time", "not a time"), ("host", "b")]),
            record(&[("host", "c")]),
            record(&[("time", "2023-01-01 10:00:02"), ("host", "d")]),
        ];

        let timed = utc_classifier().attach_times(&records);

        assert_eq!(timed.records.len(), 2);
        assert_eq!(timed.dropped, 2);
        assert_eq!(timed.records[0].raw["host"], "a");
        assert_eq!(timed.records[1].raw["host"], "d");
    }

    #[test]
    fn test_all_records_dropped() {
        let records = vec![
            record(&[("time", "bad"), ("cpu", "1")]),
            record(&[("time", "worse"), ("cpu", "2")]),
        ];

        let classifier = utc_classifier();
        let timed = classifier.attach_times(&records);
        let classified = classifier.classify(&timed.records);

        assert!(timed.records.is_empty());
        assert_eq!(timed.dropped, 2);
        assert!(classified.records.is_empty());
        assert!(classified.classification.is_empty());
    }

    #[test]
    fn test_classification_is_all_or_nothing() {
        let records = vec![
            record(&[("time", "2023-01-01 10:00:00"), ("latency", "10"), ("cpu", "1.5")]),
            record(&[("time", "2023-01-01 10:00:01"), ("latency", "n/a"), ("cpu", "2")]),
            record(&[("time", "2023-01-01 10:00:02"), ("cpu", "-3e2")]),
        ];

        let classifier = utc_classifier();
        let timed = classifier.attach_times(&records);
        let classified = classifier.classify(&timed.records);

        assert_eq!(
            classified.classification.get("latency"),
            Some(FieldKind::Categorical)
        );
        assert_eq!(classified.classification.get("cpu"), Some(FieldKind::Numeric));

        // Both latency values kept verbatim
        assert_eq!(classified.records[0].categorical["latency"], "10");
        assert_eq!(classified.records[1].categorical["latency"], "n/a");
        assert!(!classified.records[2].categorical.contains_key("latency"));

        assert_eq!(classified.records[2].numeric["cpu"], Some(-300.0));
    }

    #[test]
    fn test_time_and_reserved_fields_are_not_classified() {
        let records = vec![record(&[
            ("time", "2023-01-01 10:00:00"),
            ("__time__", "1672567200"),
            ("__source__", "10.0.0.1"),
            ("status", "200"),
        ])];

        let classifier = utc_classifier();
        let timed = classifier.attach_times(&records);
        let classified = classifier.classify(&timed.records);

        assert_eq!(classified.classification.len(), 1);
        assert_eq!(classified.classification.get("time"), None);
        assert_eq!(classified.classification.get("__time__"), None);
        assert!(classified.classification.is_numeric("status"));

        let typed = &classified.records[0];
        assert_eq!(typed.numeric.len(), 1);
        assert!(typed.categorical.is_empty());
    }

    #[test]
    fn test_nan_and_infinity_are_categorical() {
        let records = vec![
            record(&[("time", "2023-01-01 10:00:00"), ("status", "NaN"), ("v", "1")]),
            record(&[("time", "2023-01-01 10:00:01"), ("status", "infinity"), ("v", "2")]),
            record(&[("time", "2023-01-01 10:00:02"), ("status", "inf"), ("v", "3")]),
        ];

        let classifier = utc_classifier();
        let timed = classifier.attach_times(&records);
        let classified = classifier.classify(&timed.records);

        assert_eq!(
            classified.classification.get("status"),
            Some(FieldKind::Categorical)
        );
        assert_eq!(classified.classification.get("v"), Some(FieldKind::Numeric));
        assert_eq!(classified.records[1].categorical["status"], "infinity");

        assert_eq!(parse_number("-inf"), None);
        assert_eq!(parse_number("1e3"), Some(1000.0));
    }

    #[test]
    fn test_empty_string_is_categorical() {
        let records = vec![
            record(&[("time", "2023-01-01 10:00:00"), ("code", "")]),
            record(&[("time", "2023-01-01 10:00:01"), ("code", "404")]),
        ];

        let classifier = utc_classifier();
        let timed = classifier.attach_times(&records);
        let classified = classifier.classify(&timed.records);

        assert_eq!(classified.classification.get("code"), Some(FieldKind::Categorical));
    }

    #[test]
    fn test_classification_independent_of_record_order() {
        let forward = vec![
            record(&[("time", "2023-01-01 10:00:00"), ("v", "1")]),
            record(&[("time", "2023-01-01 10:00:01"), ("v", "x")]),
        ];
        let backward: Vec<RawRecord> = forward.iter().rev().cloned().collect();

        let classifier = utc_classifier();
        let a = classifier.classify(&classifier.attach_times(&forward).records);
        let b = classifier.classify(&classifier.attach_times(&backward).records);

        assert_eq!(a.classification, b.classification);
    }
}

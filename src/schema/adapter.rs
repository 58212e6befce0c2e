//! Adapter for reading care.event.v1 logs
//!
//! Hosts export their event history as a JSON array or as NDJSON, one
//! record per line. This module parses either shape into [`EventRecord`]s
//! and converts validated records into the core [`Event`] type the
//! forecasting engine consumes.

use crate::error::EngineError;
use crate::schema::record::{EventRecord, ValidationError};
use crate::types::Event;

/// Adapter for converting serialized event logs into engine events
pub struct EventLogAdapter;

impl EventLogAdapter {
    /// Parse a JSON string containing an array of EventRecords
    pub fn parse_array(json: &str) -> Result<Vec<EventRecord>, EngineError> {
        let records: Vec<EventRecord> = serde_json::from_str(json)?;
        Ok(records)
    }

    /// Parse NDJSON (newline-delimited JSON) containing EventRecords
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<EventRecord>, EngineError> {
        let mut records = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<EventRecord>(trimmed) {
                Ok(record) => records.push(record),
                Err(e) => {
                    return Err(EngineError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(records)
    }

    /// Convert records into engine events, validating each one
    ///
    /// Fails on the first invalid record; use [`validate_events`] to collect
    /// every problem in a log instead.
    ///
    /// [`validate_events`]: EventLogAdapter::validate_events
    pub fn to_events(records: Vec<EventRecord>) -> Result<Vec<Event>, EngineError> {
        records
            .into_iter()
            .enumerate()
            .map(|(idx, record)| {
                record
                    .into_event()
                    .map_err(|e| EngineError::InvalidRecord(format!("record {}: {}", idx, e)))
            })
            .collect()
    }

    /// Validate a batch of records, reporting every failure
    pub fn validate_events(records: &[EventRecord]) -> Vec<ValidationResult> {
        records
            .iter()
            .enumerate()
            .map(|(idx, record)| ValidationResult {
                index: idx,
                event_id: record.event_id.clone(),
                error: record.validate().err(),
            })
            .filter(|r| r.error.is_some())
            .collect()
    }
}

/// One failed record from a batch validation
#[derive(Debug)]
pub struct ValidationResult {
    pub index: usize,
    pub event_id: Option<String>,
    pub error: Option<ValidationError>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActivityKind, DiaperKind, FeedingMethod};
    use chrono::{TimeZone, Utc};

    fn sample_records() -> Vec<EventRecord> {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap();
        vec![
            EventRecord::feeding(FeedingMethod::Bottle, base).with_amount(100.0),
            EventRecord::diaper(DiaperKind::Wet, base + chrono::Duration::minutes(45)),
            EventRecord::sleep(base + chrono::Duration::hours(2))
                .with_ended_at(base + chrono::Duration::hours(3)),
        ]
    }

    #[test]
    fn test_parse_array() {
        let json = serde_json::to_string(&sample_records()).unwrap();
        let records = EventLogAdapter::parse_array(&json).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].activity.kind(), ActivityKind::Feeding);
    }

    #[test]
    fn test_parse_ndjson() {
        let ndjson = r#"{"schema_version":"care.event.v1","activity":{"type":"feeding","method":"bottle"},"recorded_at":"2024-03-01T06:00:00Z","amount_ml":100.0}

{"schema_version":"care.event.v1","activity":{"type":"diaper","kind":"dirty"},"recorded_at":"2024-03-01T06:45:00Z"}"#;

        let records = EventLogAdapter::parse_ndjson(ndjson).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].activity.kind(), ActivityKind::Diaper);
    }

    #[test]
    fn test_parse_ndjson_reports_line_number() {
        let ndjson = r#"{"schema_version":"care.event.v1","activity":{"type":"pumping"},"recorded_at":"2024-03-01T06:00:00Z"}
not json at all"#;

        let err = EventLogAdapter::parse_ndjson(ndjson).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_to_events() {
        let events = EventLogAdapter::to_events(sample_records()).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].amount_ml, Some(100.0));
        assert!(events[2].end_time.is_some());
    }

    #[test]
    fn test_to_events_rejects_invalid_record() {
        let mut records = sample_records();
        records[1] = records[1].clone().with_amount(30.0); // amount on a diaper

        let err = EventLogAdapter::to_events(records).unwrap_err();
        assert!(err.to_string().contains("record 1"));
    }

    #[test]
    fn test_validate_events_collects_failures() {
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 6, 0, 0).unwrap();
        let mut bad = EventRecord::feeding(FeedingMethod::Nursing, base);
        bad.schema_version = "care.event.v0".to_string();

        let records = vec![
            EventRecord::diaper(DiaperKind::Both, base),
            bad,
            EventRecord::feeding(FeedingMethod::Bottle, base).with_amount(-10.0),
        ];

        let results = EventLogAdapter::validate_events(&records);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].index, 1);
        assert_eq!(results[1].index, 2);
    }

    #[test]
    fn test_validate_events_all_valid() {
        let results = EventLogAdapter::validate_events(&sample_records());
        assert!(results.is_empty());
    }
}

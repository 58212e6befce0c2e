//! care.event.v1 schema definition
//!
//! The wire format hosts use to hand event logs to the engine. One record
//! per logged occurrence: an activity payload tagged by type, the
//! timestamps, optional measurements, and the outcome/scheduled flags.
//! Records validate independently of parsing, so a host can check a log
//! without running a forecast.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{ActivityDetail, ActivityKind, DiaperKind, Event, EventOutcome, FeedingMethod, SleepKind};

/// Current schema version
pub const SCHEMA_VERSION: &str = "care.event.v1";

/// The main care.event.v1 record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Schema version identifier
    pub schema_version: String,
    /// Unique event identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    /// Activity payload, tagged by type
    pub activity: ActivityDetail,
    /// When the event started (UTC)
    pub recorded_at: DateTime<Utc>,
    /// When the event ended, if tracked (UTC)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    /// Volume in milliliters; feeding and pumping only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_ml: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,
    #[serde(default)]
    pub outcome: EventOutcome,
    #[serde(default)]
    pub scheduled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl EventRecord {
    fn new(activity: ActivityDetail, recorded_at: DateTime<Utc>) -> Self {
        EventRecord {
            schema_version: SCHEMA_VERSION.to_string(),
            event_id: Some(uuid::Uuid::new_v4().to_string()),
            activity,
            recorded_at,
            ended_at: None,
            amount_ml: None,
            duration_minutes: None,
            outcome: EventOutcome::Completed,
            scheduled: false,
            note: None,
        }
    }

    /// Create a feeding record
    pub fn feeding(method: FeedingMethod, recorded_at: DateTime<Utc>) -> Self {
        Self::new(ActivityDetail::Feeding { method }, recorded_at)
    }

    /// Create a diaper record
    pub fn diaper(kind: DiaperKind, recorded_at: DateTime<Utc>) -> Self {
        Self::new(ActivityDetail::Diaper { kind }, recorded_at)
    }

    /// Create a sleep record; the nap/night kind can be added later
    pub fn sleep(recorded_at: DateTime<Utc>) -> Self {
        Self::new(ActivityDetail::Sleep { kind: None }, recorded_at)
    }

    /// Create a pumping record
    pub fn pumping(recorded_at: DateTime<Utc>) -> Self {
        Self::new(ActivityDetail::Pumping, recorded_at)
    }

    /// Create a record for an uncategorized activity
    pub fn other(recorded_at: DateTime<Utc>) -> Self {
        Self::new(ActivityDetail::Other, recorded_at)
    }

    pub fn with_sleep_kind(mut self, kind: SleepKind) -> Self {
        if let ActivityDetail::Sleep { kind: slot } = &mut self.activity {
            *slot = Some(kind);
        }
        self
    }

    pub fn with_amount(mut self, amount_ml: f64) -> Self {
        self.amount_ml = Some(amount_ml);
        self
    }

    pub fn with_duration(mut self, duration_minutes: f64) -> Self {
        self.duration_minutes = Some(duration_minutes);
        self
    }

    pub fn with_ended_at(mut self, ended_at: DateTime<Utc>) -> Self {
        self.ended_at = Some(ended_at);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Mark the record as a dismissed reminder rather than a real event
    pub fn skipped(mut self) -> Self {
        self.outcome = EventOutcome::Skipped;
        self
    }

    /// Mark the record as a future plan
    pub fn planned(mut self) -> Self {
        self.scheduled = true;
        self
    }

    /// Validate the record schema
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(ValidationError::InvalidSchemaVersion {
                expected: SCHEMA_VERSION.to_string(),
                actual: self.schema_version.clone(),
            });
        }

        if let Some(amount) = self.amount_ml {
            if !(amount >= 0.0 && amount.is_finite()) {
                return Err(ValidationError::InvalidAmount(amount));
            }
            match self.activity.kind() {
                ActivityKind::Feeding | ActivityKind::Pumping => {}
                kind => {
                    return Err(ValidationError::AmountNotApplicable {
                        activity: kind.as_str(),
                    })
                }
            }
        }

        if let Some(duration) = self.duration_minutes {
            if !(duration >= 0.0 && duration.is_finite()) {
                return Err(ValidationError::InvalidDuration(duration));
            }
        }

        if let Some(ended_at) = self.ended_at {
            if ended_at <= self.recorded_at {
                return Err(ValidationError::EndBeforeStart {
                    recorded_at: self.recorded_at,
                    ended_at,
                });
            }
        }

        Ok(())
    }

    /// Convert into a core [`Event`], validating first.
    pub fn into_event(self) -> Result<Event, ValidationError> {
        self.validate()?;
        Ok(Event {
            detail: self.activity,
            start_time: self.recorded_at,
            end_time: self.ended_at,
            amount_ml: self.amount_ml,
            duration_minutes: self.duration_minutes,
            outcome: self.outcome,
            scheduled: self.scheduled,
            note: self.note,
        })
    }
}

/// Validation errors for event records
#[derive(Debug, Clone, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid schema version: expected {expected}, got {actual}")]
    InvalidSchemaVersion { expected: String, actual: String },

    #[error("amount_ml must be a finite non-negative number, got {0}")]
    InvalidAmount(f64),

    #[error("duration_minutes must be a finite non-negative number, got {0}")]
    InvalidDuration(f64),

    #[error("ended_at {ended_at} is not after recorded_at {recorded_at}")]
    EndBeforeStart {
        recorded_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
    },

    #[error("amount_ml does not apply to {activity} events")]
    AmountNotApplicable { activity: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_serialize_feeding_record() {
        let record = EventRecord::feeding(FeedingMethod::Bottle, noon()).with_amount(110.0);
        let json = serde_json::to_string_pretty(&record).unwrap();

        assert!(json.contains("care.event.v1"));
        assert!(json.contains("\"type\": \"feeding\""));
        assert!(json.contains("bottle"));
        assert!(json.contains("110"));
    }

    #[test]
    fn test_deserialize_minimal_record() {
        let json = r#"{
            "schema_version": "care.event.v1",
            "activity": {"type": "diaper", "kind": "wet"},
            "recorded_at": "2024-03-01T08:30:00Z"
        }"#;

        let record: EventRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.schema_version, SCHEMA_VERSION);
        assert_eq!(record.outcome, EventOutcome::Completed);
        assert!(!record.scheduled);
        assert_eq!(record.event_id, None);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_constructors_get_event_ids() {
        let record = EventRecord::sleep(noon()).with_sleep_kind(SleepKind::Nap);
        assert!(record.event_id.is_some());
        assert_eq!(
            record.activity,
            ActivityDetail::Sleep {
                kind: Some(SleepKind::Nap)
            }
        );
    }

    #[test]
    fn test_validate_rejects_wrong_schema_version() {
        let mut record = EventRecord::diaper(DiaperKind::Wet, noon());
        record.schema_version = "care.event.v2".to_string();
        assert!(matches!(
            record.validate(),
            Err(ValidationError::InvalidSchemaVersion { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_negative_measurements() {
        let record = EventRecord::feeding(FeedingMethod::Bottle, noon()).with_amount(-5.0);
        assert!(matches!(
            record.validate(),
            Err(ValidationError::InvalidAmount(_))
        ));

        let record = EventRecord::sleep(noon()).with_duration(-1.0);
        assert!(matches!(
            record.validate(),
            Err(ValidationError::InvalidDuration(_))
        ));
    }

    #[test]
    fn test_validate_rejects_amount_on_diaper() {
        let record = EventRecord::diaper(DiaperKind::Wet, noon()).with_amount(50.0);
        assert!(matches!(
            record.validate(),
            Err(ValidationError::AmountNotApplicable { activity: "diaper" })
        ));
    }

    #[test]
    fn test_validate_allows_amount_on_pumping() {
        let record = EventRecord::pumping(noon()).with_amount(90.0);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_end_before_start() {
        let record =
            EventRecord::sleep(noon()).with_ended_at(noon() - chrono::Duration::minutes(10));
        assert!(matches!(
            record.validate(),
            Err(ValidationError::EndBeforeStart { .. })
        ));

        let record = EventRecord::sleep(noon()).with_ended_at(noon());
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_into_event_maps_fields() {
        let ended = noon() + chrono::Duration::minutes(25);
        let event = EventRecord::feeding(FeedingMethod::Nursing, noon())
            .with_ended_at(ended)
            .with_duration(25.0)
            .with_note("fussy before this one")
            .into_event()
            .unwrap();

        assert_eq!(event.kind(), ActivityKind::Feeding);
        assert_eq!(event.start_time, noon());
        assert_eq!(event.end_time, Some(ended));
        assert_eq!(event.duration_minutes, Some(25.0));
        assert_eq!(event.note.as_deref(), Some("fussy before this one"));
        assert!(event.is_observation());
    }

    #[test]
    fn test_into_event_rejects_invalid_record() {
        let result = EventRecord::diaper(DiaperKind::Both, noon())
            .with_amount(10.0)
            .into_event();
        assert!(result.is_err());
    }
}

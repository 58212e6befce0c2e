//! Core types for the carecast engine
//!
//! This module defines the data structures that flow through the engine:
//! care events, forecasts with their calculation breakdowns, preference
//! blending results, daily goals, and the versioned report envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The activity families the engine forecasts.
///
/// `Pumping` and `Other` events are retained in the log and counted in
/// summaries, but only feeding, diaper, and sleep have forecast models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Feeding,
    Diaper,
    Sleep,
    Pumping,
    Other,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Feeding => "feeding",
            ActivityKind::Diaper => "diaper",
            ActivityKind::Sleep => "sleep",
            ActivityKind::Pumping => "pumping",
            ActivityKind::Other => "other",
        }
    }
}

/// How a feeding was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedingMethod {
    Bottle,
    Nursing,
    Solids,
}

/// What a diaper change found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiaperKind {
    Wet,
    Dirty,
    Both,
}

/// Daytime nap or overnight sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepKind {
    Nap,
    Night,
}

/// Activity-specific payload carried by an event.
///
/// Serialized as a tagged union, e.g. `{"type": "feeding", "method": "bottle"}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivityDetail {
    Feeding {
        method: FeedingMethod,
    },
    Diaper {
        kind: DiaperKind,
    },
    Sleep {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        kind: Option<SleepKind>,
    },
    Pumping,
    Other,
}

impl ActivityDetail {
    /// The activity family this detail belongs to.
    pub fn kind(&self) -> ActivityKind {
        match self {
            ActivityDetail::Feeding { .. } => ActivityKind::Feeding,
            ActivityDetail::Diaper { .. } => ActivityKind::Diaper,
            ActivityDetail::Sleep { .. } => ActivityKind::Sleep,
            ActivityDetail::Pumping => ActivityKind::Pumping,
            ActivityDetail::Other => ActivityKind::Other,
        }
    }
}

/// Whether a logged event actually happened.
///
/// Skipped events never enter interval statistics, but the most recent skip
/// still suppresses overdue alerts for one predicted interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventOutcome {
    Completed,
    Skipped,
}

impl Default for EventOutcome {
    fn default() -> Self {
        EventOutcome::Completed
    }
}

/// A single care event in the log.
///
/// `start_time` anchors all interval math; `end_time` is display metadata.
/// Scheduled events are plans, not observations, and stay out of interval
/// statistics alongside skips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub detail: ActivityDetail,
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Feeding or pumping volume in milliliters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_ml: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,
    #[serde(default)]
    pub outcome: EventOutcome,
    /// True for future plans entered by the caregiver.
    #[serde(default)]
    pub scheduled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Event {
    /// A completed, unscheduled event with no measurements attached.
    pub fn completed(detail: ActivityDetail, start_time: DateTime<Utc>) -> Self {
        Event {
            detail,
            start_time,
            end_time: None,
            amount_ml: None,
            duration_minutes: None,
            outcome: EventOutcome::Completed,
            scheduled: false,
            note: None,
        }
    }

    /// An event the caregiver marked as skipped.
    pub fn skipped(detail: ActivityDetail, start_time: DateTime<Utc>) -> Self {
        Event {
            outcome: EventOutcome::Skipped,
            ..Event::completed(detail, start_time)
        }
    }

    /// A planned future event.
    pub fn planned(detail: ActivityDetail, start_time: DateTime<Utc>) -> Self {
        Event {
            scheduled: true,
            ..Event::completed(detail, start_time)
        }
    }

    pub fn with_amount(mut self, amount_ml: f64) -> Self {
        self.amount_ml = Some(amount_ml);
        self
    }

    pub fn with_duration(mut self, duration_minutes: f64) -> Self {
        self.duration_minutes = Some(duration_minutes);
        self
    }

    pub fn with_end_time(mut self, end_time: DateTime<Utc>) -> Self {
        self.end_time = Some(end_time);
        self
    }

    /// The activity family of this event.
    pub fn kind(&self) -> ActivityKind {
        self.detail.kind()
    }

    /// True when the event is a real observation: completed and not a plan.
    pub fn is_observation(&self) -> bool {
        self.outcome == EventOutcome::Completed && !self.scheduled
    }
}

/// Confidence tier attached to every forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceTier {
    Low,
    Medium,
    High,
}

impl ConfidenceTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceTier::Low => "low",
            ConfidenceTier::Medium => "medium",
            ConfidenceTier::High => "high",
        }
    }
}

/// Where the next predicted event sits relative to the reference time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForecastStatus {
    Upcoming,
    Soon,
    Overdue,
}

impl ForecastStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForecastStatus::Upcoming => "upcoming",
            ForecastStatus::Soon => "soon",
            ForecastStatus::Overdue => "overdue",
        }
    }
}

/// The weights applied to each term of an interval prediction.
///
/// Weights always sum to 1 because absent terms substitute the age-based
/// interval instead of being renormalized away.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TermWeights {
    pub age_based: f64,
    pub recent_average: f64,
    pub last_interval: f64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub feeding_correlation: f64,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub sleep_correlation: f64,
}

fn is_zero(v: &f64) -> bool {
    *v == 0.0
}

/// A cross-activity correlation term as it entered a prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationContribution {
    /// Mean signed trigger-to-diaper offset across matched pairs, in
    /// minutes. Negative when the diaper precedes the trigger.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_offset_minutes: Option<f64>,
    /// Matched pair count over the required count, capped at 1.
    pub confidence: f64,
    pub matched_pairs: usize,
    /// The interval value this term contributed, in hours.
    pub term_hours: f64,
}

/// Full accounting of how a predicted interval was produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationBreakdown {
    pub age_based_hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recent_average_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_interval_hours: Option<f64>,
    /// Valid inter-event gaps in hours, most recent first, after truncation
    /// and the validity ceiling.
    pub sample_hours: Vec<f64>,
    pub valid_sample_count: usize,
    pub weights: TermWeights,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feeding_correlation: Option<CorrelationContribution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_correlation: Option<CorrelationContribution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_override_hours: Option<f64>,
    /// Age-banded guidance line for this activity.
    pub guidance: String,
}

/// Attributes of the last observed event, carried for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSnapshot {
    pub detail: ActivityDetail,
    pub time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_ml: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,
}

impl From<&Event> for EventSnapshot {
    fn from(event: &Event) -> Self {
        EventSnapshot {
            detail: event.detail,
            time: event.start_time,
            amount_ml: event.amount_ml,
            duration_minutes: event.duration_minutes,
        }
    }
}

/// A forecast for one activity at a reference time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub activity: ActivityKind,
    pub predicted_interval_hours: f64,
    pub next_time: DateTime<Utc>,
    pub confidence: ConfidenceTier,
    pub status: ForecastStatus,
    /// Signed minutes from the reference time to `next_time`. Negative once
    /// the predicted time has passed.
    pub minutes_until: f64,
    pub is_overdue: bool,
    /// Minutes past due, present only when overdue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overdue_minutes: Option<f64>,
    /// Pulled-in check time after a skip, present only while a skip is
    /// suppressing overdue status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recovery_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_event: Option<EventSnapshot>,
    pub breakdown: CalculationBreakdown,
}

/// The origin that dominated a blended value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendSource {
    Custom,
    Recent,
    AgeBased,
    Blended,
}

impl BlendSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlendSource::Custom => "custom",
            BlendSource::Recent => "recent",
            BlendSource::AgeBased => "age_based",
            BlendSource::Blended => "blended",
        }
    }
}

/// One input to a preference blend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendComponent {
    pub source: BlendSource,
    pub present: bool,
    /// Effective weight after redistribution over present components.
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    pub contribution: f64,
}

/// A blended suggestion value with its component accounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendResult {
    pub value: f64,
    pub source: BlendSource,
    pub components: Vec<BlendComponent>,
}

/// Relative weights for the custom / recent / age-based blend inputs.
///
/// Only ratios matter; weights are normalized over the inputs that are
/// actually present.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendWeights {
    pub custom: f64,
    pub recent: f64,
    pub age_based: f64,
}

impl Default for BlendWeights {
    fn default() -> Self {
        BlendWeights {
            custom: 0.4,
            recent: 0.4,
            age_based: 0.2,
        }
    }
}

/// Caregiver preferences for feeding suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CarePreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feeding_amount_ml: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feeding_duration_minutes: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blend_weights: Option<BlendWeights>,
}

/// Per-activity manual interval overrides, in hours.
///
/// An override replaces the weighted interval entirely; the breakdown still
/// records what the model would have said.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IntervalOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feeding_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diaper_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_hours: Option<f64>,
}

impl IntervalOverrides {
    pub fn for_kind(&self, kind: ActivityKind) -> Option<f64> {
        match kind {
            ActivityKind::Feeding => self.feeding_hours,
            ActivityKind::Diaper => self.diaper_hours,
            ActivityKind::Sleep => self.sleep_hours,
            _ => None,
        }
    }
}

/// Engine configuration supplied by the host.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CareConfig {
    /// Needed for age-banded norms; without it the engine falls back to
    /// age-agnostic defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub overrides: IntervalOverrides,
    #[serde(default)]
    pub preferences: CarePreferences,
}

/// Blended feeding amount and duration suggestions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedingSuggestions {
    /// Suggested amount in milliliters.
    pub amount: BlendResult,
    /// Suggested duration in minutes.
    pub duration: BlendResult,
}

/// A per-activity daily goal with its age/pattern mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalEstimate {
    /// Expected events per day.
    pub count: u32,
    /// Expected total feeding volume; feeding goals only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_ml: Option<f64>,
    pub age_weight: f64,
    pub pattern_weight: f64,
    pub weighted_interval_hours: f64,
}

/// Daily goals across the forecast activities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyGoals {
    pub feedings: GoalEstimate,
    pub diapers: GoalEstimate,
    pub sleeps: GoalEstimate,
}

/// Everything the engine computes in one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CareSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_days: Option<u32>,
    pub feeding: Forecast,
    pub diaper: Forecast,
    pub sleep: Forecast,
    pub suggestions: FeedingSuggestions,
    pub goals: DailyGoals,
    /// Number of events the engine saw, including skips and plans.
    pub events_considered: usize,
}

/// Identifies the engine build that produced a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    /// Random per-report id for tracing.
    pub instance_id: String,
}

/// Versioned envelope around a [`CareSummary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    /// Report schema version, `care.forecast.v1`.
    pub schema_version: String,
    pub producer: ReportProducer,
    /// Reference time of the computation, RFC3339.
    pub reference_time_utc: String,
    pub summary: CareSummary,
}

//! Per-activity forecasters
//!
//! One [`ActivityForecaster`] per activity, all running the same pipeline:
//! filter and window the log, extract interval samples, blend under the
//! policy's weight schedule, then resolve overdue/skip status at the
//! reference time. The constructors differ only in policy; the diaper
//! forecaster additionally runs the correlation analyses over the feeding
//! and sleep streams.

pub mod blender;
pub mod policy;
pub mod status;

pub use blender::{blend_interval, BlendOutcome, CorrelationSignals};
pub use policy::ForecastPolicy;
pub use status::{resolve_status, StatusOutcome};

use chrono::{DateTime, Utc};

use crate::correlation;
use crate::intervals::{self, hours_after};
use crate::norms;
use crate::types::{ActivityKind, CareConfig, Event, EventSnapshot, Forecast};

/// Orchestrates one activity's forecast end to end.
#[derive(Debug, Clone)]
pub struct ActivityForecaster {
    policy: ForecastPolicy,
}

impl ActivityForecaster {
    pub fn feeding() -> Self {
        ActivityForecaster {
            policy: ForecastPolicy::feeding(),
        }
    }

    pub fn diaper() -> Self {
        ActivityForecaster {
            policy: ForecastPolicy::diaper(),
        }
    }

    pub fn sleep() -> Self {
        ActivityForecaster {
            policy: ForecastPolicy::sleep(),
        }
    }

    pub fn policy(&self) -> &ForecastPolicy {
        &self.policy
    }

    /// Forecast this activity at `now` from the full event log.
    ///
    /// The log may arrive in any order and may mix activities; filtering,
    /// sorting, and windowing happen here. `now` is always supplied by the
    /// caller, so the same log and instant reproduce the same forecast.
    pub fn forecast(
        &self,
        events: &[Event],
        config: &CareConfig,
        age_days: Option<u32>,
        now: DateTime<Utc>,
    ) -> Forecast {
        let kind = self.policy.activity;
        let window = intervals::recent_observations(events, kind, self.policy.truncation);
        let samples = intervals::extract_samples(&window, self.policy.validity_ceiling_hours);

        let correlations = if self.policy.uses_correlation {
            let feedings = intervals::observations(events, ActivityKind::Feeding);
            let sleeps = intervals::observations(events, ActivityKind::Sleep);
            let diapers = intervals::observations(events, ActivityKind::Diaper);
            CorrelationSignals {
                feeding: Some(correlation::feeding_to_diaper(&feedings, &diapers)),
                sleep: Some(correlation::sleep_to_diaper(&sleeps, &diapers)),
            }
        } else {
            CorrelationSignals::none()
        };

        let age_based = norms::interval_hours(kind, age_days);
        let guidance = norms::guidance(kind, age_days);
        let threshold = norms::overdue_threshold_minutes(kind, age_days);

        let outcome = blend_interval(&self.policy, age_based, &samples, &correlations, guidance);
        let mut breakdown = outcome.breakdown;
        let mut predicted = outcome.predicted_interval_hours;

        if let Some(override_hours) = config.overrides.for_kind(kind) {
            breakdown.manual_override_hours = Some(override_hours);
            predicted = self.policy.clamp(override_hours);
        }

        let last = intervals::last_observation(events, kind);
        let next_time = match last {
            Some(event) => hours_after(event.start_time, predicted),
            None => hours_after(now, age_based),
        };

        let skip_time = intervals::last_skip(events, kind, now).map(|e| e.start_time);
        let resolved = resolve_status(next_time, now, threshold, predicted, skip_time);

        Forecast {
            activity: kind,
            predicted_interval_hours: predicted,
            next_time,
            confidence: outcome.confidence,
            status: resolved.status,
            minutes_until: resolved.minutes_until,
            is_overdue: resolved.is_overdue,
            overdue_minutes: resolved.overdue_minutes,
            recovery_time: resolved.recovery_time,
            last_event: last.map(EventSnapshot::from),
            breakdown,
        }
    }
}

//! Engine facade
//!
//! The public API of carecast. Stateless functions cover single forecasts;
//! [`CareEngine`] holds configuration plus a report instance id for hosts
//! that want the full versioned report envelope.
//!
//! Nothing here reads a clock. The reference instant is always a
//! parameter, which is what makes forecasts reproducible and lets hosts
//! backtest by replaying a trimmed log at a past instant.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::age::age_in_days;
use crate::error::EngineError;
use crate::forecast::ActivityForecaster;
use crate::goals;
use crate::suggest;
use crate::types::{
    CareConfig, CareSummary, DailyGoals, Event, FeedingSuggestions, Forecast, ForecastReport,
    ReportProducer,
};
use crate::{CARECAST_VERSION, PRODUCER_NAME};

/// Current forecast report schema version.
pub const REPORT_VERSION: &str = "care.forecast.v1";

/// Feeding forecast at `now` from the full event log.
pub fn forecast_feeding(events: &[Event], config: &CareConfig, now: DateTime<Utc>) -> Forecast {
    let age_days = resolve_age_days(config, now);
    ActivityForecaster::feeding().forecast(events, config, age_days, now)
}

/// Diaper forecast at `now` from the full event log.
pub fn forecast_diaper(events: &[Event], config: &CareConfig, now: DateTime<Utc>) -> Forecast {
    let age_days = resolve_age_days(config, now);
    ActivityForecaster::diaper().forecast(events, config, age_days, now)
}

/// Sleep forecast at `now` from the full event log.
pub fn forecast_sleep(events: &[Event], config: &CareConfig, now: DateTime<Utc>) -> Forecast {
    let age_days = resolve_age_days(config, now);
    ActivityForecaster::sleep().forecast(events, config, age_days, now)
}

/// Blended feeding amount/duration suggestions at `now`.
pub fn feeding_suggestions(
    events: &[Event],
    config: &CareConfig,
    now: DateTime<Utc>,
) -> FeedingSuggestions {
    suggest::feeding_suggestions(events, config, resolve_age_days(config, now))
}

/// Daily count/volume goals at `now`.
pub fn daily_goals(events: &[Event], config: &CareConfig, now: DateTime<Utc>) -> DailyGoals {
    forecast_all(events, config, now).goals
}

/// Everything in one pass: three forecasts, suggestions, and goals.
pub fn forecast_all(events: &[Event], config: &CareConfig, now: DateTime<Utc>) -> CareSummary {
    let age_days = resolve_age_days(config, now);

    let feeding = ActivityForecaster::feeding().forecast(events, config, age_days, now);
    let diaper = ActivityForecaster::diaper().forecast(events, config, age_days, now);
    let sleep = ActivityForecaster::sleep().forecast(events, config, age_days, now);

    let suggestions = suggest::feeding_suggestions(events, config, age_days);
    let goals = goals::daily_goals(events, &feeding, &diaper, &sleep, suggestions.amount.value);

    CareSummary {
        age_days,
        feeding,
        diaper,
        sleep,
        suggestions,
        goals,
        events_considered: events.len(),
    }
}

fn resolve_age_days(config: &CareConfig, now: DateTime<Utc>) -> Option<u32> {
    config.birth_date.map(|birth| age_in_days(birth, now))
}

/// Configured engine that can emit versioned forecast reports.
pub struct CareEngine {
    config: CareConfig,
    instance_id: String,
}

impl Default for CareEngine {
    fn default() -> Self {
        Self::new(CareConfig::default())
    }
}

impl CareEngine {
    /// An engine with a fresh random instance id.
    pub fn new(config: CareConfig) -> Self {
        CareEngine {
            config,
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// An engine with a caller-chosen instance id, for stable test output.
    pub fn with_instance_id(config: CareConfig, instance_id: String) -> Self {
        CareEngine {
            config,
            instance_id,
        }
    }

    pub fn config(&self) -> &CareConfig {
        &self.config
    }

    /// Full summary at `now` under this engine's configuration.
    pub fn summarize(&self, events: &[Event], now: DateTime<Utc>) -> CareSummary {
        forecast_all(events, &self.config, now)
    }

    /// Versioned report envelope around [`CareEngine::summarize`].
    pub fn report(&self, events: &[Event], now: DateTime<Utc>) -> ForecastReport {
        ForecastReport {
            schema_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: CARECAST_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            reference_time_utc: now.to_rfc3339(),
            summary: self.summarize(events, now),
        }
    }

    /// Report serialized as pretty JSON.
    pub fn report_json(&self, events: &[Event], now: DateTime<Utc>) -> Result<String, EngineError> {
        let report = self.report(events, now);
        Ok(serde_json::to_string_pretty(&report)?)
    }
}

//! Daily goal estimation
//!
//! Goals answer "how many feedings/diapers/sleeps should today hold", not
//! "when is the next one". The interval behind a goal is a mix of the age
//! norm and the forecast interval, weighted by how much history exists:
//! a fresh log trusts age entirely, a long one trusts the observed pattern.

use crate::intervals::observations;
use crate::types::{ActivityKind, DailyGoals, Event, Forecast, GoalEstimate};

/// Age-vs-pattern weighting by historical observation count.
///
/// `≤5 → (1.0, 0.0); ≤10 → (0.7, 0.3); ≤20 → (0.5, 0.5); >20 → (0.3, 0.7)`.
pub fn age_pattern_weights(observation_count: usize) -> (f64, f64) {
    match observation_count {
        0..=5 => (1.0, 0.0),
        6..=10 => (0.7, 0.3),
        11..=20 => (0.5, 0.5),
        _ => (0.3, 0.7),
    }
}

fn estimate_for(
    kind: ActivityKind,
    events: &[Event],
    forecast: &Forecast,
    volume_per_event: Option<f64>,
) -> GoalEstimate {
    let history = observations(events, kind).len();
    let (age_weight, pattern_weight) = age_pattern_weights(history);
    let weighted = age_weight * forecast.breakdown.age_based_hours
        + pattern_weight * forecast.predicted_interval_hours;
    let count = (24.0 / weighted).round().max(1.0) as u32;
    GoalEstimate {
        count,
        volume_ml: volume_per_event.map(|per_event| count as f64 * per_event),
        age_weight,
        pattern_weight,
        weighted_interval_hours: weighted,
    }
}

/// Daily count goals per activity, plus a volume goal for feeding.
///
/// `suggested_amount_ml` is the blended per-feeding amount; the volume goal
/// is simply count × amount.
pub fn daily_goals(
    events: &[Event],
    feeding: &Forecast,
    diaper: &Forecast,
    sleep: &Forecast,
    suggested_amount_ml: f64,
) -> DailyGoals {
    DailyGoals {
        feedings: estimate_for(
            ActivityKind::Feeding,
            events,
            feeding,
            Some(suggested_amount_ml),
        ),
        diapers: estimate_for(ActivityKind::Diaper, events, diaper, None),
        sleeps: estimate_for(ActivityKind::Sleep, events, sleep, None),
    }
}

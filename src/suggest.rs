//! Preference blending for feeding suggestions
//!
//! Suggested amounts and durations come from three sources: the caregiver's
//! stated preference, the recent logged average, and the age-based norm.
//! Absent sources hand their weight to the sources that exist, so the
//! result is always a true weighted mean of real inputs. The full
//! weight/contribution accounting ships with every result.

use crate::intervals::recent_observations;
use crate::norms;
use crate::types::{
    ActivityKind, BlendComponent, BlendResult, BlendSource, BlendWeights, CareConfig, Event,
    FeedingSuggestions,
};

/// Number of recent feedings consulted for the logged averages.
const FEEDING_WINDOW: usize = 10;

/// Blend custom, recent, and age-based values under `weights`.
///
/// Special cases, in order:
/// - custom present and recent absent: the custom value verbatim, unrounded;
/// - custom and recent both absent: the age-based value;
/// - degenerate weights (no present source carries weight): the age-based
///   value.
///
/// Otherwise the absent sources' weight is redistributed proportionally
/// over the present ones and the weighted mean is rounded to a whole unit.
/// The label names the source contributing more than half the total, or
/// `Blended` when none does.
pub fn blend(
    custom: Option<f64>,
    recent: Option<f64>,
    age_based: f64,
    weights: &BlendWeights,
) -> BlendResult {
    if let (Some(value), None) = (custom, recent) {
        return single_source(value, BlendSource::Custom, custom, recent, age_based);
    }
    if custom.is_none() && recent.is_none() {
        return single_source(age_based, BlendSource::AgeBased, custom, recent, age_based);
    }

    let raw = [
        (BlendSource::Custom, custom, weights.custom),
        (BlendSource::Recent, recent, weights.recent),
        (BlendSource::AgeBased, Some(age_based), weights.age_based),
    ];

    let present_weight: f64 = raw
        .iter()
        .filter(|(_, value, _)| value.is_some())
        .map(|(_, _, weight)| weight)
        .sum();
    if present_weight <= 0.0 {
        return single_source(age_based, BlendSource::AgeBased, custom, recent, age_based);
    }

    let mut components = Vec::with_capacity(raw.len());
    let mut total = 0.0;
    for (source, value, weight) in raw {
        let (effective_weight, contribution) = match value {
            Some(v) => {
                let w = weight / present_weight;
                (w, w * v)
            }
            None => (0.0, 0.0),
        };
        total += contribution;
        components.push(BlendComponent {
            source,
            present: value.is_some(),
            weight: effective_weight,
            value,
            contribution,
        });
    }

    let source = dominant_source(&components, total);
    BlendResult {
        value: total.round(),
        source,
        components,
    }
}

/// The source contributing more than half the total, else `Blended`.
fn dominant_source(components: &[BlendComponent], total: f64) -> BlendSource {
    if total > 0.0 {
        for component in components {
            if component.contribution > 0.5 * total {
                return component.source;
            }
        }
    }
    BlendSource::Blended
}

fn single_source(
    value: f64,
    source: BlendSource,
    custom: Option<f64>,
    recent: Option<f64>,
    age_based: f64,
) -> BlendResult {
    let components = vec![
        BlendComponent {
            source: BlendSource::Custom,
            present: custom.is_some(),
            weight: if source == BlendSource::Custom { 1.0 } else { 0.0 },
            value: custom,
            contribution: if source == BlendSource::Custom { value } else { 0.0 },
        },
        BlendComponent {
            source: BlendSource::Recent,
            present: recent.is_some(),
            weight: 0.0,
            value: recent,
            contribution: 0.0,
        },
        BlendComponent {
            source: BlendSource::AgeBased,
            present: true,
            weight: if source == BlendSource::AgeBased { 1.0 } else { 0.0 },
            value: Some(age_based),
            contribution: if source == BlendSource::AgeBased { value } else { 0.0 },
        },
    ];
    BlendResult {
        value,
        source,
        components,
    }
}

/// Duration of an event in minutes, from the explicit field or the
/// start/end pair.
fn event_duration_minutes(event: &Event) -> Option<f64> {
    if event.duration_minutes.is_some() {
        return event.duration_minutes;
    }
    match event.end_time {
        Some(end) if end > event.start_time => {
            Some((end - event.start_time).num_milliseconds() as f64 / 60_000.0)
        }
        _ => None,
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Blended feeding amount and duration suggestions.
///
/// Recent values are means over the last [`FEEDING_WINDOW`] feedings that
/// carry the measurement; feedings without it simply don't contribute.
pub fn feeding_suggestions(
    events: &[Event],
    config: &CareConfig,
    age_days: Option<u32>,
) -> FeedingSuggestions {
    let window = recent_observations(events, ActivityKind::Feeding, FEEDING_WINDOW);

    let amounts: Vec<f64> = window.iter().filter_map(|e| e.amount_ml).collect();
    let durations: Vec<f64> = window
        .iter()
        .filter_map(|e| event_duration_minutes(e))
        .collect();

    let weights = config.preferences.blend_weights.unwrap_or_default();

    FeedingSuggestions {
        amount: blend(
            config.preferences.feeding_amount_ml,
            mean(&amounts),
            norms::feeding_amount_ml(age_days),
            &weights,
        ),
        duration: blend(
            config.preferences.feeding_duration_minutes,
            mean(&durations),
            norms::feeding_duration_minutes(age_days),
            &weights,
        ),
    }
}

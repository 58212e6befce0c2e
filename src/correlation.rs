//! Cross-activity correlation analysis
//!
//! Diapers do not happen on an independent clock: they follow feedings and
//! cluster around sleep. This module measures those couplings from the log
//! as a mean signed offset (diaper minus trigger, minutes) plus a
//! confidence score bounded by sample count, and projects them into an
//! implied next-diaper interval the blender can weight in.
//!
//! Used only by the diaper forecaster.

use chrono::{DateTime, Utc};

use crate::intervals::hours_between;
use crate::types::Event;

/// A diaper is expected within this window after a feeding.
pub const FEEDING_WINDOW_MINUTES: f64 = 240.0;
/// Matched feeding pairs needed for full confidence.
pub const FEEDING_REQUIRED_PAIRS: usize = 10;
/// A pre-sleep diaper counts within this window before the sleep.
pub const SLEEP_WINDOW_MINUTES: f64 = 120.0;
/// Matched sleep pairs needed for full confidence.
pub const SLEEP_REQUIRED_PAIRS: usize = 8;

/// Outcome of one correlation analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationEstimate {
    /// Mean signed trigger-to-diaper offset in minutes; `None` with no
    /// matched pairs.
    pub mean_offset_minutes: Option<f64>,
    /// `matched_pairs / required`, capped at 1.
    pub confidence: f64,
    pub matched_pairs: usize,
    /// The diaper interval implied by the trigger stream: elapsed time from
    /// the last diaper to `last_trigger + mean_offset`, in hours. Absent
    /// when non-positive or when either stream is empty.
    pub implied_interval_hours: Option<f64>,
}

impl CorrelationEstimate {
    fn empty() -> Self {
        CorrelationEstimate {
            mean_offset_minutes: None,
            confidence: 0.0,
            matched_pairs: 0,
            implied_interval_hours: None,
        }
    }
}

fn minutes_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 60_000.0
}

/// Correlates feedings with the diapers that follow them.
///
/// For each feeding, the FIRST diaper strictly after it and within
/// [`FEEDING_WINDOW_MINUTES`] counts as its match. Offsets are positive.
/// Both streams must be observations sorted ascending by start time.
pub fn feeding_to_diaper(feedings: &[&Event], diapers: &[&Event]) -> CorrelationEstimate {
    let offsets: Vec<f64> = feedings
        .iter()
        .filter_map(|feeding| {
            diapers
                .iter()
                .find(|d| d.start_time > feeding.start_time)
                .map(|d| minutes_between(feeding.start_time, d.start_time))
                .filter(|&offset| offset <= FEEDING_WINDOW_MINUTES)
        })
        .collect();
    estimate_from_offsets(offsets, FEEDING_REQUIRED_PAIRS, feedings, diapers)
}

/// Correlates sleeps with the diaper changes that precede them.
///
/// For each sleep, the diaper CLOSEST BEFORE it (strictly earlier, within
/// [`SLEEP_WINDOW_MINUTES`]) counts as its match. Offsets are negative.
/// Both streams must be observations sorted ascending by start time.
pub fn sleep_to_diaper(sleeps: &[&Event], diapers: &[&Event]) -> CorrelationEstimate {
    let offsets: Vec<f64> = sleeps
        .iter()
        .filter_map(|sleep| {
            diapers
                .iter()
                .rev()
                .find(|d| d.start_time < sleep.start_time)
                .map(|d| minutes_between(sleep.start_time, d.start_time))
                .filter(|&offset| offset >= -SLEEP_WINDOW_MINUTES)
        })
        .collect();
    estimate_from_offsets(offsets, SLEEP_REQUIRED_PAIRS, sleeps, diapers)
}

fn estimate_from_offsets(
    offsets: Vec<f64>,
    required_pairs: usize,
    triggers: &[&Event],
    diapers: &[&Event],
) -> CorrelationEstimate {
    if offsets.is_empty() {
        return CorrelationEstimate::empty();
    }

    let matched_pairs = offsets.len();
    let mean_offset = offsets.iter().sum::<f64>() / matched_pairs as f64;
    let confidence = (matched_pairs as f64 / required_pairs as f64).min(1.0);

    let implied = match (triggers.last(), diapers.last()) {
        (Some(trigger), Some(diaper)) => {
            // Hours from the last diaper to where the trigger rhythm says
            // the next one lands.
            let hours =
                hours_between(diaper.start_time, trigger.start_time) + mean_offset / 60.0;
            if hours > 0.0 {
                Some(hours)
            } else {
                None
            }
        }
        _ => None,
    };

    CorrelationEstimate {
        mean_offset_minutes: Some(mean_offset),
        confidence,
        matched_pairs,
        implied_interval_hours: implied,
    }
}

//! Interval extraction from the event log
//!
//! Turns a raw event log into the gap statistics the blender consumes:
//! filter one activity down to real observations, keep the most recent
//! window, and measure the hours between consecutive events. Gaps that are
//! non-positive (duplicate or out-of-order timestamps) or implausibly long
//! (a logging hiatus, not a care rhythm) are dropped rather than smoothed.

use chrono::{DateTime, Duration, Utc};

use crate::types::{ActivityKind, Event, EventOutcome};

/// Valid inter-event gap samples for one activity, most recent first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IntervalSamples {
    pub sample_hours: Vec<f64>,
}

impl IntervalSamples {
    pub fn valid_count(&self) -> usize {
        self.sample_hours.len()
    }

    /// Mean of the valid samples, or `None` with no samples.
    pub fn recent_average_hours(&self) -> Option<f64> {
        if self.sample_hours.is_empty() {
            return None;
        }
        let sum: f64 = self.sample_hours.iter().sum();
        Some(sum / self.sample_hours.len() as f64)
    }

    /// The most recent valid sample.
    pub fn last_interval_hours(&self) -> Option<f64> {
        self.sample_hours.first().copied()
    }
}

/// Hours between two instants, millisecond precision.
pub fn hours_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 3_600_000.0
}

/// `start` plus a fractional number of hours, millisecond precision.
pub fn hours_after(start: DateTime<Utc>, hours: f64) -> DateTime<Utc> {
    start + Duration::milliseconds((hours * 3_600_000.0).round() as i64)
}

/// All observations of `kind`, sorted ascending by start time.
///
/// Observations are completed, unscheduled events; skips and plans never
/// contribute to interval statistics. Input order does not matter.
pub fn observations<'a>(events: &'a [Event], kind: ActivityKind) -> Vec<&'a Event> {
    let mut observed: Vec<&Event> = events
        .iter()
        .filter(|e| e.kind() == kind && e.is_observation())
        .collect();
    observed.sort_by_key(|e| e.start_time);
    observed
}

/// The most recent `window` observations of `kind`, newest first.
pub fn recent_observations<'a>(
    events: &'a [Event],
    kind: ActivityKind,
    window: usize,
) -> Vec<&'a Event> {
    let mut observed = observations(events, kind);
    observed.reverse();
    observed.truncate(window);
    observed
}

/// Gap samples from a newest-first observation window.
///
/// A gap is valid iff `0 < hours < ceiling_hours`. With fewer than two
/// events there are no gaps at all.
pub fn extract_samples(window: &[&Event], ceiling_hours: f64) -> IntervalSamples {
    let sample_hours = window
        .windows(2)
        .map(|pair| hours_between(pair[1].start_time, pair[0].start_time))
        .filter(|&hours| hours > 0.0 && hours < ceiling_hours)
        .collect();
    IntervalSamples { sample_hours }
}

/// The most recent observation of `kind`, if any.
pub fn last_observation<'a>(events: &'a [Event], kind: ActivityKind) -> Option<&'a Event> {
    events
        .iter()
        .filter(|e| e.kind() == kind && e.is_observation())
        .max_by_key(|e| e.start_time)
}

/// The most recent skipped event of `kind` at or before `at`.
///
/// Future-dated skips are ignored so a pre-logged plan cannot suppress
/// alerts before it happens.
pub fn last_skip<'a>(
    events: &'a [Event],
    kind: ActivityKind,
    at: DateTime<Utc>,
) -> Option<&'a Event> {
    events
        .iter()
        .filter(|e| e.kind() == kind && e.outcome == EventOutcome::Skipped && e.start_time <= at)
        .max_by_key(|e| e.start_time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActivityDetail, DiaperKind, FeedingMethod};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn diaper_at(hour: u32, minute: u32) -> Event {
        Event::completed(
            ActivityDetail::Diaper {
                kind: DiaperKind::Wet,
            },
            Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, 0).unwrap(),
        )
    }

    fn feeding_at(hour: u32) -> Event {
        Event::completed(
            ActivityDetail::Feeding {
                method: FeedingMethod::Bottle,
            },
            Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_recent_observations_sorted_and_filtered() {
        let events = vec![
            diaper_at(8, 0),
            feeding_at(9),
            diaper_at(12, 0),
            diaper_at(10, 0),
            Event::skipped(
                ActivityDetail::Diaper {
                    kind: DiaperKind::Wet,
                },
                Utc.with_ymd_and_hms(2024, 3, 1, 13, 0, 0).unwrap(),
            ),
        ];

        let window = recent_observations(&events, ActivityKind::Diaper, 10);
        let hours: Vec<u32> = window
            .iter()
            .map(|e| {
                (e.start_time - Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()).num_hours()
                    as u32
            })
            .collect();
        assert_eq!(hours, vec![12, 10, 8]);
    }

    #[test]
    fn test_recent_observations_truncates_to_window() {
        let events: Vec<Event> = (6..18).map(|h| diaper_at(h, 0)).collect();
        let window = recent_observations(&events, ActivityKind::Diaper, 5);
        assert_eq!(window.len(), 5);
        assert_eq!(
            window[0].start_time,
            Utc.with_ymd_and_hms(2024, 3, 1, 17, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_extract_samples_most_recent_first() {
        let events = vec![
            diaper_at(6, 0),
            diaper_at(8, 30),
            diaper_at(11, 30),
            diaper_at(13, 30),
        ];
        let window = recent_observations(&events, ActivityKind::Diaper, 10);
        let samples = extract_samples(&window, 12.0);
        assert_eq!(samples.sample_hours, vec![2.0, 3.0, 2.5]);
        assert_eq!(samples.last_interval_hours(), Some(2.0));
        let avg = samples.recent_average_hours().unwrap();
        assert!((avg - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_extract_samples_drops_invalid_gaps() {
        let events = vec![
            diaper_at(8, 0),
            diaper_at(8, 0), // duplicate timestamp, zero gap
            diaper_at(10, 0),
        ];
        let window = recent_observations(&events, ActivityKind::Diaper, 10);
        let samples = extract_samples(&window, 12.0);
        assert_eq!(samples.sample_hours, vec![2.0]);

        // A 13h gap exceeds the 12h diaper ceiling.
        let sparse = vec![diaper_at(8, 0), diaper_at(21, 0)];
        let window = recent_observations(&sparse, ActivityKind::Diaper, 10);
        let samples = extract_samples(&window, 12.0);
        assert_eq!(samples.valid_count(), 0);
        assert_eq!(samples.recent_average_hours(), None);
        assert_eq!(samples.last_interval_hours(), None);
    }

    #[test]
    fn test_zero_and_one_event_yield_no_samples() {
        let none: Vec<Event> = vec![];
        let window = recent_observations(&none, ActivityKind::Diaper, 10);
        assert_eq!(extract_samples(&window, 12.0).valid_count(), 0);

        let one = vec![diaper_at(8, 0)];
        let window = recent_observations(&one, ActivityKind::Diaper, 10);
        assert_eq!(extract_samples(&window, 12.0).valid_count(), 0);
    }

    #[test]
    fn test_last_observation_ignores_skips_and_plans() {
        let skip_time = Utc.with_ymd_and_hms(2024, 3, 1, 14, 0, 0).unwrap();
        let events = vec![
            diaper_at(8, 0),
            diaper_at(11, 0),
            Event::skipped(
                ActivityDetail::Diaper {
                    kind: DiaperKind::Wet,
                },
                skip_time,
            ),
            Event::planned(
                ActivityDetail::Diaper {
                    kind: DiaperKind::Wet,
                },
                Utc.with_ymd_and_hms(2024, 3, 1, 16, 0, 0).unwrap(),
            ),
        ];

        let last = last_observation(&events, ActivityKind::Diaper).unwrap();
        assert_eq!(
            last.start_time,
            Utc.with_ymd_and_hms(2024, 3, 1, 11, 0, 0).unwrap()
        );

        let now = Utc.with_ymd_and_hms(2024, 3, 1, 15, 0, 0).unwrap();
        let skip = last_skip(&events, ActivityKind::Diaper, now).unwrap();
        assert_eq!(skip.start_time, skip_time);
    }

    #[test]
    fn test_last_skip_ignores_future_skips() {
        let events = vec![Event::skipped(
            ActivityDetail::Feeding {
                method: FeedingMethod::Bottle,
            },
            Utc.with_ymd_and_hms(2024, 3, 1, 18, 0, 0).unwrap(),
        )];
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert!(last_skip(&events, ActivityKind::Feeding, now).is_none());
    }

    #[test]
    fn test_hours_between_sub_hour_precision() {
        let a = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 3, 1, 8, 45, 0).unwrap();
        assert!((hours_between(a, b) - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_hours_after_fractional() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        assert_eq!(
            hours_after(start, 2.5),
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap()
        );
        assert_eq!(hours_after(start, 0.0), start);
    }
}

//! Overdue and skip state resolution
//!
//! Status is derived on every read from the predicted time, the reference
//! time, and the age-banded threshold; nothing here is stored. A recent
//! skip suppresses the overdue flag for one predicted interval and pulls
//! the next check closer instead: skipping is a deferral, not a reset.

use chrono::{DateTime, Utc};

use crate::intervals::{hours_after, hours_between};
use crate::types::ForecastStatus;

/// The "soon" window never stretches past this, minutes.
const SOON_CAP_MINUTES: f64 = 30.0;
/// Fraction of the predicted interval after a skip at which to check again.
const SKIP_RECOVERY_FRACTION: f64 = 0.6;

/// Resolved status for one forecast at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusOutcome {
    pub status: ForecastStatus,
    /// Signed minutes from `now` to the predicted time.
    pub minutes_until: f64,
    pub is_overdue: bool,
    /// Minutes past due; present only when overdue.
    pub overdue_minutes: Option<f64>,
    /// Present only while a skip is suppressing overdue status.
    pub recovery_time: Option<DateTime<Utc>>,
}

/// Derive status from a predicted time.
///
/// Overdue requires running more than `threshold_minutes` past the
/// prediction. Soon begins at `min(30, threshold / 2)` minutes out. A skip
/// within the last `predicted_interval_hours` forces the overdue flag off
/// and sets `recovery_time = skip + 0.6 × interval`.
pub fn resolve_status(
    next_time: DateTime<Utc>,
    now: DateTime<Utc>,
    threshold_minutes: f64,
    predicted_interval_hours: f64,
    last_skip_time: Option<DateTime<Utc>>,
) -> StatusOutcome {
    let minutes_until = hours_between(now, next_time) * 60.0;

    let recovery_time = last_skip_time.and_then(|skip| {
        let since_skip_hours = hours_between(skip, now);
        if since_skip_hours >= 0.0 && since_skip_hours < predicted_interval_hours {
            Some(hours_after(
                skip,
                SKIP_RECOVERY_FRACTION * predicted_interval_hours,
            ))
        } else {
            None
        }
    });

    let is_overdue = minutes_until < -threshold_minutes && recovery_time.is_none();
    let soon_cutoff = (threshold_minutes / 2.0).min(SOON_CAP_MINUTES);

    let status = if is_overdue {
        ForecastStatus::Overdue
    } else if minutes_until <= soon_cutoff {
        ForecastStatus::Soon
    } else {
        ForecastStatus::Upcoming
    };

    StatusOutcome {
        status,
        minutes_until,
        is_overdue,
        overdue_minutes: if is_overdue { Some(-minutes_until) } else { None },
        recovery_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_upcoming_when_well_ahead() {
        let outcome = resolve_status(at(12, 0), at(9, 0), 60.0, 3.0, None);
        assert_eq!(outcome.status, ForecastStatus::Upcoming);
        assert!(!outcome.is_overdue);
        assert_eq!(outcome.minutes_until, 180.0);
        assert_eq!(outcome.overdue_minutes, None);
        assert_eq!(outcome.recovery_time, None);
    }

    #[test]
    fn test_soon_window_capped_at_thirty_minutes() {
        // Threshold 90 would allow 45, but the cap keeps the window at 30.
        let outcome = resolve_status(at(10, 31), at(10, 0), 90.0, 3.0, None);
        assert_eq!(outcome.status, ForecastStatus::Upcoming);

        let outcome = resolve_status(at(10, 30), at(10, 0), 90.0, 3.0, None);
        assert_eq!(outcome.status, ForecastStatus::Soon);
    }

    #[test]
    fn test_soon_window_narrows_with_tight_threshold() {
        // Threshold 40 → cutoff 20 minutes.
        let outcome = resolve_status(at(10, 25), at(10, 0), 40.0, 3.0, None);
        assert_eq!(outcome.status, ForecastStatus::Upcoming);

        let outcome = resolve_status(at(10, 20), at(10, 0), 40.0, 3.0, None);
        assert_eq!(outcome.status, ForecastStatus::Soon);
    }

    #[test]
    fn test_overdue_strictly_past_threshold() {
        // 60 minutes late with a 60 minute threshold is not overdue yet.
        let outcome = resolve_status(at(9, 0), at(10, 0), 60.0, 3.0, None);
        assert!(!outcome.is_overdue);
        assert_eq!(outcome.status, ForecastStatus::Soon);

        let outcome = resolve_status(at(9, 0), at(10, 1), 60.0, 3.0, None);
        assert!(outcome.is_overdue);
        assert_eq!(outcome.status, ForecastStatus::Overdue);
        assert_eq!(outcome.overdue_minutes, Some(61.0));
    }

    #[test]
    fn test_overdue_symmetry_across_thresholds() {
        for threshold in [30.0, 45.0, 60.0, 90.0] {
            for minutes_late in [0.0, 29.0, 44.0, 59.0, 61.0, 91.0, 200.0] {
                let next = at(8, 0);
                let now = next + Duration::minutes(minutes_late as i64);
                let outcome = resolve_status(next, now, threshold, 3.0, None);
                assert_eq!(
                    outcome.is_overdue,
                    outcome.minutes_until < -threshold,
                    "threshold {} late {}",
                    threshold,
                    minutes_late
                );
            }
        }
    }

    #[test]
    fn test_skip_forty_minutes_ago_suppresses_overdue() {
        // Predicted time long past; raw status would be overdue.
        let skip = at(11, 20);
        let now = at(12, 0);
        let outcome = resolve_status(at(9, 0), now, 60.0, 3.0, Some(skip));

        assert!(!outcome.is_overdue);
        assert_eq!(outcome.overdue_minutes, None);
        // Recovery at skip + 0.6 * 3h = skip + 1.8h = 13:08.
        assert_eq!(outcome.recovery_time, Some(at(13, 8)));
        // Past due but suppressed lands on soon.
        assert_eq!(outcome.status, ForecastStatus::Soon);
    }

    #[test]
    fn test_skip_suppression_lasts_one_predicted_interval() {
        let skip = at(8, 0);
        let next = at(6, 0);

        // Suppressed over [skip, skip + 2h).
        for minutes in [0, 30, 119] {
            let now = skip + Duration::minutes(minutes);
            let outcome = resolve_status(next, now, 30.0, 2.0, Some(skip));
            assert!(!outcome.is_overdue, "still suppressed at +{} min", minutes);
            assert!(outcome.recovery_time.is_some());
        }

        // At exactly one interval the suppression ends.
        let outcome = resolve_status(next, skip + Duration::hours(2), 30.0, 2.0, Some(skip));
        assert!(outcome.is_overdue);
        assert_eq!(outcome.recovery_time, None);
    }

    #[test]
    fn test_future_skip_does_not_suppress() {
        let skip = at(14, 0);
        let outcome = resolve_status(at(9, 0), at(12, 0), 60.0, 3.0, Some(skip));
        assert!(outcome.is_overdue);
        assert_eq!(outcome.recovery_time, None);
    }

    #[test]
    fn test_skip_suppression_without_overdue_still_reports_recovery() {
        // Not yet due; the skip window is active anyway.
        let skip = at(9, 30);
        let outcome = resolve_status(at(11, 0), at(10, 0), 60.0, 3.0, Some(skip));
        assert!(!outcome.is_overdue);
        assert_eq!(outcome.status, ForecastStatus::Upcoming);
        assert!(outcome.recovery_time.is_some());
    }
}

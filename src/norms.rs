//! Age-banded care norms
//!
//! Published pediatric guidance, encoded as lookup tables keyed by
//! [`AgeBand`]. These values are the anchor of every forecast: they seed
//! predictions when history is thin and absorb the weight of any term that
//! cannot be computed. With no birth date the engine uses the age-agnostic
//! defaults instead of guessing a band.

use crate::age::AgeBand;
use crate::types::ActivityKind;

/// Interval fallback when age is unknown, hours.
pub const DEFAULT_INTERVAL_HOURS: f64 = 3.0;
/// Overdue threshold fallback when age is unknown, minutes.
pub const DEFAULT_THRESHOLD_MINUTES: f64 = 60.0;
/// Feeding amount fallback when age is unknown, milliliters.
pub const DEFAULT_AMOUNT_ML: f64 = 120.0;
/// Feeding duration fallback when age is unknown, minutes.
pub const DEFAULT_DURATION_MINUTES: f64 = 15.0;

/// Typical interval between events of `kind`, in hours.
///
/// Feeding stretches from 2h in the first week to 4h past six months;
/// diapers plateau at 3.5h; the sleep value is the awake window between
/// sleeps, not sleep length.
pub fn interval_hours(kind: ActivityKind, age_days: Option<u32>) -> f64 {
    let band = match age_days {
        Some(days) => AgeBand::from_days(days),
        None => return DEFAULT_INTERVAL_HOURS,
    };
    match kind {
        ActivityKind::Feeding => match band {
            AgeBand::FirstWeek => 2.0,
            AgeBand::FirstMonth => 2.5,
            AgeBand::ThreeMonths => 3.0,
            AgeBand::SixMonths => 3.5,
            AgeBand::OlderInfant => 4.0,
        },
        ActivityKind::Diaper => match band {
            AgeBand::FirstWeek => 2.0,
            AgeBand::FirstMonth => 2.5,
            AgeBand::ThreeMonths => 3.0,
            AgeBand::SixMonths => 3.5,
            AgeBand::OlderInfant => 3.5,
        },
        ActivityKind::Sleep => match band {
            AgeBand::FirstWeek => 1.0,
            AgeBand::FirstMonth => 1.25,
            AgeBand::ThreeMonths => 1.5,
            AgeBand::SixMonths => 2.0,
            AgeBand::OlderInfant => 2.5,
        },
        _ => DEFAULT_INTERVAL_HOURS,
    }
}

/// How many minutes past the predicted time an activity may run before it
/// counts as overdue.
///
/// Newborn care is tight (30 min); the window relaxes with age up to 90 min.
pub fn overdue_threshold_minutes(kind: ActivityKind, age_days: Option<u32>) -> f64 {
    let band = match age_days {
        Some(days) => AgeBand::from_days(days),
        None => return DEFAULT_THRESHOLD_MINUTES,
    };
    match kind {
        ActivityKind::Feeding | ActivityKind::Sleep => match band {
            AgeBand::FirstWeek => 30.0,
            AgeBand::FirstMonth => 45.0,
            AgeBand::ThreeMonths => 60.0,
            AgeBand::SixMonths => 75.0,
            AgeBand::OlderInfant => 90.0,
        },
        ActivityKind::Diaper => match band {
            AgeBand::FirstWeek => 30.0,
            AgeBand::FirstMonth => 45.0,
            AgeBand::ThreeMonths => 60.0,
            AgeBand::SixMonths => 90.0,
            AgeBand::OlderInfant => 90.0,
        },
        _ => DEFAULT_THRESHOLD_MINUTES,
    }
}

/// One-line guidance text shown alongside a forecast.
pub fn guidance(kind: ActivityKind, age_days: Option<u32>) -> &'static str {
    let band = match age_days {
        Some(days) => AgeBand::from_days(days),
        None => return "Using a general 3-hour rhythm until a birth date is set.",
    };
    match kind {
        ActivityKind::Feeding => match band {
            AgeBand::FirstWeek => "Newborns typically feed every 2 hours, day and night.",
            AgeBand::FirstMonth => "Expect feeds roughly every 2.5 hours, often closer in the evening.",
            AgeBand::ThreeMonths => "Most babies settle near 3-hour feeds by this age.",
            AgeBand::SixMonths => "Feeds stretch toward every 3.5 hours as solids begin.",
            AgeBand::OlderInfant => "Expect about 4 hours between milk feeds alongside solids.",
        },
        ActivityKind::Diaper => match band {
            AgeBand::FirstWeek => "Expect a wet or dirty diaper about every 2 hours this week.",
            AgeBand::FirstMonth => "Diaper changes settle near every 2.5 hours.",
            AgeBand::ThreeMonths => "Expect a change roughly every 3 hours.",
            AgeBand::SixMonths => "Changes spread toward every 3.5 hours.",
            AgeBand::OlderInfant => "Expect a change about every 3.5 hours.",
        },
        ActivityKind::Sleep => match band {
            AgeBand::FirstWeek => "Newborns manage about an hour awake between sleeps.",
            AgeBand::FirstMonth => "Awake windows run just over an hour at this age.",
            AgeBand::ThreeMonths => "Most babies last about 1.5 hours between sleeps.",
            AgeBand::SixMonths => "Awake windows stretch toward 2 hours.",
            AgeBand::OlderInfant => "Expect about 2.5 hours awake between sleeps.",
        },
        _ => "Using a general 3-hour rhythm until a birth date is set.",
    }
}

/// Typical feeding amount per session, in milliliters.
pub fn feeding_amount_ml(age_days: Option<u32>) -> f64 {
    match age_days.map(AgeBand::from_days) {
        Some(AgeBand::FirstWeek) => 60.0,
        Some(AgeBand::FirstMonth) => 90.0,
        Some(AgeBand::ThreeMonths) => 120.0,
        Some(AgeBand::SixMonths) => 150.0,
        Some(AgeBand::OlderInfant) => 180.0,
        None => DEFAULT_AMOUNT_ML,
    }
}

/// Typical feeding duration per session, in minutes.
///
/// Sessions get shorter as babies get more efficient, 20 min down to 10.
pub fn feeding_duration_minutes(age_days: Option<u32>) -> f64 {
    match age_days.map(AgeBand::from_days) {
        Some(AgeBand::FirstWeek) => 20.0,
        Some(AgeBand::FirstMonth) => 20.0,
        Some(AgeBand::ThreeMonths) => 15.0,
        Some(AgeBand::SixMonths) => 15.0,
        Some(AgeBand::OlderInfant) => 10.0,
        None => DEFAULT_DURATION_MINUTES,
    }
}

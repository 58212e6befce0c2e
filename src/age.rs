//! Age computation and age bands
//!
//! Norms are looked up by coarse age band rather than exact age. Bands are
//! deliberately wide; care rhythms shift over weeks, not days.

use chrono::{DateTime, Utc};

/// Coarse developmental band used to index the norms tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum AgeBand {
    /// 0 to 7 days.
    FirstWeek,
    /// 8 to 30 days.
    FirstMonth,
    /// 31 to 90 days.
    ThreeMonths,
    /// 91 to 180 days.
    SixMonths,
    /// More than 180 days.
    OlderInfant,
}

impl AgeBand {
    /// Band for an age in whole days.
    pub fn from_days(age_days: u32) -> Self {
        match age_days {
            0..=7 => AgeBand::FirstWeek,
            8..=30 => AgeBand::FirstMonth,
            31..=90 => AgeBand::ThreeMonths,
            91..=180 => AgeBand::SixMonths,
            _ => AgeBand::OlderInfant,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeBand::FirstWeek => "first_week",
            AgeBand::FirstMonth => "first_month",
            AgeBand::ThreeMonths => "three_months",
            AgeBand::SixMonths => "six_months",
            AgeBand::OlderInfant => "older_infant",
        }
    }
}

/// Whole days of age at `at`, floored, clamped to zero.
///
/// A reference instant before the birth date (expected due dates, clock
/// skew) counts as age 0 rather than going negative.
pub fn age_in_days(birth_date: DateTime<Utc>, at: DateTime<Utc>) -> u32 {
    (at - birth_date).num_days().max(0) as u32
}

//! Per-activity forecast policy
//!
//! The three forecasters run the same blending algorithm; everything that
//! differs between activities lives in one policy record: window sizes,
//! validity ceilings, the clamp range, and the weight schedule keyed by
//! how many valid samples survived extraction.

use crate::types::{ActivityKind, ConfidenceTier, TermWeights};

/// Parameters that specialize the generic blender for one activity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastPolicy {
    pub activity: ActivityKind,
    /// Most recent observations considered for interval extraction.
    pub truncation: usize,
    /// Gaps at or above this are treated as logging hiatuses, hours.
    pub validity_ceiling_hours: f64,
    pub clamp_min_hours: f64,
    pub clamp_max_hours: f64,
    /// Only the diaper forecaster consults the correlation analyzer.
    pub uses_correlation: bool,
}

impl ForecastPolicy {
    pub fn feeding() -> Self {
        ForecastPolicy {
            activity: ActivityKind::Feeding,
            truncation: 10,
            validity_ceiling_hours: 12.0,
            clamp_min_hours: 1.0,
            clamp_max_hours: 6.0,
            uses_correlation: false,
        }
    }

    pub fn diaper() -> Self {
        ForecastPolicy {
            activity: ActivityKind::Diaper,
            truncation: 15,
            validity_ceiling_hours: 12.0,
            clamp_min_hours: 1.0,
            clamp_max_hours: 6.0,
            uses_correlation: true,
        }
    }

    pub fn sleep() -> Self {
        ForecastPolicy {
            activity: ActivityKind::Sleep,
            truncation: 10,
            validity_ceiling_hours: 24.0,
            clamp_min_hours: 1.0,
            clamp_max_hours: 6.0,
            uses_correlation: false,
        }
    }

    /// Clamp a predicted interval into this policy's sane range.
    pub fn clamp(&self, hours: f64) -> f64 {
        hours.clamp(self.clamp_min_hours, self.clamp_max_hours)
    }

    /// Weight schedule and confidence tier for a valid-sample count.
    ///
    /// Feeding and sleep use a plain three-term schedule. Diaper reserves
    /// weight for the correlation terms at every tier, leaning on the
    /// feeding coupling hardest when direct samples are scarce.
    pub fn schedule(&self, valid_count: usize) -> (TermWeights, ConfidenceTier) {
        match self.activity {
            ActivityKind::Diaper => {
                if valid_count >= 5 {
                    (
                        TermWeights {
                            age_based: 0.3,
                            recent_average: 0.3,
                            last_interval: 0.15,
                            feeding_correlation: 0.15,
                            sleep_correlation: 0.10,
                        },
                        ConfidenceTier::High,
                    )
                } else if valid_count >= 2 {
                    (
                        TermWeights {
                            age_based: 0.4,
                            recent_average: 0.35,
                            last_interval: 0.15,
                            feeding_correlation: 0.10,
                            sleep_correlation: 0.0,
                        },
                        ConfidenceTier::Medium,
                    )
                } else {
                    (
                        TermWeights {
                            age_based: 0.85,
                            recent_average: 0.0,
                            last_interval: 0.0,
                            feeding_correlation: 0.15,
                            sleep_correlation: 0.0,
                        },
                        ConfidenceTier::Low,
                    )
                }
            }
            _ => {
                if valid_count >= 3 {
                    (
                        TermWeights {
                            age_based: 0.4,
                            recent_average: 0.4,
                            last_interval: 0.2,
                            feeding_correlation: 0.0,
                            sleep_correlation: 0.0,
                        },
                        ConfidenceTier::High,
                    )
                } else if valid_count >= 1 {
                    (
                        TermWeights {
                            age_based: 0.5,
                            recent_average: 0.3,
                            last_interval: 0.2,
                            feeding_correlation: 0.0,
                            sleep_correlation: 0.0,
                        },
                        ConfidenceTier::Medium,
                    )
                } else {
                    (
                        TermWeights {
                            age_based: 1.0,
                            recent_average: 0.0,
                            last_interval: 0.0,
                            feeding_correlation: 0.0,
                            sleep_correlation: 0.0,
                        },
                        ConfidenceTier::Low,
                    )
                }
            }
        }
    }
}

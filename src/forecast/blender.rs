//! Confidence-tiered interval blending
//!
//! The forecasting core. Combines the age-based baseline, the recent
//! average gap, the most recent gap, and (diaper only) the correlation
//! terms under the weight schedule the policy picked for the sample count.
//!
//! A term whose source is absent substitutes the age-based interval
//! instead of being dropped, so weights always apply in full and sparse
//! data pulls the prediction toward the baseline rather than amplifying
//! whatever samples remain. Renormalizing instead would silently change
//! every sparse-data output.

use super::policy::ForecastPolicy;
use crate::correlation::CorrelationEstimate;
use crate::intervals::IntervalSamples;
use crate::types::{CalculationBreakdown, ConfidenceTier, CorrelationContribution};

/// Correlation estimates available to a blend. Empty for feeding and sleep.
#[derive(Debug, Clone, Default)]
pub struct CorrelationSignals {
    pub feeding: Option<CorrelationEstimate>,
    pub sleep: Option<CorrelationEstimate>,
}

impl CorrelationSignals {
    pub fn none() -> Self {
        CorrelationSignals::default()
    }
}

/// A blended interval with its confidence tier and full accounting.
#[derive(Debug, Clone, PartialEq)]
pub struct BlendOutcome {
    /// Clamped into the policy's range.
    pub predicted_interval_hours: f64,
    pub confidence: ConfidenceTier,
    pub breakdown: CalculationBreakdown,
}

/// Value a correlation term contributes to the weighted sum.
///
/// `confidence × implied + (1 − confidence) × age_based`: full evidence
/// uses the implied interval outright, thin evidence degrades continuously
/// to the baseline, and no evidence is the plain baseline substitution.
fn correlation_term(estimate: Option<&CorrelationEstimate>, age_based_hours: f64) -> f64 {
    match estimate.and_then(|e| e.implied_interval_hours.map(|i| (e.confidence, i))) {
        Some((confidence, implied)) => {
            confidence * implied + (1.0 - confidence) * age_based_hours
        }
        None => age_based_hours,
    }
}

fn correlation_contribution(
    estimate: Option<&CorrelationEstimate>,
    age_based_hours: f64,
) -> CorrelationContribution {
    let term_hours = correlation_term(estimate, age_based_hours);
    match estimate {
        Some(e) => CorrelationContribution {
            mean_offset_minutes: e.mean_offset_minutes,
            confidence: e.confidence,
            matched_pairs: e.matched_pairs,
            term_hours,
        },
        None => CorrelationContribution {
            mean_offset_minutes: None,
            confidence: 0.0,
            matched_pairs: 0,
            term_hours,
        },
    }
}

/// Blend the evidence for one activity into a predicted interval.
pub fn blend_interval(
    policy: &ForecastPolicy,
    age_based_hours: f64,
    samples: &IntervalSamples,
    correlations: &CorrelationSignals,
    guidance: &str,
) -> BlendOutcome {
    let (weights, confidence) = policy.schedule(samples.valid_count());

    let recent_average = samples.recent_average_hours();
    let last_interval = samples.last_interval_hours();
    let recent_term = recent_average.unwrap_or(age_based_hours);
    let last_term = last_interval.unwrap_or(age_based_hours);

    let mut predicted = weights.age_based * age_based_hours
        + weights.recent_average * recent_term
        + weights.last_interval * last_term;

    let feeding_contribution = if weights.feeding_correlation > 0.0 {
        let contribution =
            correlation_contribution(correlations.feeding.as_ref(), age_based_hours);
        predicted += weights.feeding_correlation * contribution.term_hours;
        Some(contribution)
    } else {
        None
    };

    let sleep_contribution = if weights.sleep_correlation > 0.0 {
        let contribution = correlation_contribution(correlations.sleep.as_ref(), age_based_hours);
        predicted += weights.sleep_correlation * contribution.term_hours;
        Some(contribution)
    } else {
        None
    };

    BlendOutcome {
        predicted_interval_hours: policy.clamp(predicted),
        confidence,
        breakdown: CalculationBreakdown {
            age_based_hours,
            recent_average_hours: recent_average,
            last_interval_hours: last_interval,
            sample_hours: samples.sample_hours.clone(),
            valid_sample_count: samples.valid_count(),
            weights,
            feeding_correlation: feeding_contribution,
            sleep_correlation: sleep_contribution,
            manual_override_hours: None,
            guidance: guidance.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn samples(hours: &[f64]) -> IntervalSamples {
        IntervalSamples {
            sample_hours: hours.to_vec(),
        }
    }

    #[test]
    fn test_zero_history_returns_age_based() {
        let policy = ForecastPolicy::feeding();
        let outcome = blend_interval(
            &policy,
            2.0,
            &samples(&[]),
            &CorrelationSignals::none(),
            "",
        );
        assert_eq!(outcome.predicted_interval_hours, 2.0);
        assert_eq!(outcome.confidence, ConfidenceTier::Low);
        assert!(outcome.breakdown.sample_hours.is_empty());
        assert_eq!(outcome.breakdown.recent_average_hours, None);
        assert_eq!(outcome.breakdown.last_interval_hours, None);
    }

    #[test]
    fn test_diaper_zero_history_substitution_still_age_based() {
        // 0.85 direct weight plus 0.15 substituted correlation weight.
        let policy = ForecastPolicy::diaper();
        let outcome = blend_interval(
            &policy,
            2.0,
            &samples(&[]),
            &CorrelationSignals::none(),
            "",
        );
        assert!((outcome.predicted_interval_hours - 2.0).abs() < 1e-9);
        assert_eq!(outcome.confidence, ConfidenceTier::Low);
        let feeding = outcome.breakdown.feeding_correlation.unwrap();
        assert_eq!(feeding.term_hours, 2.0);
        assert_eq!(feeding.matched_pairs, 0);
        assert!(outcome.breakdown.sleep_correlation.is_none());
    }

    #[test]
    fn test_medium_feeding_blend_with_one_sample() {
        let policy = ForecastPolicy::feeding();
        let outcome = blend_interval(
            &policy,
            3.0,
            &samples(&[2.0]),
            &CorrelationSignals::none(),
            "",
        );
        // 0.5*3.0 + 0.3*2.0 + 0.2*2.0 = 2.5
        assert!((outcome.predicted_interval_hours - 2.5).abs() < 1e-9);
        assert_eq!(outcome.confidence, ConfidenceTier::Medium);
        assert_eq!(outcome.breakdown.recent_average_hours, Some(2.0));
        assert_eq!(outcome.breakdown.last_interval_hours, Some(2.0));
    }

    #[test]
    fn test_high_tier_diaper_blend_without_correlation_data() {
        // Five valid samples, mean 2.6, most recent 3.0, baseline 2.5:
        // 0.3*2.5 + 0.3*2.6 + 0.15*3.0 + (0.15 + 0.10)*2.5 = 2.605
        let policy = ForecastPolicy::diaper();
        let outcome = blend_interval(
            &policy,
            2.5,
            &samples(&[3.0, 2.5, 2.0, 3.0, 2.5]),
            &CorrelationSignals::none(),
            "",
        );
        assert!((outcome.predicted_interval_hours - 2.605).abs() < 1e-9);
        assert_eq!(outcome.confidence, ConfidenceTier::High);
        let recent = outcome.breakdown.recent_average_hours.unwrap();
        assert!((recent - 2.6).abs() < 1e-9);
        assert_eq!(outcome.breakdown.last_interval_hours, Some(3.0));
    }

    #[test]
    fn test_correlation_evidence_shifts_the_blend() {
        let policy = ForecastPolicy::diaper();
        let base_samples = samples(&[3.0, 2.5, 2.0, 3.0, 2.5]);

        let without = blend_interval(
            &policy,
            2.5,
            &base_samples,
            &CorrelationSignals::none(),
            "",
        );
        let with = blend_interval(
            &policy,
            2.5,
            &base_samples,
            &CorrelationSignals {
                feeding: Some(CorrelationEstimate {
                    mean_offset_minutes: Some(30.0),
                    confidence: 0.5,
                    matched_pairs: 5,
                    implied_interval_hours: Some(4.0),
                }),
                sleep: None,
            },
            "",
        );

        // Term moves from 2.5 to 0.5*4.0 + 0.5*2.5 = 3.25 under weight 0.15.
        let expected_shift = 0.15 * (3.25 - 2.5);
        let shift = with.predicted_interval_hours - without.predicted_interval_hours;
        assert!((shift - expected_shift).abs() < 1e-9);

        let contribution = with.breakdown.feeding_correlation.unwrap();
        assert_eq!(contribution.matched_pairs, 5);
        assert!((contribution.term_hours - 3.25).abs() < 1e-9);
    }

    #[test]
    fn test_correlation_without_implied_interval_substitutes_baseline() {
        let policy = ForecastPolicy::diaper();
        let estimate = CorrelationEstimate {
            mean_offset_minutes: Some(30.0),
            confidence: 0.3,
            matched_pairs: 3,
            implied_interval_hours: None,
        };
        let outcome = blend_interval(
            &policy,
            2.5,
            &samples(&[3.0, 2.5, 2.0, 3.0, 2.5]),
            &CorrelationSignals {
                feeding: Some(estimate),
                sleep: None,
            },
            "",
        );
        // Identical to the no-data blend.
        assert!((outcome.predicted_interval_hours - 2.605).abs() < 1e-9);
    }

    #[test]
    fn test_prediction_clamped_to_policy_range() {
        let policy = ForecastPolicy::feeding();

        let short = blend_interval(
            &policy,
            2.0,
            &samples(&[0.1, 0.1, 0.1]),
            &CorrelationSignals::none(),
            "",
        );
        assert_eq!(short.predicted_interval_hours, 1.0);

        let long = blend_interval(
            &policy,
            4.0,
            &samples(&[11.0, 11.0, 11.0]),
            &CorrelationSignals::none(),
            "",
        );
        assert_eq!(long.predicted_interval_hours, 6.0);
    }

    #[test]
    fn test_breakdown_carries_schedule_and_guidance() {
        let policy = ForecastPolicy::feeding();
        let outcome = blend_interval(
            &policy,
            3.0,
            &samples(&[3.0, 3.2, 2.8]),
            &CorrelationSignals::none(),
            "Most babies settle near 3-hour feeds by this age.",
        );
        assert_eq!(outcome.breakdown.weights.age_based, 0.4);
        assert_eq!(outcome.breakdown.weights.recent_average, 0.4);
        assert_eq!(outcome.breakdown.weights.last_interval, 0.2);
        assert_eq!(outcome.breakdown.valid_sample_count, 3);
        assert_eq!(
            outcome.breakdown.guidance,
            "Most babies settle near 3-hour feeds by this age."
        );
    }
}

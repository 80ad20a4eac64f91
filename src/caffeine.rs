//! Caffeine decay model
//!
//! Estimates the caffeine still circulating at bedtime with first-order
//! exponential decay and maps it to a sleep quality score.

use crate::error::{check_range, ValidationError};
use crate::policy::CaffeinePolicy;
use crate::types::{round_to, CaffeineInput, CaffeineResult, TimeOfDay};
use tracing::debug;

/// Largest cup count accepted as plausible input
pub const MAX_CUPS: u32 = 50;

pub const FEEDBACK_EXCELLENT: &str =
    "Excellent. Caffeine is mostly cleared. Expect deep 'Meditation-style' breathing.";
pub const FEEDBACK_MODERATE: &str =
    "Moderate impact. You might experience lighter sleep cycles and higher heart rate.";
pub const FEEDBACK_HIGH_IMPACT: &str =
    "High impact. Caffeine will likely block deep sleep stages (N3).";

/// Caffeine sleep-quality evaluator
#[derive(Debug, Clone, Default)]
pub struct CaffeineModel {
    policy: CaffeinePolicy,
}

impl CaffeineModel {
    pub fn new(policy: CaffeinePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &CaffeinePolicy {
        &self.policy
    }

    /// Evaluate residual caffeine at bedtime.
    ///
    /// Intake later on the clock than bedtime is taken to be the previous day
    /// (24 hours are added to the gap).
    pub fn evaluate(
        &self,
        cup_count: u32,
        last_intake: TimeOfDay,
        bed_time: TimeOfDay,
    ) -> Result<CaffeineResult, ValidationError> {
        check_range("cup_count", cup_count as f64, 0.0, MAX_CUPS as f64)?;

        let hours_since_intake = hours_until_bed(last_intake, bed_time);
        let residual_mg = self.policy.residual_mg(cup_count, hours_since_intake);
        let score = (100.0 - residual_mg * self.policy.penalty_per_mg).clamp(0.0, 100.0);
        let feedback = feedback_for(score);

        debug!(
            cup_count,
            hours_since_intake, residual_mg, score, "evaluated caffeine decay"
        );

        Ok(CaffeineResult {
            hours_since_intake,
            residual_mg: round_to(residual_mg, 2),
            score: round_to(score, 1),
            feedback: feedback.to_string(),
        })
    }

    pub fn evaluate_input(&self, input: &CaffeineInput) -> Result<CaffeineResult, ValidationError> {
        self.evaluate(input.cup_count, input.last_intake, input.bed_time)
    }
}

/// Hours from intake to bedtime, wrapping a negative gap to the previous day
pub fn hours_until_bed(last_intake: TimeOfDay, bed_time: TimeOfDay) -> f64 {
    let delta = bed_time.hours_since(last_intake);
    if delta < 0.0 {
        delta + 24.0
    } else {
        delta
    }
}

/// Feedback bracket for a caffeine quality score
pub fn feedback_for(score: f64) -> &'static str {
    if score > 85.0 {
        FEEDBACK_EXCELLENT
    } else if score > 60.0 {
        FEEDBACK_MODERATE
    } else {
        FEEDBACK_HIGH_IMPACT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn t(text: &str) -> TimeOfDay {
        TimeOfDay::parse("time", text).unwrap()
    }

    #[test]
    fn test_no_caffeine_is_perfect() {
        let model = CaffeineModel::default();
        for (intake, bed) in [("15:00", "23:00"), ("23:30", "23:00"), ("00:00", "00:00")] {
            let result = model.evaluate(0, t(intake), t(bed)).unwrap();
            assert_eq!(result.residual_mg, 0.0);
            assert_eq!(result.score, 100.0);
            assert_eq!(result.feedback, FEEDBACK_EXCELLENT);
        }
    }

    #[test]
    fn test_two_cups_eight_hours() {
        // 190 mg * 0.5^(8 / 5.5) = 69.3253...
        let result = CaffeineModel::default()
            .evaluate(2, t("15:00"), t("23:00"))
            .unwrap();

        assert_eq!(result.hours_since_intake, 8.0);
        assert_eq!(result.residual_mg, 69.33);
        assert_eq!(result.score, 65.3);
        assert_eq!(result.feedback, FEEDBACK_MODERATE);
    }

    #[test]
    fn test_intake_after_bedtime_wraps() {
        let result = CaffeineModel::default()
            .evaluate(1, t("23:30"), t("23:00"))
            .unwrap();
        assert_eq!(result.hours_since_intake, 23.5);
        assert!(result.residual_mg < 5.0);
        assert_eq!(result.feedback, FEEDBACK_EXCELLENT);
    }

    #[test]
    fn test_intake_at_bedtime_is_not_wrapped() {
        let result = CaffeineModel::default()
            .evaluate(8, t("22:00"), t("22:00"))
            .unwrap();
        assert_eq!(result.hours_since_intake, 0.0);
        assert_eq!(result.residual_mg, 760.0);
        // 100 - 380 clamps to 0
        assert_eq!(result.score, 0.0);
        assert_eq!(result.feedback, FEEDBACK_HIGH_IMPACT);
    }

    #[test]
    fn test_residual_decreases_with_gap() {
        let model = CaffeineModel::default();
        let bed = t("23:00");
        let mut previous = f64::INFINITY;
        for hour in 0..23 {
            let intake = TimeOfDay::new(hour, 0).unwrap();
            let result = model.evaluate(3, intake, bed).unwrap();
            // Later intake means a shorter gap and more residual caffeine
            assert!(result.residual_mg >= 0.0);
            if hour > 0 {
                assert!(result.residual_mg >= previous, "hour {hour}");
            }
            previous = result.residual_mg;
        }
    }

    #[test]
    fn test_score_non_increasing_in_residual() {
        let model = CaffeineModel::default();
        let mut results: Vec<CaffeineResult> = (0..=10)
            .map(|cups| model.evaluate(cups, t("16:15"), t("23:15")).unwrap())
            .collect();
        results.sort_by(|a, b| a.residual_mg.total_cmp(&b.residual_mg));
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_feedback_thresholds_are_strict() {
        assert_eq!(feedback_for(85.0), FEEDBACK_MODERATE);
        assert_eq!(feedback_for(85.1), FEEDBACK_EXCELLENT);
        assert_eq!(feedback_for(60.0), FEEDBACK_HIGH_IMPACT);
        assert_eq!(feedback_for(60.1), FEEDBACK_MODERATE);
    }

    #[test]
    fn test_rejects_implausible_cup_count() {
        let err = CaffeineModel::default()
            .evaluate(MAX_CUPS + 1, t("15:00"), t("23:00"))
            .unwrap_err();
        assert_eq!(err.field(), Some("cup_count"));
    }

    #[test]
    fn test_custom_half_life() {
        let model = CaffeineModel::new(CaffeinePolicy {
            half_life_hours: 4.0,
            ..Default::default()
        });
        let result = model.evaluate(2, t("15:00"), t("23:00")).unwrap();
        // Two half-lives: 190 / 4
        assert_eq!(result.residual_mg, 47.5);
        // 76.25 rounds to the even digit
        assert_eq!(result.score, 76.2);
    }

    #[test]
    fn test_one_cup_one_half_life_rounds_half_even() {
        // 95 mg halved once: 47.5 mg, score 76.25
        let result = CaffeineModel::default()
            .evaluate(1, t("17:30"), t("23:00"))
            .unwrap();
        assert_eq!(result.residual_mg, 47.5);
        assert_eq!(result.score, 76.2);
        assert_eq!(result.feedback, FEEDBACK_MODERATE);
    }
}

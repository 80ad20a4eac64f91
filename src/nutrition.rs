//! Nutrition model
//!
//! Scores the last meal against bedtime: the digest gap first, then the
//! nutrient answers under the active `NutritionPolicy`.
//!
//! The digest gap is a same-day difference. A meal logged later on the clock
//! than bedtime yields a negative gap and lands in the red bracket; unlike the
//! screen-time model there is no overnight correction.

use crate::error::ValidationError;
use crate::policy::NutritionPolicy;
use crate::types::{Nutrient, NutritionInput, NutritionResult, Nutrients, TimeOfDay};
use tracing::debug;

pub const EFFECT_DIGESTION: &str =
    "🔴 DIGESTION: Your body is digesting instead of resting. Expect high heart rate.";
pub const EFFECT_METABOLISM: &str =
    "🟡 METABOLISM: Active digestion is raising your core temp, delaying deep sleep.";
pub const EFFECT_TIMING: &str =
    "🟢 TIMING: Your stomach is settled. Perfect for rapid sleep onset.";

pub const EFFECT_SALT: &str =
    "💧 SALT: High sodium causes dehydration and 'sleep fragmentation' (waking up thirsty).";
pub const EFFECT_SUGAR: &str =
    "⚡ SUGAR: Causes a glucose spike & crash, leading to night sweats or vivid dreams.";
pub const EFFECT_FAT: &str =
    "🔥 FAT: High-fat meals slow down stomach emptying, increasing risk of acid reflux.";

/// Nutrition sleep-quality evaluator
#[derive(Debug, Clone, Default)]
pub struct NutritionModel {
    policy: NutritionPolicy,
}

impl NutritionModel {
    pub fn new(policy: NutritionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &NutritionPolicy {
        &self.policy
    }

    /// Evaluate meal timing and composition
    pub fn evaluate(
        &self,
        meal_time: TimeOfDay,
        bed_time: TimeOfDay,
        nutrients: &Nutrients,
    ) -> Result<NutritionResult, ValidationError> {
        let nutrient_penalty = self.policy.penalty(nutrients)?;
        let digest_gap_hours = bed_time.hours_since(meal_time);
        let timing = &self.policy.timing;

        let mut score = 100.0;
        let mut effects = Vec::new();

        if digest_gap_hours < timing.red_below_hours {
            score -= timing.red_penalty;
            effects.push(EFFECT_DIGESTION.to_string());
        } else if digest_gap_hours < timing.yellow_below_hours {
            score -= timing.yellow_penalty;
            effects.push(EFFECT_METABOLISM.to_string());
        } else {
            effects.push(EFFECT_TIMING.to_string());
        }

        score -= nutrient_penalty;

        for nutrient in Nutrient::ALL {
            if nutrients.is_high(nutrient) {
                effects.push(effect_for(nutrient).to_string());
            }
        }

        let score = f64::max(0.0, score);

        debug!(
            digest_gap_hours,
            nutrient_penalty, score, "evaluated nutrition"
        );

        Ok(NutritionResult {
            score,
            digest_gap_hours,
            nutrient_penalty,
            effects,
        })
    }

    pub fn evaluate_input(&self, input: &NutritionInput) -> Result<NutritionResult, ValidationError> {
        self.evaluate(input.meal_time, input.bed_time, &input.nutrients)
    }
}

/// Explanation shown for a nutrient reported high
pub fn effect_for(nutrient: Nutrient) -> &'static str {
    match nutrient {
        Nutrient::Salt => EFFECT_SALT,
        Nutrient::Sugar => EFFECT_SUGAR,
        Nutrient::Fat => EFFECT_FAT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Level;
    use pretty_assertions::assert_eq;

    fn t(text: &str) -> TimeOfDay {
        TimeOfDay::parse("time", text).unwrap()
    }

    fn all(level: Level) -> Nutrients {
        Nutrients::levels(level, level, level)
    }

    #[test]
    fn test_three_hour_gap_has_no_timing_penalty() {
        let result = NutritionModel::default()
            .evaluate(t("20:00"), t("23:00"), &all(Level::Low))
            .unwrap();
        assert_eq!(result.digest_gap_hours, 3.0);
        assert_eq!(result.score, 100.0);
        assert_eq!(result.effects, vec![EFFECT_TIMING.to_string()]);
    }

    #[test]
    fn test_all_low_has_no_nutrient_penalty() {
        let model = NutritionModel::default();
        for (meal, expected) in [("22:30", 60.0), ("21:00", 80.0), ("18:00", 100.0)] {
            let result = model.evaluate(t(meal), t("23:00"), &all(Level::Low)).unwrap();
            assert_eq!(result.nutrient_penalty, 0.0);
            assert_eq!(result.score, expected, "meal {meal}");
            assert_eq!(result.effects.len(), 1);
        }
    }

    #[test]
    fn test_late_rich_meal() {
        let nutrients = Nutrients::levels(Level::High, Level::Med, Level::High);
        let result = NutritionModel::default()
            .evaluate(t("22:30"), t("23:00"), &nutrients)
            .unwrap();

        // 100 - 40 - (15 + 5 + 15)
        assert_eq!(result.score, 25.0);
        assert_eq!(
            result.effects,
            vec![
                EFFECT_DIGESTION.to_string(),
                EFFECT_SALT.to_string(),
                EFFECT_FAT.to_string(),
            ]
        );
    }

    #[test]
    fn test_medium_levels_penalise_without_messages() {
        let result = NutritionModel::default()
            .evaluate(t("21:00"), t("23:00"), &all(Level::Med))
            .unwrap();
        assert_eq!(result.score, 65.0);
        assert_eq!(result.effects, vec![EFFECT_METABOLISM.to_string()]);
    }

    #[test]
    fn test_score_floor_is_zero() {
        let result = NutritionModel::default()
            .evaluate(t("23:00"), t("23:00"), &all(Level::High))
            .unwrap();
        // 100 - 40 - 45 = 15; still positive
        assert_eq!(result.score, 15.0);

        let harsh = NutritionModel::new(NutritionPolicy {
            scale: crate::policy::NutrientScale::Levels {
                high: 30.0,
                med: 5.0,
                low: 0.0,
            },
            ..NutritionPolicy::standard()
        });
        let result = harsh
            .evaluate(t("23:00"), t("23:00"), &all(Level::High))
            .unwrap();
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_meal_after_bedtime_is_not_wrapped() {
        // 23:30 meal, 00:30 bed: same-day gap is -23h, lands in the red bracket
        let result = NutritionModel::default()
            .evaluate(t("23:30"), t("00:30"), &all(Level::Low))
            .unwrap();
        assert_eq!(result.digest_gap_hours, -23.0);
        assert_eq!(result.score, 60.0);
        assert_eq!(result.effects[0], EFFECT_DIGESTION);
    }

    #[test]
    fn test_reduced_high_policy() {
        let model = NutritionModel::new(NutritionPolicy::reduced_high());
        let result = model
            .evaluate(t("19:00"), t("23:00"), &all(Level::High))
            .unwrap();
        assert_eq!(result.score, 64.0);
        assert_eq!(result.effects.len(), 4);
    }

    #[test]
    fn test_checkbox_policy() {
        let model = NutritionModel::new(NutritionPolicy::checkbox());
        let result = model
            .evaluate(t("19:00"), t("23:00"), &Nutrients::flags(false, true, false))
            .unwrap();
        assert_eq!(result.score, 90.0);
        assert_eq!(
            result.effects,
            vec![EFFECT_TIMING.to_string(), EFFECT_SUGAR.to_string()]
        );

        let err = model
            .evaluate(t("19:00"), t("23:00"), &all(Level::Low))
            .unwrap_err();
        assert_eq!(err.field(), Some("nutrients"));
    }
}

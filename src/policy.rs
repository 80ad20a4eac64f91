//! Scoring policies
//!
//! The wizards score the same habits with slightly different weight tables and
//! bracket thresholds. Rather than hardcoding one variant, a `ScoringPolicy`
//! value carries the tables and is chosen when an evaluator is built.
//!
//! Presets:
//! - `basic` - screen gap and three-level nutrients (15/5/0)
//! - `caffeine-extended` - adds a residual-caffeine term, nutrients 12/5/0
//! - `checkbox-nutrition` - nutrients as boolean flags, flat 10 points each

use crate::error::{ComputeError, ValidationError};
use crate::types::{Level, Nutrient, Nutrients};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Caffeine per standard cup (mg)
pub const DEFAULT_MG_PER_CUP: f64 = 95.0;

/// Caffeine elimination half-life (hours)
pub const DEFAULT_HALF_LIFE_HOURS: f64 = 5.5;

/// Quality points lost per residual milligram
pub const DEFAULT_PENALTY_PER_MG: f64 = 0.5;

/// Named policy presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyPreset {
    Basic,
    CaffeineExtended,
    CheckboxNutrition,
}

impl PolicyPreset {
    pub const ALL: [PolicyPreset; 3] = [
        PolicyPreset::Basic,
        PolicyPreset::CaffeineExtended,
        PolicyPreset::CheckboxNutrition,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyPreset::Basic => "basic",
            PolicyPreset::CaffeineExtended => "caffeine-extended",
            PolicyPreset::CheckboxNutrition => "checkbox-nutrition",
        }
    }
}

impl fmt::Display for PolicyPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyPreset {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        PolicyPreset::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| ValidationError::UnknownPolicy(s.to_string()))
    }
}

/// Exponential decay constants for caffeine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaffeinePolicy {
    pub mg_per_cup: f64,
    pub half_life_hours: f64,
    pub penalty_per_mg: f64,
}

impl Default for CaffeinePolicy {
    fn default() -> Self {
        Self {
            mg_per_cup: DEFAULT_MG_PER_CUP,
            half_life_hours: DEFAULT_HALF_LIFE_HOURS,
            penalty_per_mg: DEFAULT_PENALTY_PER_MG,
        }
    }
}

impl CaffeinePolicy {
    /// Residual caffeine after `hours` of first-order decay
    ///
    /// Formula: `cups * mg_per_cup * 0.5^(hours / half_life)`
    pub fn residual_mg(&self, cups: u32, hours: f64) -> f64 {
        let total_mg = cups as f64 * self.mg_per_cup;
        total_mg * 0.5_f64.powf(hours / self.half_life_hours)
    }
}

/// How meal poll answers turn into penalty points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scale", rename_all = "snake_case")]
pub enum NutrientScale {
    /// Per-level weights summed over salt, sugar and fat
    Levels { high: f64, med: f64, low: f64 },
    /// Flat penalty for each ticked nutrient
    Flags { penalty: f64 },
}

/// Meal timing brackets: the first bracket whose upper bound exceeds the gap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DigestTiming {
    pub red_below_hours: f64,
    pub red_penalty: f64,
    pub yellow_below_hours: f64,
    pub yellow_penalty: f64,
}

impl Default for DigestTiming {
    fn default() -> Self {
        Self {
            red_below_hours: 1.0,
            red_penalty: 40.0,
            yellow_below_hours: 3.0,
            yellow_penalty: 20.0,
        }
    }
}

/// Nutrition scoring variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionPolicy {
    pub scale: NutrientScale,
    #[serde(default)]
    pub timing: DigestTiming,
}

impl Default for NutritionPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

impl NutritionPolicy {
    /// Three-level poll, high 15 / med 5 / low 0
    pub fn standard() -> Self {
        Self {
            scale: NutrientScale::Levels {
                high: 15.0,
                med: 5.0,
                low: 0.0,
            },
            timing: DigestTiming::default(),
        }
    }

    /// Three-level poll with a lighter high weight, high 12 / med 5 / low 0
    pub fn reduced_high() -> Self {
        Self {
            scale: NutrientScale::Levels {
                high: 12.0,
                med: 5.0,
                low: 0.0,
            },
            timing: DigestTiming::default(),
        }
    }

    /// Checkbox poll, 10 points per ticked nutrient
    pub fn checkbox() -> Self {
        Self {
            scale: NutrientScale::Flags { penalty: 10.0 },
            timing: DigestTiming::default(),
        }
    }

    /// Total nutrient penalty for a set of answers.
    ///
    /// Fails when the answer shape does not match the policy's scale.
    pub fn penalty(&self, nutrients: &Nutrients) -> Result<f64, ValidationError> {
        match (&self.scale, nutrients) {
            (NutrientScale::Levels { high, med, low }, Nutrients::Levels { salt, sugar, fat }) => {
                let weight = |level: &Level| match level {
                    Level::High => *high,
                    Level::Med => *med,
                    Level::Low => *low,
                };
                Ok(weight(salt) + weight(sugar) + weight(fat))
            }
            (NutrientScale::Flags { penalty }, Nutrients::Flags { .. }) => {
                let ticked = Nutrient::ALL
                    .iter()
                    .filter(|n| nutrients.is_high(**n))
                    .count();
                Ok(ticked as f64 * penalty)
            }
            (NutrientScale::Levels { .. }, Nutrients::Flags { .. }) => {
                Err(ValidationError::PolicyMismatch {
                    field: "nutrients".to_string(),
                    expected: "low/med/high levels".to_string(),
                })
            }
            (NutrientScale::Flags { .. }, Nutrients::Levels { .. }) => {
                Err(ValidationError::PolicyMismatch {
                    field: "nutrients".to_string(),
                    expected: "yes/no flags".to_string(),
                })
            }
        }
    }

    pub fn uses_flags(&self) -> bool {
        matches!(self.scale, NutrientScale::Flags { .. })
    }
}

/// Penalty applied when the screen-free gap is below `below_hours`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapPenalty {
    pub below_hours: f64,
    pub penalty: f64,
}

/// Penalty applied when residual caffeine is above `above_mg`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidualPenalty {
    pub above_mg: f64,
    pub penalty: f64,
}

/// Score thresholds for the wizard remark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemarkThresholds {
    pub excellent_above: f64,
    pub average_above: f64,
}

impl Default for RemarkThresholds {
    fn default() -> Self {
        Self {
            excellent_above: 80.0,
            average_above: 50.0,
        }
    }
}

/// Complete scoring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringPolicy {
    pub preset: PolicyPreset,
    #[serde(default)]
    pub caffeine: CaffeinePolicy,
    #[serde(default)]
    pub nutrition: NutritionPolicy,
    /// Screen gap brackets, first match wins
    pub screen_gap_penalties: Vec<GapPenalty>,
    /// Residual caffeine brackets, first match wins in list order
    #[serde(default)]
    pub residual_penalties: Vec<ResidualPenalty>,
    #[serde(default)]
    pub remarks: RemarkThresholds,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self::basic()
    }
}

impl ScoringPolicy {
    pub fn basic() -> Self {
        Self {
            preset: PolicyPreset::Basic,
            caffeine: CaffeinePolicy::default(),
            nutrition: NutritionPolicy::standard(),
            screen_gap_penalties: vec![
                GapPenalty {
                    below_hours: 1.0,
                    penalty: 30.0,
                },
                GapPenalty {
                    below_hours: 2.0,
                    penalty: 15.0,
                },
            ],
            residual_penalties: Vec::new(),
            remarks: RemarkThresholds::default(),
        }
    }

    pub fn caffeine_extended() -> Self {
        Self {
            preset: PolicyPreset::CaffeineExtended,
            caffeine: CaffeinePolicy::default(),
            nutrition: NutritionPolicy::reduced_high(),
            screen_gap_penalties: vec![GapPenalty {
                below_hours: 1.0,
                penalty: 25.0,
            }],
            // The 50 mg bracket matches first, so anything above 50 mg costs 20
            residual_penalties: vec![
                ResidualPenalty {
                    above_mg: 50.0,
                    penalty: 20.0,
                },
                ResidualPenalty {
                    above_mg: 100.0,
                    penalty: 40.0,
                },
            ],
            remarks: RemarkThresholds::default(),
        }
    }

    pub fn checkbox_nutrition() -> Self {
        Self {
            preset: PolicyPreset::CheckboxNutrition,
            nutrition: NutritionPolicy::checkbox(),
            ..Self::basic()
        }
    }

    pub fn from_preset(preset: PolicyPreset) -> Self {
        match preset {
            PolicyPreset::Basic => Self::basic(),
            PolicyPreset::CaffeineExtended => Self::caffeine_extended(),
            PolicyPreset::CheckboxNutrition => Self::checkbox_nutrition(),
        }
    }

    /// Resolve a preset by name ("basic", "caffeine-extended", ...)
    pub fn by_name(name: &str) -> Result<Self, ValidationError> {
        name.parse::<PolicyPreset>().map(Self::from_preset)
    }

    /// Load a policy from JSON
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the policy to pretty JSON
    pub fn to_json(&self) -> Result<String, ComputeError> {
        serde_json::to_string_pretty(self).map_err(|e| ComputeError::EncodingError(e.to_string()))
    }

    pub fn name(&self) -> &'static str {
        self.preset.as_str()
    }

    /// Whether the quick score includes a residual-caffeine term
    pub fn uses_caffeine(&self) -> bool {
        !self.residual_penalties.is_empty()
    }

    /// Penalty for a screen-free gap, first matching bracket
    pub fn screen_gap_penalty(&self, gap_hours: f64) -> f64 {
        self.screen_gap_penalties
            .iter()
            .find(|b| gap_hours < b.below_hours)
            .map(|b| b.penalty)
            .unwrap_or(0.0)
    }

    /// Penalty for residual caffeine, first matching bracket
    pub fn residual_penalty(&self, residual_mg: f64) -> f64 {
        self.residual_penalties
            .iter()
            .find(|b| residual_mg > b.above_mg)
            .map(|b| b.penalty)
            .unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_preset_names() {
        for preset in PolicyPreset::ALL {
            assert_eq!(preset.as_str().parse::<PolicyPreset>().unwrap(), preset);
        }
        assert_eq!(
            "Caffeine_Extended".parse::<PolicyPreset>().unwrap(),
            PolicyPreset::CaffeineExtended
        );
        assert!(matches!(
            ScoringPolicy::by_name("strict"),
            Err(ValidationError::UnknownPolicy(_))
        ));
    }

    #[test]
    fn test_residual_mg_half_life() {
        let policy = CaffeinePolicy::default();
        assert_eq!(policy.residual_mg(0, 3.0), 0.0);
        assert_eq!(policy.residual_mg(2, 0.0), 190.0);
        assert!((policy.residual_mg(2, 5.5) - 95.0).abs() < 1e-9);
    }

    #[test]
    fn test_level_penalties() {
        let all_high = Nutrients::levels(Level::High, Level::High, Level::High);
        let mixed = Nutrients::levels(Level::High, Level::Med, Level::Low);
        let all_low = Nutrients::levels(Level::Low, Level::Low, Level::Low);

        assert_eq!(NutritionPolicy::standard().penalty(&all_high).unwrap(), 45.0);
        assert_eq!(NutritionPolicy::standard().penalty(&mixed).unwrap(), 20.0);
        assert_eq!(NutritionPolicy::reduced_high().penalty(&all_high).unwrap(), 36.0);
        assert_eq!(NutritionPolicy::reduced_high().penalty(&mixed).unwrap(), 17.0);
        assert_eq!(NutritionPolicy::standard().penalty(&all_low).unwrap(), 0.0);
    }

    #[test]
    fn test_flag_penalties() {
        let policy = NutritionPolicy::checkbox();
        assert_eq!(policy.penalty(&Nutrients::flags(true, false, true)).unwrap(), 20.0);
        assert_eq!(policy.penalty(&Nutrients::flags(false, false, false)).unwrap(), 0.0);
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let err = NutritionPolicy::checkbox()
            .penalty(&Nutrients::levels(Level::Low, Level::Low, Level::Low))
            .unwrap_err();
        assert_eq!(err.field(), Some("nutrients"));

        let err = NutritionPolicy::standard()
            .penalty(&Nutrients::flags(true, true, true))
            .unwrap_err();
        assert!(matches!(err, ValidationError::PolicyMismatch { .. }));
    }

    #[test]
    fn test_gap_brackets_first_match() {
        let basic = ScoringPolicy::basic();
        assert_eq!(basic.screen_gap_penalty(-0.5), 30.0);
        assert_eq!(basic.screen_gap_penalty(0.5), 30.0);
        assert_eq!(basic.screen_gap_penalty(1.5), 15.0);
        assert_eq!(basic.screen_gap_penalty(2.0), 0.0);

        let extended = ScoringPolicy::caffeine_extended();
        assert_eq!(extended.screen_gap_penalty(1.5), 0.0);
    }

    #[test]
    fn test_residual_brackets_first_match() {
        let policy = ScoringPolicy::caffeine_extended();
        assert_eq!(policy.residual_penalty(150.0), 20.0);
        assert_eq!(policy.residual_penalty(100.5), 20.0);
        assert_eq!(policy.residual_penalty(75.0), 20.0);
        assert_eq!(policy.residual_penalty(50.0), 0.0);
        assert!(policy.uses_caffeine());

        // A tuned policy listing the higher threshold first reaches it
        let mut tuned = ScoringPolicy::caffeine_extended();
        tuned.residual_penalties.reverse();
        assert_eq!(tuned.residual_penalty(150.0), 40.0);
        assert_eq!(tuned.residual_penalty(75.0), 20.0);
        assert!(!ScoringPolicy::basic().uses_caffeine());
    }

    #[test]
    fn test_checkbox_preset_shares_basic_brackets() {
        let checkbox = ScoringPolicy::checkbox_nutrition();
        assert_eq!(checkbox.screen_gap_penalties, ScoringPolicy::basic().screen_gap_penalties);
        assert!(checkbox.nutrition.uses_flags());
    }

    #[test]
    fn test_policy_json_roundtrip() {
        let policy = ScoringPolicy::caffeine_extended();
        let json = policy.to_json().unwrap();
        assert!(json.contains("\"caffeine-extended\""));

        let back = ScoringPolicy::from_json(&json).unwrap();
        assert_eq!(back, policy);
    }

    #[test]
    fn test_policy_json_defaults() {
        let json = r#"{
            "preset": "basic",
            "screen_gap_penalties": [{ "below_hours": 1.5, "penalty": 10.0 }]
        }"#;
        let policy = ScoringPolicy::from_json(json).unwrap();
        assert_eq!(policy.caffeine, CaffeinePolicy::default());
        assert_eq!(policy.nutrition, NutritionPolicy::standard());
        assert_eq!(policy.screen_gap_penalty(1.0), 10.0);
    }
}

//! Single-score wizard evaluation
//!
//! The short wizards produce one sleep quality percentage straight from the
//! screen gap, an optional residual-caffeine term and the meal poll. Weights
//! and brackets come from the `ScoringPolicy`.

use crate::caffeine::hours_until_bed;
use crate::error::ValidationError;
use crate::policy::ScoringPolicy;
use crate::types::{round_to, QuickInput, QuickScore};
use tracing::debug;

pub const REMARK_EXCELLENT: &str =
    "🌟 REMARK: Perfect synchronization! Your melatonin surge is optimal.";
pub const REMARK_AVERAGE: &str =
    "⚖️ REMARK: Average. Your habits are likely fragmenting your sleep stages.";
pub const REMARK_POOR: &str =
    "📉 REMARK: Poor. Your body is likely in 'Daytime Mode' due to blue light or heavy digestion.";

pub const CAFFEINE_HIGH: &str =
    "Caffeine levels are high. It blocks Adenosine, the chemical that signals sleepiness to your brain.";
pub const CAFFEINE_LOW: &str = "Caffeine levels are low enough for natural sleep onset.";

/// Residual above which the caffeine insight turns to the warning (mg)
pub const CAFFEINE_INSIGHT_THRESHOLD_MG: f64 = 80.0;

/// Score a wizard's answers under `policy`.
///
/// Policies with residual-caffeine brackets require `input.caffeine`.
pub fn quick_score(input: &QuickInput, policy: &ScoringPolicy) -> Result<QuickScore, ValidationError> {
    let screen_gap_hours = input.bed_time.hours_since(input.stop_time);
    let mut score = 100.0 - policy.screen_gap_penalty(screen_gap_hours);

    let mut residual_mg = None;
    let mut caffeine_insight = None;
    if policy.uses_caffeine() {
        let (cups, last_cup) = input.caffeine.ok_or_else(|| ValidationError::MissingAnswer {
            field: "caffeine".to_string(),
        })?;
        let residual = policy
            .caffeine
            .residual_mg(cups, hours_until_bed(last_cup, input.bed_time));
        score -= policy.residual_penalty(residual);

        caffeine_insight = Some(if residual > CAFFEINE_INSIGHT_THRESHOLD_MG {
            CAFFEINE_HIGH.to_string()
        } else {
            CAFFEINE_LOW.to_string()
        });
        residual_mg = Some(round_to(residual, 2));
    }

    score -= policy.nutrition.penalty(&input.nutrients)?;
    let score = f64::max(0.0, score).round_ties_even();

    let remark = if score > policy.remarks.excellent_above {
        REMARK_EXCELLENT
    } else if score > policy.remarks.average_above {
        REMARK_AVERAGE
    } else {
        REMARK_POOR
    };

    debug!(policy = policy.name(), screen_gap_hours, score, "computed quick score");

    Ok(QuickScore {
        policy: policy.name().to_string(),
        score,
        screen_gap_hours,
        residual_mg,
        remark: remark.to_string(),
        caffeine_insight,
    })
}

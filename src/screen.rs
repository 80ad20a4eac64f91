//! Screen-time model
//!
//! Scores the screen-free gap before bed and the planned sleep duration.
//! Note the 60-120 minute gap band carries neither a penalty nor an insight.

use crate::error::{check_range, ValidationError};
use crate::types::{ScreenInput, ScreenResult, TimeOfDay};
use tracing::{debug, trace};

pub const INSIGHT_CRITICAL: &str =
    "❌ CRITICAL: You used your phone in bed. This tricks your brain into 'Daytime Mode'.";
pub const INSIGHT_POOR: &str =
    "⚠️ POOR: Only 1 hour gap. Expect difficulty reaching deep 'Stage 3' sleep.";
pub const INSIGHT_EXCELLENT: &str =
    "✅ EXCELLENT: 2+ hour gap allows your natural melatonin surge to peak.";

pub const FORECAST_HIGH_ALERTNESS: &str =
    "🚀 High Alertness: Expect peak focus and stable mood tomorrow.";
pub const FORECAST_MODERATE: &str =
    "⚖️ Moderate: You might feel a 'mid-afternoon slump' or slight irritability.";
pub const FORECAST_IMPAIRED: &str =
    "📉 Impaired: High risk of 'brain fog', slow reaction times, and sugar cravings.";

/// Adult sleep floor (hours)
pub const MIN_SLEEP_HOURS: f64 = 7.0;

const PHONE_IN_BED_PENALTY: f64 = 40.0;
const SHORT_GAP_PENALTY: f64 = 20.0;
const SHORT_SLEEP_PENALTY: f64 = 15.0;

/// Screen-time sleep-quality evaluator
#[derive(Debug, Clone, Copy, Default)]
pub struct ScreenTimeModel;

impl ScreenTimeModel {
    /// Evaluate phone habits against bed and wake times.
    ///
    /// `usage_hours` is validated and echoed on the result but does not
    /// contribute to the score.
    pub fn evaluate(
        &self,
        usage_hours: f64,
        stop_time: TimeOfDay,
        bed_time: TimeOfDay,
        wake_time: TimeOfDay,
    ) -> Result<ScreenResult, ValidationError> {
        check_range("usage_hours", usage_hours, 0.0, 24.0)?;

        let sleep_hours = sleep_duration_hours(bed_time, wake_time);
        let gap_minutes = bed_time.hours_since(stop_time) * 60.0;

        let mut score = 100.0;
        let mut insights = Vec::new();

        if gap_minutes < 0.0 {
            score -= PHONE_IN_BED_PENALTY;
            insights.push(INSIGHT_CRITICAL.to_string());
        } else if gap_minutes < 60.0 {
            score -= SHORT_GAP_PENALTY;
            insights.push(INSIGHT_POOR.to_string());
        } else if gap_minutes >= 120.0 {
            insights.push(INSIGHT_EXCELLENT.to_string());
        } else {
            trace!(gap_minutes, "gap in the 60-120 minute band, no adjustment");
        }

        let sufficiency = if sleep_hours < MIN_SLEEP_HOURS {
            score -= SHORT_SLEEP_PENALTY;
            format!("Insufficient ({sleep_hours:.1}h). Most adults need 7-9 hours.")
        } else {
            format!("Sufficient ({sleep_hours:.1}h). Your body has time for cellular repair.")
        };

        let forecast = forecast_for(score);
        let score = f64::max(0.0, score);

        debug!(gap_minutes, sleep_hours, score, "evaluated screen time");

        Ok(ScreenResult {
            score,
            usage_hours,
            sleep_hours,
            gap_minutes,
            sufficiency,
            insights,
            forecast: forecast.to_string(),
        })
    }

    pub fn evaluate_input(&self, input: &ScreenInput) -> Result<ScreenResult, ValidationError> {
        self.evaluate(
            input.usage_hours,
            input.stop_time,
            input.bed_time,
            input.wake_time,
        )
    }
}

/// Sleep duration, treating a wake time earlier on the clock as the next day
pub fn sleep_duration_hours(bed_time: TimeOfDay, wake_time: TimeOfDay) -> f64 {
    if wake_time < bed_time {
        wake_time.hours_since(bed_time) + 24.0
    } else {
        wake_time.hours_since(bed_time)
    }
}

/// Next-day forecast bracket for a screen-time score
pub fn forecast_for(score: f64) -> &'static str {
    if score > 85.0 {
        FORECAST_HIGH_ALERTNESS
    } else if score > 60.0 {
        FORECAST_MODERATE
    } else {
        FORECAST_IMPAIRED
    }
}

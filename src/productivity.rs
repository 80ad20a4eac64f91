//! Next-day productivity prediction
//!
//! Starts from 100%, subtracts 10 points per hour of sleep debt and a flat
//! "caffeine hangover" penalty when the last cup falls within six hours of
//! bedtime. The prediction never drops below 5%.

use crate::error::{check_range, ValidationError};
use crate::types::{ProductivityInput, ProductivityResult, SystemLoad, TimeOfDay};
use tracing::debug;

/// Reference night of sleep (hours)
pub const REFERENCE_SLEEP_HOURS: f64 = 8.0;

/// Longest previous night accepted as input (hours)
pub const MAX_PREVIOUS_SLEEP_HOURS: f64 = 12.0;

const DEBT_PENALTY_PER_HOUR: f64 = 10.0;
const LATE_CAFFEINE_WINDOW_HOURS: f64 = 6.0;
const LATE_CAFFEINE_PENALTY: f64 = 15.0;
const PRODUCTIVITY_FLOOR: f64 = 5.0;
const HIGH_LOAD_CUPS: u32 = 3;

pub const STATE_PEAK: &str = "Peak Focus: High neuroplasticity.";
pub const STATE_MODERATE: &str = "Moderate: Potential brain fog at 3 PM.";
pub const STATE_LOW: &str = "Low: High reliance on stimulants expected.";

/// Productivity evaluator
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductivityModel;

impl ProductivityModel {
    pub fn evaluate(
        &self,
        previous_sleep_hours: f64,
        bed_time: TimeOfDay,
        last_caffeine: TimeOfDay,
        cup_count: u32,
    ) -> Result<ProductivityResult, ValidationError> {
        check_range(
            "previous_sleep_hours",
            previous_sleep_hours,
            0.0,
            MAX_PREVIOUS_SLEEP_HOURS,
        )?;

        let sleep_debt_hours = sleep_debt(previous_sleep_hours);
        let mut score = 100.0 - sleep_debt_hours * DEBT_PENALTY_PER_HOUR;

        // Same-day gap; a cup after bedtime on the clock counts as late
        let caffeine_gap_hours = bed_time.hours_since(last_caffeine);
        if caffeine_gap_hours < LATE_CAFFEINE_WINDOW_HOURS {
            score -= LATE_CAFFEINE_PENALTY;
        }

        let score = f64::max(PRODUCTIVITY_FLOOR, score).round_ties_even();
        let system_load = if cup_count > HIGH_LOAD_CUPS {
            SystemLoad::High
        } else {
            SystemLoad::Normal
        };

        debug!(sleep_debt_hours, caffeine_gap_hours, score, "predicted productivity");

        Ok(ProductivityResult {
            score,
            sleep_debt_hours,
            caffeine_gap_hours,
            cognitive_state: cognitive_state_for(score).to_string(),
            system_load,
        })
    }

    pub fn evaluate_input(
        &self,
        input: &ProductivityInput,
    ) -> Result<ProductivityResult, ValidationError> {
        self.evaluate(
            input.previous_sleep_hours,
            input.bed_time,
            input.last_caffeine,
            input.cup_count,
        )
    }
}

/// Shortfall against the reference night; surplus sleep is not banked
pub fn sleep_debt(previous_sleep_hours: f64) -> f64 {
    f64::max(0.0, REFERENCE_SLEEP_HOURS - previous_sleep_hours)
}

pub fn cognitive_state_for(score: f64) -> &'static str {
    if score > 85.0 {
        STATE_PEAK
    } else if score > 60.0 {
        STATE_MODERATE
    } else {
        STATE_LOW
    }
}

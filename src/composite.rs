//! Composite scoring
//!
//! Averages the caffeine, screen-time and nutrition scores into one projected
//! sleep quality percentage.

use crate::types::CompositeResult;

/// Aggregator for the three component scores
pub struct CompositeAggregator;

impl CompositeAggregator {
    /// Arithmetic mean of the three component scores.
    ///
    /// No clamping: inputs are each already within 0-100.
    pub fn combine(caffeine_score: f64, screen_score: f64, nutrition_score: f64) -> f64 {
        (caffeine_score + screen_score + nutrition_score) / 3.0
    }

    /// Combine into a `CompositeResult` keeping the component scores
    pub fn composite(caffeine_score: f64, screen_score: f64, nutrition_score: f64) -> CompositeResult {
        CompositeResult {
            caffeine_score,
            screen_score,
            nutrition_score,
            final_score: Self::combine(caffeine_score, screen_score, nutrition_score),
        }
    }
}

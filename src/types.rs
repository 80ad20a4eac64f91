//! Core types for the SleepSync evaluators
//!
//! This module defines the values that flow into and out of each evaluator:
//! time-of-day readings, nutrient answers, per-model inputs and results, and
//! the combined daily report.

use crate::error::ValidationError;
use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Wall-clock time of day (no date, no timezone)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Build a time of day, returning `None` when out of range
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self { hour, minute })
        } else {
            None
        }
    }

    /// Parse "HH:MM" 24-hour text, attributing failures to `field`
    pub fn parse(field: &str, text: &str) -> Result<Self, ValidationError> {
        let parsed = NaiveTime::parse_from_str(text.trim(), "%H:%M").map_err(|_| {
            ValidationError::InvalidTime {
                field: field.to_string(),
                value: text.to_string(),
            }
        })?;

        Ok(Self {
            hour: parsed.hour() as u8,
            minute: parsed.minute() as u8,
        })
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Minutes elapsed since midnight
    pub fn minutes_since_midnight(&self) -> u32 {
        self.hour as u32 * 60 + self.minute as u32
    }

    /// Signed same-day difference `self - earlier` in hours.
    ///
    /// Negative when `earlier` is later on the clock; callers decide whether
    /// that means the previous day.
    pub fn hours_since(&self, earlier: TimeOfDay) -> f64 {
        (self.minutes_since_midnight() as f64 - earlier.minutes_since_midnight() as f64) / 60.0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeOfDay::parse("time", s)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// Self-reported intake level for a nutrient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Low,
    Med,
    High,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "low",
            Level::Med => "med",
            Level::High => "high",
        }
    }

    /// Parse a level token case-insensitively, attributing failures to `field`
    pub fn parse(field: &str, text: &str) -> Result<Self, ValidationError> {
        match text.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Level::Low),
            "med" | "medium" => Ok(Level::Med),
            "high" => Ok(Level::High),
            _ => Err(ValidationError::InvalidLevel {
                field: field.to_string(),
                value: text.to_string(),
            }),
        }
    }
}

impl FromStr for Level {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::parse("level", s)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nutrients covered by the meal poll, in reporting order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nutrient {
    Salt,
    Sugar,
    Fat,
}

impl Nutrient {
    pub const ALL: [Nutrient; 3] = [Nutrient::Salt, Nutrient::Sugar, Nutrient::Fat];

    pub fn as_str(&self) -> &'static str {
        match self {
            Nutrient::Salt => "salt",
            Nutrient::Sugar => "sugar",
            Nutrient::Fat => "fat",
        }
    }
}

/// Answers to the meal poll.
///
/// Three-level answers feed the weighted policies; boolean flags feed the
/// checkbox policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Nutrients {
    Levels { salt: Level, sugar: Level, fat: Level },
    Flags { salt: bool, sugar: bool, fat: bool },
}

impl Nutrients {
    pub fn levels(salt: Level, sugar: Level, fat: Level) -> Self {
        Nutrients::Levels { salt, sugar, fat }
    }

    pub fn flags(salt: bool, sugar: bool, fat: bool) -> Self {
        Nutrients::Flags { salt, sugar, fat }
    }

    /// No nutrient reported high
    pub fn none_high(&self) -> bool {
        Nutrient::ALL.iter().all(|n| !self.is_high(*n))
    }

    /// Whether a nutrient was reported high (or ticked, for flags)
    pub fn is_high(&self, nutrient: Nutrient) -> bool {
        match self {
            Nutrients::Levels { salt, sugar, fat } => {
                let level = match nutrient {
                    Nutrient::Salt => salt,
                    Nutrient::Sugar => sugar,
                    Nutrient::Fat => fat,
                };
                *level == Level::High
            }
            Nutrients::Flags { salt, sugar, fat } => match nutrient {
                Nutrient::Salt => *salt,
                Nutrient::Sugar => *sugar,
                Nutrient::Fat => *fat,
            },
        }
    }
}

/// Inputs for the caffeine decay model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaffeineInput {
    /// Standard cups of coffee (~95 mg each)
    pub cup_count: u32,
    /// Time of the last cup
    pub last_intake: TimeOfDay,
    /// Intended bedtime
    pub bed_time: TimeOfDay,
}

/// Caffeine model output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaffeineResult {
    /// Hours between last intake and bedtime (after wraparound)
    pub hours_since_intake: f64,
    /// Caffeine remaining at bedtime (mg, 2 dp)
    pub residual_mg: f64,
    /// Sleep quality score (0-100, 1 dp)
    pub score: f64,
    /// Advice for the score bracket
    pub feedback: String,
}

/// Inputs for the screen-time model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenInput {
    /// Total phone usage today (hours). Recorded, not scored.
    pub usage_hours: f64,
    /// When the phone was put down
    pub stop_time: TimeOfDay,
    /// When sleep starts
    pub bed_time: TimeOfDay,
    /// Planned wake-up time
    pub wake_time: TimeOfDay,
}

/// Screen-time model output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenResult {
    /// Sleep quality score (0-100)
    pub score: f64,
    /// Usage hours echoed from the input
    pub usage_hours: f64,
    /// Sleep duration with overnight wraparound (hours)
    pub sleep_hours: f64,
    /// Screen-free minutes before bed (negative when used in bed)
    pub gap_minutes: f64,
    /// Sleep duration label
    pub sufficiency: String,
    /// Gap insights (at most one)
    pub insights: Vec<String>,
    /// Next-day forecast
    pub forecast: String,
}

/// Inputs for the nutrition model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionInput {
    /// Time of the last meal or snack
    pub meal_time: TimeOfDay,
    /// Intended bedtime
    pub bed_time: TimeOfDay,
    /// Meal poll answers
    pub nutrients: Nutrients,
}

/// Nutrition model output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionResult {
    /// Dietary sleep score (floored at 0)
    pub score: f64,
    /// Hours between meal and bedtime (same-day, may be negative)
    pub digest_gap_hours: f64,
    /// Sum of the nutrient penalties applied
    pub nutrient_penalty: f64,
    /// Body impact messages, timing first
    pub effects: Vec<String>,
}

/// Mean of the three component scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeResult {
    pub caffeine_score: f64,
    pub screen_score: f64,
    pub nutrition_score: f64,
    /// Arithmetic mean, unrounded
    pub final_score: f64,
}

impl CompositeResult {
    /// Final score rounded for display as a percentage
    pub fn display_percent(&self) -> i64 {
        self.final_score.round_ties_even() as i64
    }
}

/// One day's log feeding all three models (bedtime is shared)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyLog {
    pub cup_count: u32,
    pub last_caffeine: TimeOfDay,
    pub bed_time: TimeOfDay,
    pub usage_hours: f64,
    pub stop_time: TimeOfDay,
    pub wake_time: TimeOfDay,
    pub meal_time: TimeOfDay,
    pub nutrients: Nutrients,
}

impl DailyLog {
    pub fn caffeine_input(&self) -> CaffeineInput {
        CaffeineInput {
            cup_count: self.cup_count,
            last_intake: self.last_caffeine,
            bed_time: self.bed_time,
        }
    }

    pub fn screen_input(&self) -> ScreenInput {
        ScreenInput {
            usage_hours: self.usage_hours,
            stop_time: self.stop_time,
            bed_time: self.bed_time,
            wake_time: self.wake_time,
        }
    }

    pub fn nutrition_input(&self) -> NutritionInput {
        NutritionInput {
            meal_time: self.meal_time,
            bed_time: self.bed_time,
            nutrients: self.nutrients,
        }
    }
}

/// Full daily report: each component plus the composite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepReport {
    pub caffeine: CaffeineResult,
    pub screen: ScreenResult,
    pub nutrition: NutritionResult,
    pub composite: CompositeResult,
}

/// Inputs for the next-day productivity prediction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductivityInput {
    /// Hours slept last night
    pub previous_sleep_hours: f64,
    /// Planned bedtime today
    pub bed_time: TimeOfDay,
    /// Time of the last caffeinated drink
    pub last_caffeine: TimeOfDay,
    /// Coffee/tea cups today
    pub cup_count: u32,
}

/// Stimulant load label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemLoad {
    Normal,
    High,
}

impl SystemLoad {
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemLoad::Normal => "Normal",
            SystemLoad::High => "High",
        }
    }
}

/// Productivity prediction output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductivityResult {
    /// Predicted productivity percentage (rounded, floored at 5)
    pub score: f64,
    /// Shortfall against 8 hours (never negative)
    pub sleep_debt_hours: f64,
    /// Hours between last caffeine and bedtime (same-day)
    pub caffeine_gap_hours: f64,
    pub cognitive_state: String,
    pub system_load: SystemLoad,
}

/// Inputs for a single-score wizard evaluation under a scoring policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickInput {
    pub stop_time: TimeOfDay,
    pub bed_time: TimeOfDay,
    /// Cup count and time of the last cup; only policies with a caffeine
    /// term read it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caffeine: Option<(u32, TimeOfDay)>,
    pub nutrients: Nutrients,
}

/// Single-score wizard output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuickScore {
    /// Name of the policy that produced the score
    pub policy: String,
    /// Sleep quality score (rounded, floored at 0)
    pub score: f64,
    /// Screen-free hours before bed
    pub screen_gap_hours: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub residual_mg: Option<f64>,
    pub remark: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caffeine_insight: Option<String>,
}

/// Which evaluator produced a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Caffeine,
    Screen,
    Nutrition,
    Composite,
    Productivity,
    Quick,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Caffeine => "caffeine",
            ReportKind::Screen => "screen",
            ReportKind::Nutrition => "nutrition",
            ReportKind::Composite => "composite",
            ReportKind::Productivity => "productivity",
            ReportKind::Quick => "quick",
        }
    }
}

/// Report producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Complete report payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportPayload {
    pub report_version: String,
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    /// Scoring policy in effect
    pub policy: String,
    pub kind: ReportKind,
    /// Evaluator output
    pub result: serde_json::Value,
}

/// Round to a fixed number of decimal places (half away from zero)
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}

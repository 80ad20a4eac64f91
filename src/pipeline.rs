//! Evaluation orchestration
//!
//! This module provides the public API for SleepSync.
//! It runs the component models over a day's log and combines their scores.

use crate::caffeine::CaffeineModel;
use crate::composite::CompositeAggregator;
use crate::encoder::ReportEncoder;
use crate::error::ComputeError;
use crate::nutrition::NutritionModel;
use crate::policy::ScoringPolicy;
use crate::productivity::ProductivityModel;
use crate::quick::quick_score;
use crate::screen::ScreenTimeModel;
use crate::types::{
    CaffeineInput, CaffeineResult, DailyLog, NutritionInput, NutritionResult, ProductivityInput,
    ProductivityResult, QuickInput, QuickScore, ReportKind, ScreenInput, ScreenResult,
    SleepReport,
};
use tracing::info;

/// Run all three models over a daily log and combine the scores.
///
/// Stages:
/// 1. CaffeineModel - residual caffeine at bedtime
/// 2. ScreenTimeModel - screen-free gap and sleep duration
/// 3. NutritionModel - digest gap and meal composition
/// 4. CompositeAggregator - mean of the three scores
pub fn evaluate_daily_log(
    log: &DailyLog,
    policy: &ScoringPolicy,
) -> Result<SleepReport, ComputeError> {
    SleepSyncProcessor::with_policy(policy.clone()).daily_report(log)
}

/// Convert a daily log JSON document to a composite report JSON payload
/// (stateless, default policy).
///
/// # Example
/// ```ignore
/// let report_json = daily_log_to_report(log_json)?;
/// ```
pub fn daily_log_to_report(log_json: String) -> Result<String, ComputeError> {
    let log: DailyLog = serde_json::from_str(&log_json)?;
    let processor = SleepSyncProcessor::new();
    let report = processor.daily_report(&log)?;
    processor.encode(ReportKind::Composite, &report)
}

/// Evaluator bound to one scoring policy.
///
/// Use this when several evaluations share a policy and encoder.
pub struct SleepSyncProcessor {
    policy: ScoringPolicy,
    caffeine: CaffeineModel,
    screen: ScreenTimeModel,
    nutrition: NutritionModel,
    productivity: ProductivityModel,
    encoder: ReportEncoder,
}

impl Default for SleepSyncProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl SleepSyncProcessor {
    /// Create a processor with the default ("basic") policy
    pub fn new() -> Self {
        Self::with_policy(ScoringPolicy::default())
    }

    /// Create a processor with a specific policy
    pub fn with_policy(policy: ScoringPolicy) -> Self {
        Self {
            caffeine: CaffeineModel::new(policy.caffeine.clone()),
            screen: ScreenTimeModel,
            nutrition: NutritionModel::new(policy.nutrition.clone()),
            productivity: ProductivityModel,
            encoder: ReportEncoder::new(),
            policy,
        }
    }

    /// Replace the policy from JSON
    pub fn load_policy(&mut self, json: &str) -> Result<(), ComputeError> {
        let policy = ScoringPolicy::from_json(json)?;
        *self = Self {
            encoder: std::mem::take(&mut self.encoder),
            ..Self::with_policy(policy)
        };
        Ok(())
    }

    /// Save the active policy as JSON
    pub fn save_policy(&self) -> Result<String, ComputeError> {
        self.policy.to_json()
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    pub fn caffeine(&self, input: &CaffeineInput) -> Result<CaffeineResult, ComputeError> {
        Ok(self.caffeine.evaluate_input(input)?)
    }

    pub fn screen(&self, input: &ScreenInput) -> Result<ScreenResult, ComputeError> {
        Ok(self.screen.evaluate_input(input)?)
    }

    pub fn nutrition(&self, input: &NutritionInput) -> Result<NutritionResult, ComputeError> {
        Ok(self.nutrition.evaluate_input(input)?)
    }

    pub fn productivity(
        &self,
        input: &ProductivityInput,
    ) -> Result<ProductivityResult, ComputeError> {
        Ok(self.productivity.evaluate_input(input)?)
    }

    pub fn quick(&self, input: &QuickInput) -> Result<QuickScore, ComputeError> {
        Ok(quick_score(input, &self.policy)?)
    }

    /// Evaluate all three components and combine them
    pub fn daily_report(&self, log: &DailyLog) -> Result<SleepReport, ComputeError> {
        let caffeine = self.caffeine(&log.caffeine_input())?;
        let screen = self.screen(&log.screen_input())?;
        let nutrition = self.nutrition(&log.nutrition_input())?;

        let composite =
            CompositeAggregator::composite(caffeine.score, screen.score, nutrition.score);

        info!(
            policy = self.policy.name(),
            final_score = composite.final_score,
            "daily report computed"
        );

        Ok(SleepReport {
            caffeine,
            screen,
            nutrition,
            composite,
        })
    }

    /// Encode any evaluator result with this processor's encoder and policy
    pub fn encode<T: serde::Serialize>(
        &self,
        kind: ReportKind,
        result: &T,
    ) -> Result<String, ComputeError> {
        self.encoder.encode_to_json(kind, self.policy.name(), result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Level, Nutrients, TimeOfDay};
    use pretty_assertions::assert_eq;

    fn t(text: &str) -> TimeOfDay {
        TimeOfDay::parse("time", text).unwrap()
    }

    fn sample_log() -> DailyLog {
        DailyLog {
            cup_count: 2,
            last_caffeine: t("16:15"),
            bed_time: t("23:15"),
            usage_hours: 4.0,
            stop_time: t("21:30"),
            wake_time: t("07:00"),
            meal_time: t("20:45"),
            nutrients: Nutrients::levels(Level::Low, Level::Low, Level::Low),
        }
    }

    fn sample_log_json() -> &'static str {
        r#"{
            "cup_count": 2,
            "last_caffeine": "16:15",
            "bed_time": "23:15",
            "usage_hours": 4.0,
            "stop_time": "21:30",
            "wake_time": "07:00",
            "meal_time": "20:45",
            "nutrients": { "kind": "levels", "salt": "low", "sugar": "low", "fat": "low" }
        }"#
    }

    #[test]
    fn test_daily_report_dashboard_defaults() {
        let report = evaluate_daily_log(&sample_log(), &ScoringPolicy::basic()).unwrap();

        // 190 mg * 0.5^(7 / 5.5) = 78.64 mg
        assert_eq!(report.caffeine.residual_mg, 78.64);
        assert_eq!(report.caffeine.score, 60.7);

        // 105 minute gap, 7.75h sleep
        assert_eq!(report.screen.score, 100.0);
        assert!(report.screen.insights.is_empty());

        // 2.5h digest gap
        assert_eq!(report.nutrition.score, 80.0);

        let expected = (60.7 + 100.0 + 80.0) / 3.0;
        assert!((report.composite.final_score - expected).abs() < 1e-9);
        assert_eq!(report.composite.display_percent(), 80);
    }

    #[test]
    fn test_daily_log_to_report() {
        let json = daily_log_to_report(sample_log_json().to_string()).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(payload["report_version"], "1.0.0");
        assert_eq!(payload["producer"]["name"], "sleepsync");
        assert_eq!(payload["policy"], "basic");
        assert_eq!(payload["kind"], "composite");
        assert_eq!(payload["result"]["nutrition"]["score"], 80.0);
        assert_eq!(payload["result"]["caffeine"]["residual_mg"], 78.64);
    }

    #[test]
    fn test_invalid_json() {
        let result = daily_log_to_report("not valid json".to_string());
        assert!(matches!(result, Err(ComputeError::JsonError(_))));
    }

    #[test]
    fn test_invalid_time_in_json() {
        let json = sample_log_json().replace("\"23:15\"", "\"25:15\"");
        assert!(daily_log_to_report(json).is_err());
    }

    #[test]
    fn test_checkbox_policy_rejects_level_answers() {
        let result = evaluate_daily_log(&sample_log(), &ScoringPolicy::checkbox_nutrition());
        assert!(matches!(result, Err(ComputeError::Validation(_))));
    }

    #[test]
    fn test_scores_stay_in_range() {
        let processor = SleepSyncProcessor::new();
        let extremes = [
            DailyLog {
                cup_count: 50,
                last_caffeine: t("23:59"),
                bed_time: t("23:59"),
                usage_hours: 24.0,
                stop_time: t("23:59"),
                wake_time: t("23:59"),
                meal_time: t("23:59"),
                nutrients: Nutrients::levels(Level::High, Level::High, Level::High),
            },
            DailyLog {
                cup_count: 0,
                last_caffeine: t("00:00"),
                bed_time: t("00:00"),
                usage_hours: 0.0,
                stop_time: t("00:00"),
                wake_time: t("23:59"),
                meal_time: t("00:00"),
                nutrients: Nutrients::levels(Level::Low, Level::Low, Level::Low),
            },
        ];

        for log in &extremes {
            let report = processor.daily_report(log).unwrap();
            for score in [
                report.caffeine.score,
                report.screen.score,
                report.nutrition.score,
                report.composite.final_score,
            ] {
                assert!((0.0..=100.0).contains(&score), "score {score}");
            }
        }
    }

    #[test]
    fn test_load_and_save_policy() {
        let mut processor = SleepSyncProcessor::new();
        let instance = processor.encoder.instance_id().to_string();

        let json = ScoringPolicy::caffeine_extended().to_json().unwrap();
        processor.load_policy(&json).unwrap();

        assert_eq!(processor.policy().name(), "caffeine-extended");
        assert_eq!(processor.encoder.instance_id(), instance);

        let saved = processor.save_policy().unwrap();
        assert_eq!(ScoringPolicy::from_json(&saved).unwrap(), ScoringPolicy::caffeine_extended());
    }

    #[test]
    fn test_policy_changes_nutrition_weights() {
        let mut log = sample_log();
        log.nutrients = Nutrients::levels(Level::High, Level::High, Level::High);

        let basic = evaluate_daily_log(&log, &ScoringPolicy::basic()).unwrap();
        let extended = evaluate_daily_log(&log, &ScoringPolicy::caffeine_extended()).unwrap();

        assert_eq!(basic.nutrition.score, 35.0);
        assert_eq!(extended.nutrition.score, 44.0);
    }
}

//! Wizard sessions
//!
//! A wizard walks the user from a landing step through one or more input
//! steps to a report. Each flow has a fixed step list; the session tracks the
//! current position and the answers collected so far, and computes the flow's
//! result on entering the report step.

use crate::caffeine::MAX_CUPS;
use crate::error::{check_range, ComputeError, ValidationError};
use crate::policy::ScoringPolicy;
use crate::productivity::{ProductivityModel, MAX_PREVIOUS_SLEEP_HOURS};
use crate::quick::quick_score;
use crate::types::{Nutrients, ProductivityResult, QuickInput, QuickScore, TimeOfDay};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// The three wizards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardFlow {
    /// Screen habits and a meal poll, scored without caffeine
    SleepQuality,
    /// Screen habits, caffeine intake and a meal poll
    BioSync,
    /// Previous night's sleep and caffeine timing, predicting tomorrow
    Productivity,
}

impl WizardFlow {
    pub const ALL: [WizardFlow; 3] = [
        WizardFlow::SleepQuality,
        WizardFlow::BioSync,
        WizardFlow::Productivity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WizardFlow::SleepQuality => "sleep-quality",
            WizardFlow::BioSync => "bio-sync",
            WizardFlow::Productivity => "productivity",
        }
    }

    /// Ordered steps, always `Landing` first and `Report` last
    pub fn steps(&self) -> &'static [WizardStep] {
        use WizardStep::*;
        match self {
            WizardFlow::SleepQuality => &[Landing, Habits, Nutrition, Report],
            WizardFlow::BioSync => &[Landing, Habits, Caffeine, Nutrition, Report],
            WizardFlow::Productivity => &[Landing, Sleep, Habits, Caffeine, Report],
        }
    }

    /// Policy the flow scores with unless another is supplied
    pub fn default_policy(&self) -> ScoringPolicy {
        match self {
            WizardFlow::BioSync => ScoringPolicy::caffeine_extended(),
            WizardFlow::SleepQuality | WizardFlow::Productivity => ScoringPolicy::basic(),
        }
    }

    /// Whether `policy` can score this flow's answers
    fn accepts(&self, policy: &ScoringPolicy) -> bool {
        match self {
            WizardFlow::SleepQuality => !policy.uses_caffeine(),
            WizardFlow::BioSync => policy.uses_caffeine(),
            WizardFlow::Productivity => true,
        }
    }
}

impl fmt::Display for WizardFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WizardFlow {
    type Err = ComputeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        WizardFlow::ALL
            .into_iter()
            .find(|flow| flow.as_str() == normalized)
            .ok_or_else(|| ComputeError::WizardError(format!("unknown wizard flow '{s}'")))
    }
}

/// One screen of a wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Landing,
    /// Previous night's sleep
    Sleep,
    /// Phone stop, bed and wake times
    Habits,
    Caffeine,
    /// Meal poll
    Nutrition,
    Report,
}

impl WizardStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            WizardStep::Landing => "landing",
            WizardStep::Sleep => "sleep",
            WizardStep::Habits => "habits",
            WizardStep::Caffeine => "caffeine",
            WizardStep::Nutrition => "nutrition",
            WizardStep::Report => "report",
        }
    }
}

/// Answers collected across a session. Each flow reads only the fields its
/// steps ask for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WizardAnswers {
    pub previous_sleep_hours: Option<f64>,
    pub usage_hours: Option<f64>,
    pub stop_time: Option<TimeOfDay>,
    pub bed_time: Option<TimeOfDay>,
    pub wake_time: Option<TimeOfDay>,
    pub cup_count: Option<u32>,
    pub last_caffeine: Option<TimeOfDay>,
    pub meal_time: Option<TimeOfDay>,
    pub nutrients: Option<Nutrients>,
}

/// Result computed on entering the report step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WizardOutcome {
    Quick(QuickScore),
    Productivity(ProductivityResult),
}

impl WizardOutcome {
    pub fn score(&self) -> f64 {
        match self {
            WizardOutcome::Quick(result) => result.score,
            WizardOutcome::Productivity(result) => result.score,
        }
    }
}

/// Step machine for one wizard run
#[derive(Debug, Clone)]
pub struct WizardSession {
    flow: WizardFlow,
    policy: ScoringPolicy,
    position: usize,
    answers: WizardAnswers,
    outcome: Option<WizardOutcome>,
}

impl WizardSession {
    /// Start a session at the landing step with the flow's default policy
    pub fn new(flow: WizardFlow) -> Self {
        Self {
            flow,
            policy: flow.default_policy(),
            position: 0,
            answers: WizardAnswers::default(),
            outcome: None,
        }
    }

    /// Start a session with a specific policy.
    ///
    /// The bio-sync flow needs a policy with caffeine brackets and the
    /// sleep-quality flow one without.
    pub fn with_policy(flow: WizardFlow, policy: ScoringPolicy) -> Result<Self, ComputeError> {
        if !flow.accepts(&policy) {
            return Err(ComputeError::WizardError(format!(
                "flow {} cannot be scored with policy {}",
                flow,
                policy.name()
            )));
        }
        Ok(Self {
            policy,
            ..Self::new(flow)
        })
    }

    pub fn flow(&self) -> WizardFlow {
        self.flow
    }

    pub fn policy(&self) -> &ScoringPolicy {
        &self.policy
    }

    pub fn step(&self) -> WizardStep {
        self.flow.steps()[self.position]
    }

    pub fn answers(&self) -> &WizardAnswers {
        &self.answers
    }

    pub fn answers_mut(&mut self) -> &mut WizardAnswers {
        &mut self.answers
    }

    /// Result of the last completed run, present only at the report step
    pub fn outcome(&self) -> Option<&WizardOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_complete(&self) -> bool {
        self.step() == WizardStep::Report
    }

    /// Advance one step.
    ///
    /// Leaving an input step requires its answers; entering the report
    /// computes the outcome. At the report this is a no-op.
    pub fn next(&mut self) -> Result<WizardStep, ComputeError> {
        let steps = self.flow.steps();
        if self.position + 1 >= steps.len() {
            return Ok(self.step());
        }

        self.check_step(self.step())?;

        let target = steps[self.position + 1];
        if target == WizardStep::Report {
            self.outcome = Some(self.compute()?);
        }
        self.position += 1;

        debug!(flow = self.flow.as_str(), step = target.as_str(), "wizard advanced");
        Ok(target)
    }

    /// Go back one step, keeping answers. At the landing step this is a no-op.
    pub fn back(&mut self) -> WizardStep {
        if self.position > 0 {
            if self.is_complete() {
                self.outcome = None;
            }
            self.position -= 1;
        }
        self.step()
    }

    /// Return to the landing step and clear all answers
    pub fn restart(&mut self) {
        self.position = 0;
        self.answers = WizardAnswers::default();
        self.outcome = None;
    }

    /// Validate the answers a step asks for
    pub fn check_step(&self, step: WizardStep) -> Result<(), ValidationError> {
        let a = &self.answers;
        match step {
            WizardStep::Landing | WizardStep::Report => {}
            WizardStep::Sleep => {
                let hours = require(a.previous_sleep_hours, "previous_sleep_hours")?;
                check_range("previous_sleep_hours", hours, 0.0, MAX_PREVIOUS_SLEEP_HOURS)?;
            }
            WizardStep::Habits => {
                if self.flow == WizardFlow::SleepQuality {
                    let usage = require(a.usage_hours, "usage_hours")?;
                    check_range("usage_hours", usage, 0.0, 24.0)?;
                }
                require(a.stop_time, "stop_time")?;
                require(a.bed_time, "bed_time")?;
                if self.flow != WizardFlow::Productivity {
                    require(a.wake_time, "wake_time")?;
                }
            }
            WizardStep::Caffeine => {
                let cups = require(a.cup_count, "cup_count")?;
                check_range("cup_count", cups as f64, 0.0, MAX_CUPS as f64)?;
                require(a.last_caffeine, "last_caffeine")?;
            }
            WizardStep::Nutrition => {
                if self.flow == WizardFlow::SleepQuality {
                    require(a.meal_time, "meal_time")?;
                }
                let nutrients = require(a.nutrients, "nutrients")?;
                self.policy.nutrition.penalty(&nutrients)?;
            }
        }
        Ok(())
    }

    fn compute(&self) -> Result<WizardOutcome, ComputeError> {
        let a = &self.answers;
        let bed_time = require(a.bed_time, "bed_time")?;

        let outcome = match self.flow {
            WizardFlow::SleepQuality | WizardFlow::BioSync => {
                let caffeine = match (a.cup_count, a.last_caffeine) {
                    (Some(cups), Some(last)) => Some((cups, last)),
                    _ => None,
                };
                let input = QuickInput {
                    stop_time: require(a.stop_time, "stop_time")?,
                    bed_time,
                    caffeine,
                    nutrients: require(a.nutrients, "nutrients")?,
                };
                WizardOutcome::Quick(quick_score(&input, &self.policy)?)
            }
            WizardFlow::Productivity => WizardOutcome::Productivity(ProductivityModel.evaluate(
                require(a.previous_sleep_hours, "previous_sleep_hours")?,
                bed_time,
                require(a.last_caffeine, "last_caffeine")?,
                require(a.cup_count, "cup_count")?,
            )?),
        };
        Ok(outcome)
    }
}

fn require<T: Copy>(value: Option<T>, field: &str) -> Result<T, ValidationError> {
    value.ok_or_else(|| ValidationError::MissingAnswer {
        field: field.to_string(),
    })
}

//! SleepSync - Sleep-hygiene scoring from self-reported evening habits
//!
//! SleepSync turns a handful of answers (phone stop time, caffeine intake,
//! last meal, previous night's sleep) into heuristic sleep quality and
//! next-day productivity percentages using fixed arithmetic formulas.
//!
//! ## Modules
//!
//! - **Component models**: caffeine decay, screen-time gap, meal timing and composition
//! - **Composite**: mean of the three component scores over a daily log
//! - **Wizards**: policy-driven quick scores and step-by-step wizard sessions
//! - **Productivity**: next-day prediction from sleep debt and caffeine timing

pub mod caffeine;
pub mod composite;
pub mod encoder;
pub mod error;
pub mod nutrition;
pub mod pipeline;
pub mod policy;
pub mod productivity;
pub mod quick;
pub mod screen;
pub mod types;
pub mod wizard;

pub use caffeine::CaffeineModel;
pub use composite::CompositeAggregator;
pub use encoder::ReportEncoder;
pub use error::{ComputeError, ValidationError};
pub use nutrition::NutritionModel;
pub use pipeline::{daily_log_to_report, evaluate_daily_log, SleepSyncProcessor};
pub use policy::{PolicyPreset, ScoringPolicy};
pub use productivity::ProductivityModel;
pub use quick::quick_score;
pub use screen::ScreenTimeModel;
pub use types::{Level, Nutrients, TimeOfDay};

// Wizard exports
pub use wizard::{WizardFlow, WizardOutcome, WizardSession, WizardStep};

/// SleepSync version embedded in all report payloads
pub const SLEEPSYNC_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for report payloads
pub const PRODUCER_NAME: &str = "sleepsync";

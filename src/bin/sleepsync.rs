//! SleepSync CLI - Command-line interface for the SleepSync evaluators
//!
//! Commands:
//! - caffeine, screen, nutrition: score a single component
//! - report: composite sleep quality over a full evening
//! - productivity: predict tomorrow's productivity
//! - quick: single wizard score under a scoring policy
//! - wizard: interactive step-by-step flow
//! - policy: print scoring policy presets
//!
//! Inputs missing from the command line are read from stdin, one per line.

use clap::{Args, Parser, Subcommand};
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

use sleepsync::encoder::ReportEncoder;
use sleepsync::policy::{PolicyPreset, ScoringPolicy};
use sleepsync::types::{
    CaffeineInput, CaffeineResult, DailyLog, Level, Nutrient, NutritionInput, NutritionResult, Nutrients,
    ProductivityInput, ProductivityResult, QuickInput, QuickScore, ReportKind, ScreenInput,
    ScreenResult, SleepReport, TimeOfDay,
};
use sleepsync::wizard::{WizardFlow, WizardOutcome, WizardSession, WizardStep};
use sleepsync::{ComputeError, SleepSyncProcessor, ValidationError, SLEEPSYNC_VERSION};

/// SleepSync - Sleep-hygiene scoring from evening habits
#[derive(Parser)]
#[command(name = "sleepsync")]
#[command(version = SLEEPSYNC_VERSION)]
#[command(about = "Score caffeine, screen and meal habits against tonight's sleep", long_about = None)]
struct Cli {
    /// Enable debug logging (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print the encoded JSON report instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Scoring policy preset (basic, caffeine-extended, checkbox-nutrition)
    #[arg(long, global = true)]
    policy: Option<String>,

    /// Load the scoring policy from a JSON file
    #[arg(long, global = true, conflicts_with = "policy")]
    policy_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Residual caffeine at bedtime
    Caffeine {
        #[command(flatten)]
        caffeine: CaffeineArgs,

        /// Planned bedtime (HH:MM)
        #[arg(long)]
        bed_time: Option<String>,
    },

    /// Screen-free gap and sleep duration
    Screen {
        #[command(flatten)]
        screen: ScreenArgs,

        /// Planned bedtime (HH:MM)
        #[arg(long)]
        bed_time: Option<String>,
    },

    /// Meal timing and composition
    Nutrition {
        /// Last meal or snack (HH:MM)
        #[arg(long)]
        meal_time: Option<String>,

        /// Planned bedtime (HH:MM)
        #[arg(long)]
        bed_time: Option<String>,

        #[command(flatten)]
        nutrients: NutrientArgs,
    },

    /// Composite sleep quality over caffeine, screen time and nutrition
    Report {
        /// Daily log JSON file (use - for stdin); other inputs are ignored
        #[arg(short, long)]
        input: Option<PathBuf>,

        #[command(flatten)]
        caffeine: CaffeineArgs,

        /// Planned bedtime (HH:MM)
        #[arg(long)]
        bed_time: Option<String>,

        #[command(flatten)]
        screen: ScreenArgs,

        /// Last meal or snack (HH:MM)
        #[arg(long)]
        meal_time: Option<String>,

        #[command(flatten)]
        nutrients: NutrientArgs,
    },

    /// Predict tomorrow's productivity
    Productivity {
        /// Hours slept last night (0-12)
        #[arg(long)]
        previous_sleep: Option<String>,

        /// Planned bedtime today (HH:MM)
        #[arg(long)]
        bed_time: Option<String>,

        #[command(flatten)]
        caffeine: CaffeineArgs,
    },

    /// Single sleep quality score under the selected policy
    Quick {
        /// Phone stop time (HH:MM)
        #[arg(long)]
        stop_time: Option<String>,

        /// Planned bedtime (HH:MM)
        #[arg(long)]
        bed_time: Option<String>,

        #[command(flatten)]
        caffeine: CaffeineArgs,

        #[command(flatten)]
        nutrients: NutrientArgs,
    },

    /// Run a wizard interactively
    Wizard {
        /// Flow to run (sleep-quality, bio-sync, productivity)
        #[arg(default_value = "sleep-quality")]
        flow: String,
    },

    /// Print scoring policy presets as JSON
    Policy {
        /// Preset to print (defaults to the active policy)
        name: Option<String>,

        /// List preset names
        #[arg(long)]
        list: bool,
    },
}

#[derive(Args, Default)]
struct CaffeineArgs {
    /// Cups of coffee today
    #[arg(long)]
    cups: Option<String>,

    /// Time of the last cup (HH:MM)
    #[arg(long)]
    last_caffeine: Option<String>,
}

#[derive(Args, Default)]
struct ScreenArgs {
    /// Phone usage today (hours)
    #[arg(long)]
    usage_hours: Option<String>,

    /// Phone stop time (HH:MM)
    #[arg(long)]
    stop_time: Option<String>,

    /// Wake-up time (HH:MM)
    #[arg(long)]
    wake_time: Option<String>,
}

/// Levels (low/med/high), or yes/no under the checkbox policy
#[derive(Args, Default)]
struct NutrientArgs {
    #[arg(long)]
    sugar: Option<String>,

    #[arg(long)]
    salt: Option<String>,

    #[arg(long)]
    fat: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), SleepSyncCliError> {
    let policy = resolve_policy(cli.policy.as_deref(), cli.policy_file.as_deref())?;
    let json = cli.json;
    let mut prompter = Prompter::stdin();

    match cli.command {
        Commands::Caffeine { caffeine, bed_time } => {
            let processor = SleepSyncProcessor::with_policy(policy.unwrap_or_default());
            let input = CaffeineInput {
                cup_count: prompter.number(caffeine.cups, "cup_count", "Cups of coffee today", "2")?,
                last_intake: prompter.time(
                    caffeine.last_caffeine,
                    "last_caffeine",
                    "Time of last cup (HH:MM)",
                    "16:15",
                )?,
                bed_time: prompter.time(bed_time, "bed_time", "Planned bedtime (HH:MM)", "23:15")?,
            };
            let result = processor.caffeine(&input)?;
            emit(&processor, json, ReportKind::Caffeine, &result, print_caffeine)
        }
        Commands::Screen { screen, bed_time } => {
            let processor = SleepSyncProcessor::with_policy(policy.unwrap_or_default());
            let input = prompter.screen_input(screen, Bedtime::Ask(bed_time))?;
            let result = processor.screen(&input)?;
            emit(&processor, json, ReportKind::Screen, &result, print_screen)
        }
        Commands::Nutrition {
            meal_time,
            bed_time,
            nutrients,
        } => {
            let processor = SleepSyncProcessor::with_policy(policy.unwrap_or_default());
            let input = NutritionInput {
                meal_time: prompter.time(meal_time, "meal_time", "Last meal or snack (HH:MM)", "20:00")?,
                bed_time: prompter.time(bed_time, "bed_time", "Planned bedtime (HH:MM)", "23:00")?,
                nutrients: prompter.nutrients(
                    nutrients,
                    processor.policy().nutrition.uses_flags(),
                    &CONSOLE_POLL,
                )?,
            };
            let result = processor.nutrition(&input)?;
            emit(&processor, json, ReportKind::Nutrition, &result, print_nutrition)
        }
        Commands::Report {
            input,
            caffeine,
            bed_time,
            screen,
            meal_time,
            nutrients,
        } => {
            let processor = SleepSyncProcessor::with_policy(policy.unwrap_or_default());
            let log = match input {
                Some(path) => read_daily_log(&path, &mut prompter)?,
                None => prompter.daily_log(
                    caffeine,
                    bed_time,
                    screen,
                    meal_time,
                    nutrients,
                    processor.policy().nutrition.uses_flags(),
                )?,
            };
            let report = processor.daily_report(&log)?;
            emit(&processor, json, ReportKind::Composite, &report, print_report)
        }
        Commands::Productivity {
            previous_sleep,
            bed_time,
            caffeine,
        } => {
            let processor = SleepSyncProcessor::with_policy(policy.unwrap_or_default());
            let input = ProductivityInput {
                previous_sleep_hours: prompter.number(
                    previous_sleep,
                    "previous_sleep_hours",
                    "Hours slept last night",
                    "7",
                )?,
                bed_time: prompter.time(bed_time, "bed_time", "Planned bedtime today (HH:MM)", "23:00")?,
                cup_count: prompter.number(caffeine.cups, "cup_count", "Coffee/tea cups", "2")?,
                last_caffeine: prompter.time(
                    caffeine.last_caffeine,
                    "last_caffeine",
                    "Last cup time (HH:MM)",
                    "15:00",
                )?,
            };
            let result = processor.productivity(&input)?;
            emit(&processor, json, ReportKind::Productivity, &result, print_productivity)
        }
        Commands::Quick {
            stop_time,
            bed_time,
            caffeine,
            nutrients,
        } => {
            let processor = SleepSyncProcessor::with_policy(policy.unwrap_or_default());
            let uses_caffeine = processor.policy().uses_caffeine();
            let uses_flags = processor.policy().nutrition.uses_flags();

            let stop_time = prompter.time(stop_time, "stop_time", "Phone stop time (HH:MM)", "21:30")?;
            let bed_time = prompter.time(bed_time, "bed_time", "Planned bedtime (HH:MM)", "23:00")?;
            let caffeine = if uses_caffeine {
                Some((
                    prompter.number(caffeine.cups, "cup_count", "Cups of coffee today", "1")?,
                    prompter.time(
                        caffeine.last_caffeine,
                        "last_caffeine",
                        "Time of last caffeine intake (HH:MM)",
                        "15:00",
                    )?,
                ))
            } else {
                None
            };
            let input = QuickInput {
                stop_time,
                bed_time,
                caffeine,
                nutrients: prompter.nutrients(nutrients, uses_flags, &WIZARD_POLL)?,
            };
            let result = processor.quick(&input)?;
            emit(&processor, json, ReportKind::Quick, &result, print_quick)
        }
        Commands::Wizard { flow } => {
            let flow: WizardFlow = flow.parse()?;
            let session = match policy {
                Some(policy) => WizardSession::with_policy(flow, policy)?,
                None => WizardSession::new(flow),
            };
            cmd_wizard(session, json, &mut prompter)
        }
        Commands::Policy { name, list } => cmd_policy(name.as_deref(), list, policy),
    }
}

fn resolve_policy(
    name: Option<&str>,
    file: Option<&Path>,
) -> Result<Option<ScoringPolicy>, SleepSyncCliError> {
    if let Some(path) = file {
        let json = fs::read_to_string(path)?;
        return Ok(Some(ScoringPolicy::from_json(&json)?));
    }
    match name {
        Some(name) => Ok(Some(ScoringPolicy::by_name(name)?)),
        None => Ok(None),
    }
}

fn read_daily_log<R: BufRead>(
    path: &Path,
    prompter: &mut Prompter<R>,
) -> Result<DailyLog, SleepSyncCliError> {
    let data = if path.to_string_lossy() == "-" {
        let mut buffer = String::new();
        prompter.input.read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(path)?
    };
    Ok(serde_json::from_str(&data)?)
}

/// Print a result as text, or as an encoded report with `--json`
fn emit<T: serde::Serialize>(
    processor: &SleepSyncProcessor,
    json: bool,
    kind: ReportKind,
    result: &T,
    print_text: fn(&T),
) -> Result<(), SleepSyncCliError> {
    if json {
        println!("{}", processor.encode(kind, result)?);
    } else {
        print_text(result);
    }
    Ok(())
}

fn cmd_wizard<R: BufRead>(
    mut session: WizardSession,
    json: bool,
    prompter: &mut Prompter<R>,
) -> Result<(), SleepSyncCliError> {
    loop {
        match session.step() {
            WizardStep::Landing => {
                if prompter.interactive {
                    eprintln!("🌙 SleepSync ({}, policy {})", session.flow(), session.policy().name());
                }
            }
            WizardStep::Report => {
                if let Some(outcome) = session.outcome() {
                    print_outcome(outcome, session.policy(), json)?;
                }
                if !prompter.interactive {
                    return Ok(());
                }
                let choice = prompter.ask("navigation", "[r]estart, [b]ack or [q]uit", "q")?;
                match choice.to_ascii_lowercase().as_str() {
                    "r" | "restart" => session.restart(),
                    "b" | "back" => {
                        session.back();
                    }
                    _ => return Ok(()),
                }
                continue;
            }
            step => prompter.wizard_step(&mut session, step)?,
        }

        if let Err(e) = session.next() {
            // Interactive users get the step again; scripted input fails fast
            if prompter.interactive {
                eprintln!("{e}");
                continue;
            }
            return Err(e.into());
        }
    }
}

fn print_outcome(
    outcome: &WizardOutcome,
    policy: &ScoringPolicy,
    json: bool,
) -> Result<(), SleepSyncCliError> {
    let encoder = ReportEncoder::new();
    match outcome {
        WizardOutcome::Quick(result) if json => {
            println!("{}", encoder.encode_to_json(ReportKind::Quick, policy.name(), result)?)
        }
        WizardOutcome::Productivity(result) if json => println!(
            "{}",
            encoder.encode_to_json(ReportKind::Productivity, policy.name(), result)?
        ),
        WizardOutcome::Quick(result) => print_quick(result),
        WizardOutcome::Productivity(result) => print_productivity(result),
    }
    Ok(())
}

fn cmd_policy(
    name: Option<&str>,
    list: bool,
    active: Option<ScoringPolicy>,
) -> Result<(), SleepSyncCliError> {
    if list {
        for preset in PolicyPreset::ALL {
            println!("{preset}");
        }
        return Ok(());
    }

    let policy = match name {
        Some(name) => ScoringPolicy::by_name(name)?,
        None => active.unwrap_or_default(),
    };
    println!("{}", policy.to_json()?);
    Ok(())
}

// Text output

fn print_caffeine(result: &CaffeineResult) {
    println!("☕ CAFFEINE SCORE: {:.1}%", result.score);
    println!(
        "Residual caffeine at bedtime: {:.2} mg ({:.1}h after the last cup)",
        result.residual_mg, result.hours_since_intake
    );
    println!("{}", result.feedback);
}

fn print_screen(result: &ScreenResult) {
    println!("📱 SCREEN SCORE: {}/100", result.score);
    println!("Sleep duration: {}", result.sufficiency);
    for insight in &result.insights {
        println!("{insight}");
    }
    println!("Forecast: {}", result.forecast);
}

fn print_nutrition(result: &NutritionResult) {
    println!("🥗 DIETARY SLEEP SCORE: {}/100", result.score);
    println!("Digest gap: {:.1}h", result.digest_gap_hours);
    for effect in &result.effects {
        println!("{effect}");
    }
}

fn print_report(report: &SleepReport) {
    println!(
        "☕ Caffeine {}% ({} mg at bedtime)",
        report.caffeine.score, report.caffeine.residual_mg
    );
    println!("📱 Screen {}% ({})", report.screen.score, report.screen.sufficiency);
    println!(
        "🥗 Nutrition {}% ({} impacts noted)",
        report.nutrition.score,
        report.nutrition.effects.len()
    );
    println!();
    println!("PROJECTED SLEEP QUALITY: {}%", report.composite.display_percent());
    for note in report.screen.insights.iter().chain(&report.nutrition.effects) {
        println!("- {note}");
    }
}

fn print_quick(result: &QuickScore) {
    println!("SLEEP QUALITY SCORE: {}%", result.score);
    println!("{}", result.remark);
    println!(
        "- Your screen-free gap is {:.1} hours. Humans need ~2 hours to peak melatonin production.",
        result.screen_gap_hours
    );
    if let (Some(residual), Some(insight)) = (result.residual_mg, &result.caffeine_insight) {
        println!("- Residual caffeine at bedtime: {residual:.1} mg. {insight}");
    }
}

fn print_productivity(result: &ProductivityResult) {
    println!("PREDICTED TOMORROW'S PRODUCTIVITY: {}%", result.score);
    println!("🧠 Cognitive state: {}", result.cognitive_state);
    println!("🔋 Sleep debt: {:.1} hrs", result.sleep_debt_hours);
    println!("🔋 System load: {}", result.system_load.as_str());
}

// Input

/// Poll order of the console scripts and the dashboard
const CONSOLE_POLL: [Nutrient; 3] = [Nutrient::Salt, Nutrient::Sugar, Nutrient::Fat];

/// Poll order of the wizards
const WIZARD_POLL: [Nutrient; 3] = [Nutrient::Sugar, Nutrient::Salt, Nutrient::Fat];

/// Bedtime for the screen questions, when another command already asked for it
enum Bedtime {
    Known(TimeOfDay),
    Ask(Option<String>),
}

/// Line-oriented answers from stdin; prompts go to stderr when attached to a terminal
struct Prompter<R> {
    input: R,
    interactive: bool,
}

impl Prompter<io::StdinLock<'static>> {
    fn stdin() -> Self {
        Self {
            input: io::stdin().lock(),
            interactive: atty::is(atty::Stream::Stdin),
        }
    }
}

impl<R: BufRead> Prompter<R> {
    /// Read one answer; an empty line takes `default`
    fn ask(&mut self, field: &str, label: &str, default: &str) -> Result<String, SleepSyncCliError> {
        if self.interactive {
            eprint!("{label} [{default}]: ");
            io::stderr().flush()?;
        }

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ValidationError::MissingAnswer {
                field: field.to_string(),
            }
            .into());
        }

        let answer = line.trim();
        Ok(if answer.is_empty() {
            default.to_string()
        } else {
            answer.to_string()
        })
    }

    fn resolve(
        &mut self,
        given: Option<String>,
        field: &str,
        label: &str,
        default: &str,
    ) -> Result<String, SleepSyncCliError> {
        match given {
            Some(value) => Ok(value),
            None => self.ask(field, label, default),
        }
    }

    fn time(
        &mut self,
        given: Option<String>,
        field: &str,
        label: &str,
        default: &str,
    ) -> Result<TimeOfDay, SleepSyncCliError> {
        let text = self.resolve(given, field, label, default)?;
        Ok(TimeOfDay::parse(field, &text)?)
    }

    fn number<T: FromStr>(
        &mut self,
        given: Option<String>,
        field: &str,
        label: &str,
        default: &str,
    ) -> Result<T, SleepSyncCliError> {
        let text = self.resolve(given, field, label, default)?;
        parse_number(field, &text)
    }

    /// Meal poll, asking in `order`
    fn nutrients(
        &mut self,
        mut given: NutrientArgs,
        flags: bool,
        order: &[Nutrient; 3],
    ) -> Result<Nutrients, SleepSyncCliError> {
        // Indexed salt, sugar, fat
        let mut levels = [Level::Low; 3];
        let mut ticked = [false; 3];

        for &nutrient in order {
            let (slot, answer, name) = match nutrient {
                Nutrient::Salt => (0, given.salt.take(), "Salt"),
                Nutrient::Sugar => (1, given.sugar.take(), "Sugar"),
                Nutrient::Fat => (2, given.fat.take(), "Fat"),
            };
            let field = nutrient.as_str();
            if flags {
                ticked[slot] = self.yes_no(answer, field, &format!("High {field}? (y/n)"))?;
            } else {
                levels[slot] = self.level(answer, field, &format!("{name} level (high/med/low)"))?;
            }
        }

        Ok(if flags {
            Nutrients::flags(ticked[0], ticked[1], ticked[2])
        } else {
            Nutrients::levels(levels[0], levels[1], levels[2])
        })
    }

    fn level(
        &mut self,
        given: Option<String>,
        field: &str,
        label: &str,
    ) -> Result<Level, SleepSyncCliError> {
        let text = self.resolve(given, field, label, "low")?;
        Ok(Level::parse(field, &text)?)
    }

    fn yes_no(
        &mut self,
        given: Option<String>,
        field: &str,
        label: &str,
    ) -> Result<bool, SleepSyncCliError> {
        let text = self.resolve(given, field, label, "n")?;
        parse_yes_no(field, &text)
    }

    /// Screen answers in order: usage, stop, bed, wake
    fn screen_input(
        &mut self,
        screen: ScreenArgs,
        bed_time: Bedtime,
    ) -> Result<ScreenInput, SleepSyncCliError> {
        let usage_hours =
            self.number(screen.usage_hours, "usage_hours", "Phone usage today (hours)", "4")?;
        let stop_time = self.time(screen.stop_time, "stop_time", "Phone stop time (HH:MM)", "21:30")?;
        let bed_time = match bed_time {
            Bedtime::Known(time) => time,
            Bedtime::Ask(given) => {
                self.time(given, "bed_time", "Time you went to sleep (HH:MM)", "23:00")?
            }
        };
        let wake_time = self.time(screen.wake_time, "wake_time", "Wake-up time (HH:MM)", "07:00")?;

        Ok(ScreenInput {
            usage_hours,
            stop_time,
            bed_time,
            wake_time,
        })
    }

    fn daily_log(
        &mut self,
        caffeine: CaffeineArgs,
        bed_time: Option<String>,
        screen: ScreenArgs,
        meal_time: Option<String>,
        nutrients: NutrientArgs,
        flags: bool,
    ) -> Result<DailyLog, SleepSyncCliError> {
        let cup_count = self.number(caffeine.cups, "cup_count", "Cups of coffee today", "2")?;
        let last_caffeine = self.time(
            caffeine.last_caffeine,
            "last_caffeine",
            "Time of last cup (HH:MM)",
            "16:15",
        )?;
        let bed_time = self.time(bed_time, "bed_time", "Planned bedtime (HH:MM)", "23:15")?;
        let screen = self.screen_input(screen, Bedtime::Known(bed_time))?;
        let meal_time = self.time(meal_time, "meal_time", "Last meal time (HH:MM)", "20:45")?;
        let nutrients = self.nutrients(nutrients, flags, &CONSOLE_POLL)?;

        Ok(DailyLog {
            cup_count,
            last_caffeine,
            bed_time,
            usage_hours: screen.usage_hours,
            stop_time: screen.stop_time,
            wake_time: screen.wake_time,
            meal_time,
            nutrients,
        })
    }

    /// Fill in the answers one wizard step asks for, offering earlier answers as defaults
    fn wizard_step(
        &mut self,
        session: &mut WizardSession,
        step: WizardStep,
    ) -> Result<(), SleepSyncCliError> {
        let flow = session.flow();
        let flags = session.policy().nutrition.uses_flags();
        let previous = session.answers().clone();
        let mut answers = previous.clone();

        match step {
            WizardStep::Landing | WizardStep::Report => {}
            WizardStep::Sleep => {
                answers.previous_sleep_hours = Some(self.number(
                    None,
                    "previous_sleep_hours",
                    "How many hours did you sleep last night?",
                    &shown(previous.previous_sleep_hours, "7.0"),
                )?);
            }
            WizardStep::Habits => {
                if flow == WizardFlow::SleepQuality {
                    answers.usage_hours = Some(self.number(
                        None,
                        "usage_hours",
                        "Total phone hours today",
                        &shown(previous.usage_hours, "4"),
                    )?);
                }
                answers.stop_time = Some(self.time(
                    None,
                    "stop_time",
                    "Phone stop time (HH:MM)",
                    &shown(previous.stop_time, "21:30"),
                )?);
                answers.bed_time = Some(self.time(
                    None,
                    "bed_time",
                    "Planned bedtime (HH:MM)",
                    &shown(previous.bed_time, "23:00"),
                )?);
                if flow != WizardFlow::Productivity {
                    answers.wake_time = Some(self.time(
                        None,
                        "wake_time",
                        "Wake-up time (HH:MM)",
                        &shown(previous.wake_time, "07:00"),
                    )?);
                }
            }
            WizardStep::Caffeine => {
                let default_cups = if flow == WizardFlow::Productivity { "2" } else { "1" };
                answers.cup_count = Some(self.number(
                    None,
                    "cup_count",
                    "Cups of coffee or energy drinks today",
                    &shown(previous.cup_count, default_cups),
                )?);
                answers.last_caffeine = Some(self.time(
                    None,
                    "last_caffeine",
                    "Time of your last caffeine intake (HH:MM)",
                    &shown(previous.last_caffeine, "15:00"),
                )?);
            }
            WizardStep::Nutrition => {
                if flow == WizardFlow::SleepQuality {
                    answers.meal_time = Some(self.time(
                        None,
                        "meal_time",
                        "Last meal time (HH:MM)",
                        &shown(previous.meal_time, "20:00"),
                    )?);
                }
                answers.nutrients =
                    Some(self.nutrients(NutrientArgs::default(), flags, &WIZARD_POLL)?);
            }
        }

        *session.answers_mut() = answers;
        Ok(())
    }
}

fn shown<T: ToString>(previous: Option<T>, default: &str) -> String {
    previous.map(|value| value.to_string()).unwrap_or_else(|| default.to_string())
}

fn parse_number<T: FromStr>(field: &str, text: &str) -> Result<T, SleepSyncCliError> {
    text.trim().parse().map_err(|_| {
        ValidationError::InvalidNumber {
            field: field.to_string(),
            value: text.trim().to_string(),
        }
        .into()
    })
}

fn parse_yes_no(field: &str, text: &str) -> Result<bool, SleepSyncCliError> {
    match text.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "1" => Ok(true),
        "n" | "no" | "false" | "0" => Ok(false),
        other => Err(SleepSyncCliError::Input(format!(
            "{field}: expected yes or no, got '{other}'"
        ))),
    }
}

// Error types

#[derive(Debug)]
enum SleepSyncCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    Validation(ValidationError),
    Input(String),
}

impl From<io::Error> for SleepSyncCliError {
    fn from(e: io::Error) -> Self {
        SleepSyncCliError::Io(e)
    }
}

impl From<ComputeError> for SleepSyncCliError {
    fn from(e: ComputeError) -> Self {
        match e {
            ComputeError::Validation(e) => SleepSyncCliError::Validation(e),
            other => SleepSyncCliError::Compute(other),
        }
    }
}

impl From<serde_json::Error> for SleepSyncCliError {
    fn from(e: serde_json::Error) -> Self {
        SleepSyncCliError::Json(e)
    }
}

impl From<ValidationError> for SleepSyncCliError {
    fn from(e: ValidationError) -> Self {
        SleepSyncCliError::Validation(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<SleepSyncCliError> for CliError {
    fn from(e: SleepSyncCliError) -> Self {
        match e {
            SleepSyncCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            SleepSyncCliError::Compute(e) => CliError {
                code: "COMPUTE_ERROR".to_string(),
                message: e.to_string(),
                hint: None,
            },
            SleepSyncCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            SleepSyncCliError::Validation(ValidationError::UnknownPolicy(name)) => CliError {
                code: "UNKNOWN_POLICY".to_string(),
                message: format!("Unknown scoring policy: {name}"),
                hint: Some("Run 'sleepsync policy --list' for available presets".to_string()),
            },
            SleepSyncCliError::Validation(e) => CliError {
                code: "VALIDATION_ERROR".to_string(),
                hint: e.field().map(|field| format!("Check the value given for {field}")),
                message: e.to_string(),
            },
            SleepSyncCliError::Input(msg) => CliError {
                code: "INPUT_ERROR".to_string(),
                message: msg,
                hint: Some("Answer with yes or no".to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use pretty_assertions::assert_eq;

    fn scripted(lines: &str) -> Prompter<Cursor<Vec<u8>>> {
        Prompter {
            input: Cursor::new(lines.as_bytes().to_vec()),
            interactive: false,
        }
    }

    #[test]
    fn test_prompt_defaults_and_eof() {
        let mut prompter = scripted("\n22:15\n");
        let first = prompter.time(None, "stop_time", "Stop", "21:30").unwrap();
        let second = prompter.time(None, "bed_time", "Bed", "23:00").unwrap();
        assert_eq!(first.to_string(), "21:30");
        assert_eq!(second.to_string(), "22:15");

        let err = prompter.time(None, "wake_time", "Wake", "07:00").unwrap_err();
        assert!(matches!(
            err,
            SleepSyncCliError::Validation(ValidationError::MissingAnswer { .. })
        ));
    }

    #[test]
    fn test_flags_skip_prompts() {
        let mut prompter = scripted("");
        let cups: u32 = prompter
            .number(Some("3".to_string()), "cup_count", "Cups", "2")
            .unwrap();
        assert_eq!(cups, 3);
    }

    #[test]
    fn test_invalid_number_names_field() {
        let err = parse_number::<u32>("cup_count", "many").unwrap_err();
        let cli = CliError::from(err);
        assert_eq!(cli.code, "VALIDATION_ERROR");
        assert_eq!(cli.hint.as_deref(), Some("Check the value given for cup_count"));
    }

    #[test]
    fn test_console_poll_asks_salt_first() {
        let mut prompter = scripted("high\nlow\nmed\n");
        let nutrients = prompter
            .nutrients(NutrientArgs::default(), false, &CONSOLE_POLL)
            .unwrap();
        assert_eq!(
            nutrients,
            Nutrients::levels(Level::High, Level::Low, Level::Med)
        );
    }

    #[test]
    fn test_wizard_poll_asks_sugar_first() {
        let mut prompter = scripted("high\nlow\nmed\n");
        let nutrients = prompter
            .nutrients(NutrientArgs::default(), false, &WIZARD_POLL)
            .unwrap();
        assert_eq!(
            nutrients,
            Nutrients::levels(Level::Low, Level::High, Level::Med)
        );

        let mut prompter = scripted("y\nno\n\n");
        let nutrients = prompter
            .nutrients(NutrientArgs::default(), true, &WIZARD_POLL)
            .unwrap();
        assert_eq!(nutrients, Nutrients::flags(false, true, false));
    }

    #[test]
    fn test_flagged_nutrients_skip_prompts() {
        let given = NutrientArgs {
            sugar: Some("high".to_string()),
            ..Default::default()
        };
        let mut prompter = scripted("med\n\n");
        let nutrients = prompter.nutrients(given, false, &CONSOLE_POLL).unwrap();
        assert_eq!(
            nutrients,
            Nutrients::levels(Level::Med, Level::High, Level::Low)
        );
    }

    #[test]
    fn test_screen_prompts_bedtime_after_stop_time() {
        let mut prompter = scripted("5\n21:00\n23:30\n07:30\n");
        let input = prompter
            .screen_input(ScreenArgs::default(), Bedtime::Ask(None))
            .unwrap();
        assert_eq!(input.usage_hours, 5.0);
        assert_eq!(input.stop_time.to_string(), "21:00");
        assert_eq!(input.bed_time.to_string(), "23:30");
        assert_eq!(input.wake_time.to_string(), "07:30");
    }

    #[test]
    fn test_daily_log_prompt_order() {
        // cups, last cup, bed, usage, stop, wake, meal, salt, sugar, fat
        let mut prompter = scripted("2\n16:15\n23:15\n4\n21:30\n07:00\n20:45\nhigh\nlow\nlow\n");
        let log = prompter
            .daily_log(
                CaffeineArgs::default(),
                None,
                ScreenArgs::default(),
                None,
                NutrientArgs::default(),
                false,
            )
            .unwrap();
        assert_eq!(log.bed_time.to_string(), "23:15");
        assert_eq!(log.stop_time.to_string(), "21:30");
        assert_eq!(log.meal_time.to_string(), "20:45");
        assert_eq!(
            log.nutrients,
            Nutrients::levels(Level::High, Level::Low, Level::Low)
        );
    }

    #[test]
    fn test_scripted_wizard_reaches_report() {
        let mut prompter = scripted("6\n21:00\n23:00\n4\n20:30\n");
        let mut session = WizardSession::new(WizardFlow::Productivity);

        cmd_wizard(session.clone(), false, &mut prompter).unwrap();

        // Same answers applied step by step
        let mut prompter = scripted("6\n21:00\n23:00\n4\n20:30\n");
        while !session.is_complete() {
            let step = session.step();
            prompter.wizard_step(&mut session, step).unwrap();
            session.next().unwrap();
        }
        // 100 - 20 (debt) - 15 (late cup), four cups
        assert_eq!(session.outcome().map(|o| o.score()), Some(65.0));
    }

    #[test]
    fn test_unknown_policy_error() {
        let err = resolve_policy(Some("siesta"), None).unwrap_err();
        let cli = CliError::from(err);
        assert_eq!(cli.code, "UNKNOWN_POLICY");
    }
}

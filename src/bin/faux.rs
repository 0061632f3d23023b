//! faux CLI - drive fake update sessions from the command line
//!
//! Commands:
//! - replay: Run a recorded input stream through a session
//! - curve: Print the progress curve
//! - card: Build share card content from a recap
//! - doctor: Check the environment and a settings file

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use faux_update::progress::{compute_progress, ProgressState};
use faux_update::recap::{PrankRecap, ShareCard, ShareTemplate};
use faux_update::replay::{self, ReplayStep};
use faux_update::settings::PrankSettings;
use faux_update::types::{ExitMethod, InputEvent, SessionConfig, UpdateStyle};
use faux_update::{SessionError, FAUX_VERSION};

/// Longest session the CLI will simulate (one week)
const MAX_DURATION_MIN: u64 = 10_080;

/// faux - fake system update prank engine
#[derive(Parser)]
#[command(name = "faux")]
#[command(version = FAUX_VERSION)]
#[command(about = "Replay and inspect fake system update sessions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay recorded input events through a session
    Replay {
        /// Input file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Host clock value when the session started
        #[arg(long, default_value = "0")]
        start_ms: u64,

        /// Keep ticking after the last event until the update completes
        #[arg(long)]
        run_to_completion: bool,

        #[command(flatten)]
        session: SessionArgs,
    },

    /// Print the progress curve
    Curve {
        /// Number of evenly spaced samples between 0 and 1
        #[arg(long, default_value = "20", value_parser = clap::value_parser!(u32).range(1..=100_000))]
        steps: u32,

        /// Simulate a timed session of this many minutes instead of sampling fractions
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..=MAX_DURATION_MIN))]
        duration_min: Option<u64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Build share card content from recap JSON
    Card {
        /// Recap file path (use - for stdin)
        #[arg(short, long, default_value = "-")]
        input: PathBuf,

        /// Override the recap's template by pager position (0-8)
        #[arg(long)]
        template: Option<i64>,

        /// Pretty-print the card
        #[arg(long)]
        pretty: bool,
    },

    /// Check the environment and settings
    Doctor {
        /// Settings file to validate
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Session options; flags override the settings file
#[derive(Args)]
struct SessionArgs {
    /// Settings JSON providing defaults
    #[arg(long)]
    settings: Option<PathBuf>,

    /// triple_tap, long_press, volume_up or shake
    #[arg(long)]
    exit_method: Option<String>,

    /// Fake update length in minutes
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..=MAX_DURATION_MIN as i64))]
    duration_min: Option<i64>,

    /// samsung, pixel, xiaomi, oneplus, huawei or stock
    #[arg(long)]
    style: Option<String>,

    /// Disable the periodic haptic cue
    #[arg(long)]
    no_haptics: bool,
}

impl SessionArgs {
    fn to_config(&self) -> Result<SessionConfig, FauxCliError> {
        let mut settings = match &self.settings {
            Some(path) => PrankSettings::from_json(&fs::read_to_string(path)?)?,
            None => PrankSettings::default(),
        };
        if let Some(method) = &self.exit_method {
            settings.default_exit_method = ExitMethod::parse_or_default(method);
        }
        if let Some(minutes) = self.duration_min {
            settings.default_duration_min = minutes;
        }
        if let Some(style) = &self.style {
            settings.default_style = UpdateStyle::parse_or_default(style);
        }
        if self.no_haptics {
            settings.haptic_feedback = false;
        }
        if settings.default_duration_min > MAX_DURATION_MIN as i64 {
            return Err(FauxCliError::DurationTooLong(
                settings.default_duration_min as u64,
            ));
        }
        Ok(settings.session_config()?)
    }
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one event per line)
    Ndjson,
    /// JSON array of events
    Json,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), FauxCliError> {
    match cli.command {
        Commands::Replay {
            input,
            output,
            input_format,
            start_ms,
            run_to_completion,
            session,
        } => cmd_replay(
            &input,
            &output,
            input_format,
            start_ms,
            run_to_completion,
            &session,
        ),
        Commands::Curve {
            steps,
            duration_min,
            json,
        } => cmd_curve(steps, duration_min, json),
        Commands::Card {
            input,
            template,
            pretty,
        } => cmd_card(&input, template, pretty),
        Commands::Doctor { settings, json } => cmd_doctor(settings.as_deref(), json),
    }
}

fn read_input(input: &Path) -> Result<String, FauxCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn cmd_replay(
    input: &Path,
    output: &Path,
    input_format: InputFormat,
    start_ms: u64,
    run_to_completion: bool,
    session: &SessionArgs,
) -> Result<(), FauxCliError> {
    let config = session.to_config()?;
    let input_data = read_input(input)?;

    let events: Vec<InputEvent> = match input_format {
        InputFormat::Ndjson => replay::parse_ndjson(&input_data)?,
        InputFormat::Json => replay::parse_array(&input_data)?,
    };

    if events.is_empty() && !run_to_completion {
        return Err(FauxCliError::NoEvents);
    }

    log::info!(
        "replaying {} events ({} for {} ms)",
        events.len(),
        config.exit_method.as_str(),
        config.total_duration_ms
    );

    let steps = replay::replay_events(config, start_ms, events, run_to_completion)?;
    let output_data = format_steps(&steps)?;

    if output.to_string_lossy() == "-" {
        let mut stdout = io::stdout();
        write!(stdout, "{}", output_data)?;
        stdout.flush()?;
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn format_steps(steps: &[ReplayStep]) -> Result<String, FauxCliError> {
    let mut lines = Vec::with_capacity(steps.len());
    for step in steps {
        lines.push(serde_json::to_string(step)?);
    }
    let mut out = lines.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    Ok(out)
}

#[derive(serde::Serialize)]
struct CurvePoint {
    fraction: f64,
    percent: u8,
}

fn cmd_curve(steps: u32, duration_min: Option<u64>, json: bool) -> Result<(), FauxCliError> {
    let points: Vec<CurvePoint> = match duration_min {
        Some(minutes) => {
            let total_ms = minutes.saturating_mul(60_000);
            let mut progress = ProgressState::new(total_ms)?;
            let mut points = Vec::new();
            while !progress.is_complete() {
                let report = progress.tick();
                points.push(CurvePoint {
                    fraction: progress.fraction(),
                    percent: report.percent,
                });
            }
            points
        }
        None => {
            let steps = steps.max(1);
            (0..=steps)
                .map(|i| {
                    let fraction = i as f64 / steps as f64;
                    CurvePoint {
                        fraction,
                        percent: compute_progress(fraction),
                    }
                })
                .collect()
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&points)?);
    } else {
        for point in &points {
            println!("{:.4}\t{:>3}%", point.fraction, point.percent);
        }
    }
    Ok(())
}

fn cmd_card(input: &Path, template: Option<i64>, pretty: bool) -> Result<(), FauxCliError> {
    let mut recap = PrankRecap::from_json(&read_input(input)?)?;
    if let Some(index) = template {
        recap.template = ShareTemplate::from_index(index);
    }

    let card = ShareCard::build(&recap);
    if pretty {
        println!("{}", serde_json::to_string_pretty(&card)?);
    } else {
        println!("{}", serde_json::to_string(&card)?);
    }
    Ok(())
}

fn cmd_doctor(settings: Option<&Path>, json: bool) -> Result<(), FauxCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "faux_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("faux-update version {}", FAUX_VERSION),
    });

    checks.push(DoctorCheck {
        name: "progress_curve".to_string(),
        status: if compute_progress(1.0) == 99 && compute_progress(0.0) == 0 {
            CheckStatus::Ok
        } else {
            CheckStatus::Error
        },
        message: format!(
            "Curve endpoints {}% .. {}%",
            compute_progress(0.0),
            compute_progress(1.0)
        ),
    });

    if let Some(path) = settings {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match PrankSettings::from_json(&content)
                    .and_then(|s| s.session_config().map(|c| (s, c)))
                {
                    Ok((settings, config)) => checks.push(DoctorCheck {
                        name: "settings".to_string(),
                        status: CheckStatus::Ok,
                        message: format!(
                            "Settings valid ({} style, {} exit, {} min)",
                            config.style.as_str(),
                            config.exit_method.as_str(),
                            settings.default_duration_min
                        ),
                    }),
                    Err(e) => checks.push(DoctorCheck {
                        name: "settings".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Invalid settings: {}", e),
                    }),
                },
                Err(e) => checks.push(DoctorCheck {
                    name: "settings".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot read settings file: {}", e),
                }),
            }
        } else {
            checks.push(DoctorCheck {
                name: "settings".to_string(),
                status: CheckStatus::Warning,
                message: "Settings file does not exist".to_string(),
            });
        }
    }

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass a file with --input to replay)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (replay ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        version: FAUX_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("faux doctor report");
        println!("==================");
        println!("Version: {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(FauxCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Error types

#[derive(Debug)]
enum FauxCliError {
    Io(io::Error),
    Session(SessionError),
    Json(serde_json::Error),
    NoEvents,
    DurationTooLong(u64),
    DoctorFailed,
}

impl From<io::Error> for FauxCliError {
    fn from(e: io::Error) -> Self {
        FauxCliError::Io(e)
    }
}

impl From<SessionError> for FauxCliError {
    fn from(e: SessionError) -> Self {
        FauxCliError::Session(e)
    }
}

impl From<serde_json::Error> for FauxCliError {
    fn from(e: serde_json::Error) -> Self {
        FauxCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<FauxCliError> for CliError {
    fn from(e: FauxCliError) -> Self {
        match e {
            FauxCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            FauxCliError::Session(e) => {
                let (code, hint) = match &e {
                    SessionError::InvalidDuration(_) => {
                        ("INVALID_DURATION", "Use a duration of at least one minute")
                    }
                    SessionError::ParseError(_) => (
                        "PARSE_ERROR",
                        "Each line must be one input event object with a \"kind\" field",
                    ),
                    SessionError::InvalidRecap(_) => {
                        ("INVALID_RECAP", "Rating must be between 0 and 100")
                    }
                    SessionError::JsonError(_) => ("JSON_ERROR", "Check JSON syntax"),
                    SessionError::InvalidGeometry(_) | SessionError::InvalidInput(_) => {
                        ("INVALID_INPUT", "Check the session configuration")
                    }
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            FauxCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            FauxCliError::NoEvents => CliError {
                code: "NO_EVENTS".to_string(),
                message: "No events found in input".to_string(),
                hint: Some("Pass --run-to-completion to simulate an untouched session".to_string()),
            },
            FauxCliError::DurationTooLong(minutes) => CliError {
                code: "DURATION_TOO_LONG".to_string(),
                message: format!(
                    "Duration of {} min exceeds the {} min limit",
                    minutes, MAX_DURATION_MIN
                ),
                hint: Some("Use a shorter default_duration or --duration-min".to_string()),
            },
            FauxCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

//! Lumen CLI - Command-line interface for Synheart Lumen
//!
//! Commands:
//! - run: Poll a metrics snapshot file and drive an actuator (streaming mode)
//! - tick: Compute a single frame for one snapshot
//! - render: Encode an explicit color temperature and intensity
//! - validate: Validate a configuration file
//! - doctor: Diagnose configuration, snapshot and environment
//! - schema: Print input and output format information

use clap::{Parser, Subcommand, ValueEnum};
use std::fs::{self, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn, Level};

use synheart_lumen::config::{LightingConfig, EXAMPLE_CONFIG_YAML};
use synheart_lumen::encoder::{FrameEncoder, FRAME_SCHEMA_VERSION};
use synheart_lumen::{
    ActuatorKind, DeviceCommand, LightingEngine, LightingError, MetricsSnapshot, TimeOfDay,
    LUMEN_VERSION, PRODUCER_NAME,
};

/// Lumen - Adaptive lighting driven by wearable biometrics
#[derive(Parser)]
#[command(name = "lumen")]
#[command(author = "Synheart AI Inc")]
#[command(version = LUMEN_VERSION)]
#[command(about = "Turn biometric snapshots into circadian lighting targets", long_about = None)]
struct Cli {
    /// Log format for diagnostics on stderr
    #[arg(long, global = true, default_value = "text")]
    log_format: LogFormat,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll a snapshot file and emit device commands (streaming mode)
    Run {
        /// Engine configuration (YAML, or JSON with a .json extension)
        #[arg(short, long)]
        config: PathBuf,

        /// Metrics snapshot written by the collector
        #[arg(short, long, default_value = "data/metrics_latest.json")]
        snapshot: PathBuf,

        /// Actuator to encode for
        #[arg(short, long, default_value = "hue")]
        actuator: ActuatorArg,

        /// Seconds between ticks
        #[arg(long, default_value = "5")]
        interval: u64,

        /// Seconds to wait before re-checking a missing snapshot
        #[arg(long, default_value = "2")]
        retry_delay: u64,

        /// Write commands to this path (e.g. a serial tty) instead of stdout
        #[arg(long)]
        device: Option<PathBuf>,

        /// What to emit per tick
        #[arg(long, default_value = "commands")]
        emit: EmitFormat,

        /// Stop after this many ticks
        #[arg(long)]
        max_ticks: Option<u64>,
    },

    /// Compute one frame for a snapshot
    Tick {
        /// Engine configuration
        #[arg(short, long)]
        config: PathBuf,

        /// Metrics snapshot (use - for stdin)
        #[arg(short, long)]
        metrics: PathBuf,

        /// Time of day (HH:MM), defaults to local now
        #[arg(long)]
        at: Option<String>,

        /// Actuator to encode for
        #[arg(short, long, default_value = "hue")]
        actuator: ActuatorArg,

        /// Pretty-print the frame record
        #[arg(long)]
        pretty: bool,
    },

    /// Encode an explicit color temperature and intensity
    Render {
        /// Color temperature (Kelvin)
        #[arg(long)]
        kelvin: f64,

        /// Relative intensity (0-1)
        #[arg(long, default_value = "1.0")]
        intensity: f64,

        /// Actuator to encode for
        #[arg(short, long, default_value = "hue")]
        actuator: ActuatorArg,
    },

    /// Validate a configuration file
    Validate {
        /// Engine configuration
        #[arg(short, long)]
        config: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration, snapshot and environment
    Doctor {
        /// Check this configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Check this snapshot file
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print format information
    Schema {
        /// Schema to print
        #[arg(value_enum)]
        schema_type: SchemaType,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ActuatorArg {
    /// Smart-bulb bridge (JSON light state with mired ct)
    Hue,
    /// RGB strip controller (RGB,r,g,b lines)
    Rgb,
}

impl From<ActuatorArg> for ActuatorKind {
    fn from(arg: ActuatorArg) -> Self {
        match arg {
            ActuatorArg::Hue => ActuatorKind::Hue,
            ActuatorArg::Rgb => ActuatorKind::RgbStrip,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum EmitFormat {
    /// Device command wire lines
    Commands,
    /// Frame records as newline-delimited JSON
    Records,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Engine configuration
    Config,
    /// Metrics snapshot input
    Snapshot,
    /// Frame record output
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet, cli.log_format);

    match run(cli.command) {
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

fn init_tracing(verbose: u8, quiet: bool, format: LogFormat) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (false, 0) => Level::INFO,
        (false, 1) => Level::DEBUG,
        (false, _) => Level::TRACE,
    };

    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn run(command: Commands) -> Result<(), LumenCliError> {
    match command {
        Commands::Run {
            config,
            snapshot,
            actuator,
            interval,
            retry_delay,
            device,
            emit,
            max_ticks,
        } => cmd_run(
            &config,
            &snapshot,
            actuator.into(),
            Duration::from_secs(interval),
            Duration::from_secs(retry_delay),
            device.as_deref(),
            emit,
            max_ticks,
        ),

        Commands::Tick {
            config,
            metrics,
            at,
            actuator,
            pretty,
        } => cmd_tick(&config, &metrics, at.as_deref(), actuator.into(), pretty),

        Commands::Render {
            kelvin,
            intensity,
            actuator,
        } => cmd_render(kelvin, intensity, actuator.into()),

        Commands::Validate { config, json } => cmd_validate(&config, json),

        Commands::Doctor {
            config,
            snapshot,
            json,
        } => cmd_doctor(config.as_deref(), snapshot.as_deref(), json),

        Commands::Schema { schema_type } => cmd_schema(schema_type),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_run(
    config_path: &Path,
    snapshot_path: &Path,
    actuator: ActuatorKind,
    interval: Duration,
    retry_delay: Duration,
    device: Option<&Path>,
    emit: EmitFormat,
    max_ticks: Option<u64>,
) -> Result<(), LumenCliError> {
    let config = LightingConfig::load(config_path)?;
    let mut engine = LightingEngine::new(config)?;
    let encoder = FrameEncoder::new();

    let mut sink: Box<dyn Write> = match device {
        Some(path) => Box::new(open_device(path)?),
        None => Box::new(io::stdout()),
    };

    info!(
        actuator = %actuator,
        snapshot = %snapshot_path.display(),
        instance_id = encoder.instance_id(),
        "lighting control started"
    );

    let mut ticks: u64 = 0;
    loop {
        let snapshot = match read_snapshot(snapshot_path) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => {
                debug!(snapshot = %snapshot_path.display(), "snapshot not found; waiting");
                thread::sleep(retry_delay);
                continue;
            }
            Err(e) => {
                warn!(error = %e, "skipping tick: unreadable snapshot");
                thread::sleep(retry_delay);
                continue;
            }
        };

        let (frame, command) = engine.tick_for(&snapshot, TimeOfDay::now_local(), actuator);

        let line = match emit {
            EmitFormat::Commands => command.to_wire_line()?,
            EmitFormat::Records => {
                encoder.encode_to_json(frame.clone(), command, snapshot.timestamp.clone())? + "\n"
            }
        };

        // A failed device write loses one tick; the next tick retries
        if let Err(e) = sink.write_all(line.as_bytes()).and_then(|_| sink.flush()) {
            warn!(error = %e, "failed to write command");
        }

        info!(
            "I={:.2} CCT={}K {} HR={:?} Stress={:?} SleepScore={:?}",
            frame.smoothed.intensity,
            frame.smoothed.cct_kelvin as i64,
            describe_command(&command),
            snapshot.latest_hr,
            snapshot.stress_avg,
            snapshot.sleep_score
        );

        ticks += 1;
        if max_ticks.is_some_and(|max| ticks >= max) {
            break;
        }
        thread::sleep(interval);
    }

    Ok(())
}

fn cmd_tick(
    config_path: &Path,
    metrics_path: &Path,
    at: Option<&str>,
    actuator: ActuatorKind,
    pretty: bool,
) -> Result<(), LumenCliError> {
    let config = LightingConfig::load(config_path)?;
    let mut engine = LightingEngine::new(config)?;

    let metrics_json = read_input(metrics_path)?;
    let snapshot = MetricsSnapshot::from_json(&metrics_json)?;

    let at = match at {
        Some(raw) => raw.parse::<TimeOfDay>()?,
        None => TimeOfDay::now_local(),
    };

    let (frame, command) = engine.tick_for(&snapshot, at, actuator);
    let record = FrameEncoder::new().encode(frame, command, snapshot.timestamp.clone());

    if pretty {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("{}", serde_json::to_string(&record)?);
    }

    Ok(())
}

fn cmd_render(kelvin: f64, intensity: f64, actuator: ActuatorKind) -> Result<(), LumenCliError> {
    if !kelvin.is_finite() || kelvin <= 0.0 {
        return Err(LumenCliError::InvalidArgument(format!(
            "kelvin must be positive, got {}",
            kelvin
        )));
    }

    let command = actuator.encoder().encode(kelvin, intensity);
    print!("{}", command.to_wire_line()?);
    Ok(())
}

fn cmd_validate(config_path: &Path, json: bool) -> Result<(), LumenCliError> {
    let (errors, warnings) = match LightingConfig::load(config_path) {
        Ok(config) => (
            Vec::new(),
            config.warnings().iter().map(|w| w.to_string()).collect(),
        ),
        Err(e) => (vec![e.to_string()], Vec::new()),
    };

    let report = ValidationReport {
        config: config_path.display().to_string(),
        valid: errors.is_empty(),
        errors,
        warnings,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Config:   {}", report.config);
        println!("Valid:    {}", report.valid);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!("  - {}", err);
            }
        }
        if !report.warnings.is_empty() {
            println!("\nWarnings:");
            for warning in &report.warnings {
                println!("  - {}", warning);
            }
        }
    }

    if report.valid {
        Ok(())
    } else {
        Err(LumenCliError::ValidationFailed(report.errors.len()))
    }
}

fn cmd_doctor(
    config: Option<&Path>,
    snapshot: Option<&Path>,
    json: bool,
) -> Result<(), LumenCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "lumen_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Lumen version {}", LUMEN_VERSION),
    });

    if let Some(config_path) = config {
        match LightingConfig::load(config_path) {
            Ok(config) => {
                let warnings = config.warnings();
                if warnings.is_empty() {
                    checks.push(DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Ok,
                        message: "Configuration valid".to_string(),
                    });
                } else {
                    for warning in warnings {
                        checks.push(DoctorCheck {
                            name: "config".to_string(),
                            status: CheckStatus::Warning,
                            message: warning.to_string(),
                        });
                    }
                }
            }
            Err(e) => checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Error,
                message: e.to_string(),
            }),
        }
    }

    if let Some(snapshot_path) = snapshot {
        let check = match read_snapshot(snapshot_path) {
            Ok(Some(snapshot)) if snapshot.rejected.is_empty() => DoctorCheck {
                name: "snapshot".to_string(),
                status: CheckStatus::Ok,
                message: format!(
                    "Snapshot readable (hr={:?}, stress={:?}, sleep={:?})",
                    snapshot.latest_hr, snapshot.stress_avg, snapshot.sleep_score
                ),
            },
            Ok(Some(snapshot)) => DoctorCheck {
                name: "snapshot".to_string(),
                status: CheckStatus::Warning,
                message: format!(
                    "Non-numeric metrics ignored: {}",
                    snapshot
                        .rejected
                        .iter()
                        .map(|field| field.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            },
            Ok(None) => DoctorCheck {
                name: "snapshot".to_string(),
                status: CheckStatus::Warning,
                message: "Snapshot file does not exist yet".to_string(),
            },
            Err(e) => DoctorCheck {
                name: "snapshot".to_string(),
                status: CheckStatus::Error,
                message: e.to_string(),
            },
        };
        checks.push(check);
    }

    // Check stdin is available (for `tick --metrics -`)
    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (snapshot can be piped to tick)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: LUMEN_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Lumen Doctor Report");
        println!("===================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
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
        Err(LumenCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType) -> Result<(), LumenCliError> {
    match schema_type {
        SchemaType::Config => {
            println!("# Engine configuration (all sections required except cct_shifts)");
            println!("#");
            println!("# circadian:  start (HH:MM), intensity (0-1), cct (Kelvin) per period;");
            println!("#             each window runs to the next period's start");
            println!("# thresholds: heart rate rest/high (bpm), sleep score good/poor");
            println!("# weights:    activity_boost, stress_calm, sleep_debt multipliers");
            println!("# limits:     intensity_min/max (0-1), cct_min/max (Kelvin)");
            println!("# smoothing:  alpha in (0, 1], hysteresis band");
            println!("# cct_shifts: optional Kelvin offsets (default 600/800/600)");
            println!();
            print!("{}", EXAMPLE_CONFIG_YAML);
        }
        SchemaType::Snapshot => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "$schema": "https://json-schema.org/draft/2020-12/schema",
                    "title": "metrics snapshot",
                    "description": "Missing keys, null and non-numeric values mean no measurement",
                    "type": "object",
                    "properties": {
                        "latest_hr": { "type": ["number", "null"], "description": "bpm" },
                        "stress_avg": { "type": ["number", "null"], "description": "0-100" },
                        "sleep_score": { "type": ["number", "null"], "description": "vendor scale" },
                        "timestamp": { "type": "string" }
                    }
                }))?
            );
        }
        SchemaType::Output => {
            println!("Output Schema: {}", FRAME_SCHEMA_VERSION);
            println!();
            println!("- schema_version");
            println!("- producer: {{ name, version, instance_id }}");
            println!("- computed_at_utc, snapshot_timestamp");
            println!("- frame: {{ at, baseline, signals, raw, smoothed }}");
            println!("- command: {{ actuator: hue, on, bri, ct }} | {{ actuator: rgb_strip, r, g, b }}");
            println!();
            println!("Device wire lines (run --emit commands):");
            println!("- hue:       {{\"on\":true,\"bri\":1..254,\"ct\":153..500}}");
            println!("- rgb_strip: RGB,<r>,<g>,<b>");
        }
    }

    Ok(())
}

// Helper functions

fn read_input(path: &Path) -> Result<String, LumenCliError> {
    if path.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

/// Open an existing device node (or file) for appending; never creates it
fn open_device(path: &Path) -> io::Result<fs::File> {
    OpenOptions::new().append(true).open(path)
}

/// Read the snapshot file; `Ok(None)` while it does not exist yet
fn read_snapshot(path: &Path) -> Result<Option<MetricsSnapshot>, LightingError> {
    match fs::read_to_string(path) {
        Ok(contents) => MetricsSnapshot::from_json(&contents).map(Some),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

fn describe_command(command: &DeviceCommand) -> String {
    match command {
        DeviceCommand::Hue(state) => format!("(bri={} ct={})", state.bri, state.ct),
        DeviceCommand::RgbStrip(color) => format!("RGB=({},{},{})", color.r, color.g, color.b),
    }
}

// Error types

#[derive(Debug)]
enum LumenCliError {
    Io(io::Error),
    Lighting(LightingError),
    Json(serde_json::Error),
    InvalidArgument(String),
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for LumenCliError {
    fn from(e: io::Error) -> Self {
        LumenCliError::Io(e)
    }
}

impl From<LightingError> for LumenCliError {
    fn from(e: LightingError) -> Self {
        LumenCliError::Lighting(e)
    }
}

impl From<serde_json::Error> for LumenCliError {
    fn from(e: serde_json::Error) -> Self {
        LumenCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<LumenCliError> for CliError {
    fn from(e: LumenCliError) -> Self {
        match e {
            LumenCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            LumenCliError::Lighting(e) => {
                let (code, hint) = match &e {
                    LightingError::InvalidConfig(_)
                    | LightingError::YamlError(_)
                    | LightingError::JsonError(_) => (
                        "CONFIG_ERROR",
                        "Run 'lumen validate' or 'lumen schema config' for details",
                    ),
                    LightingError::SnapshotError(_) => (
                        "SNAPSHOT_ERROR",
                        "Snapshot must be a JSON object; see 'lumen schema snapshot'",
                    ),
                    LightingError::InvalidTime(_) => ("TIME_ERROR", "Use HH:MM or HH:MM:SS"),
                    LightingError::UnknownActuator(_) => ("ACTUATOR_ERROR", "Use hue or rgb"),
                    LightingError::Io(_) => ("IO_ERROR", "Check file paths and permissions"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            LumenCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            LumenCliError::InvalidArgument(msg) => CliError {
                code: "INVALID_ARGUMENT".to_string(),
                message: msg,
                hint: None,
            },
            LumenCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} configuration errors", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            LumenCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    config: String,
    valid: bool,
    errors: Vec<String>,
    warnings: Vec<String>,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
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

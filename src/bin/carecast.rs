//! Carecast CLI - Command-line interface for the carecast engine
//!
//! Commands:
//! - forecast: Build a care.forecast.v1 report from an event log (batch mode)
//! - replay: Re-run the forecast after each event from stdin (replay mode)
//! - validate: Validate care.event.v1 records
//! - doctor: Diagnose engine health and configuration
//! - schema: Print schema information

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use carecast::engine::{CareEngine, REPORT_VERSION};
use carecast::schema::{EventLogAdapter, EventRecord, SCHEMA_VERSION};
use carecast::types::{CareConfig, Event, ForecastReport};
use carecast::{CARECAST_VERSION, PRODUCER_NAME};
use chrono::{DateTime, Utc};

/// Carecast - On-device forecasting engine for infant-care rhythms
#[derive(Parser)]
#[command(name = "carecast")]
#[command(author = "Carecast Maintainers")]
#[command(version = CARECAST_VERSION)]
#[command(about = "Forecast infant-care activities from an event log", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a care.forecast.v1 report from an event log (batch mode)
    Forecast {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,

        /// Config file with birth date, interval overrides, and preferences
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Reference time (RFC 3339); defaults to the current time.
        /// Pass a past instant to replay the forecast as of that moment.
        #[arg(long)]
        at: Option<String>,
    },

    /// Re-run the forecast after each event from stdin (replay mode)
    ///
    /// Reads NDJSON events and emits one report per event, using that
    /// event's recorded_at as the reference time. The output shows how the
    /// forecast evolved as the log grew, independent of the wall clock.
    Replay {
        /// Output format
        #[arg(long, default_value = "ndjson")]
        output_format: OutputFormat,

        /// Config file with birth date, interval overrides, and preferences
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Flush output after each record
        #[arg(long, default_value = "true")]
        flush: bool,
    },

    /// Validate care.event.v1 records
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "ndjson")]
        input_format: InputFormat,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose engine health and configuration
    Doctor {
        /// Check a config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print (input or output)
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// Newline-delimited JSON (one event per line)
    Ndjson,
    /// JSON array of events
    Json,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Newline-delimited JSON (one report per line)
    Ndjson,
    /// JSON array of reports
    Json,
    /// Pretty-printed JSON
    JsonPretty,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Input schema (care.event.v1)
    Input,
    /// Output schema (care.forecast.v1)
    Output,
}

fn main() -> ExitCode {
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

fn run(cli: Cli) -> Result<(), CarecastCliError> {
    match cli.command {
        Commands::Forecast {
            input,
            output,
            input_format,
            output_format,
            config,
            at,
        } => cmd_forecast(
            &input,
            &output,
            input_format,
            output_format,
            config.as_deref(),
            at.as_deref(),
        ),

        Commands::Replay {
            output_format,
            config,
            flush,
        } => cmd_replay(output_format, config.as_deref(), flush),

        Commands::Validate {
            input,
            input_format,
            json,
        } => cmd_validate(&input, input_format, json),

        Commands::Doctor { config, json } => cmd_doctor(config.as_deref(), json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

fn cmd_forecast(
    input: &PathBuf,
    output: &PathBuf,
    input_format: InputFormat,
    output_format: OutputFormat,
    config: Option<&Path>,
    at: Option<&str>,
) -> Result<(), CarecastCliError> {
    // Read input
    let input_data = read_input(input)?;

    // Parse events; an empty log is valid and yields an age-based forecast
    let records = parse_records(&input_data, &input_format)?;
    let events = EventLogAdapter::to_events(records)?;

    let config = load_config(config)?;
    let reference_time = resolve_reference_time(at)?;

    let engine = CareEngine::new(config);
    let report = engine.report(&events, reference_time);

    // Write output
    let output_data = format_output(&[report], &output_format)?;

    if output.to_string_lossy() == "-" {
        print!("{}", output_data);
    } else {
        fs::write(output, output_data)?;
    }

    Ok(())
}

fn cmd_replay(
    output_format: OutputFormat,
    config: Option<&Path>,
    flush: bool,
) -> Result<(), CarecastCliError> {
    let config = load_config(config)?;
    let engine = CareEngine::new(config);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut events: Vec<Event> = Vec::new();

    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.is_empty() {
            continue;
        }

        // Parse and validate the event
        let record: EventRecord = serde_json::from_str(trimmed)
            .map_err(|e| CarecastCliError::ParseError(format!("Failed to parse event: {}", e)))?;
        let event = record.into_event()?;

        // Each report is anchored at the event that produced it
        let reference_time = event.start_time;
        events.push(event);

        let report = engine.report(&events, reference_time);
        let output = format_output(&[report], &output_format)?;

        write!(stdout, "{}", output)?;
        if flush {
            stdout.flush()?;
        }
    }

    Ok(())
}

fn cmd_validate(
    input: &PathBuf,
    input_format: InputFormat,
    json: bool,
) -> Result<(), CarecastCliError> {
    // Read input
    let input_data = read_input(input)?;

    // Parse events
    let records = parse_records(&input_data, &input_format)?;

    // Validate each record
    let results = EventLogAdapter::validate_events(&records);

    let report = ValidationReport {
        total_events: records.len(),
        valid_events: records.len() - results.len(),
        invalid_events: results.len(),
        errors: results
            .iter()
            .map(|r| ValidationErrorDetail {
                index: r.index,
                event_id: r.event_id.clone(),
                error: r.error.as_ref().map(|e| e.to_string()).unwrap_or_default(),
            })
            .collect(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Total events:   {}", report.total_events);
        println!("Valid events:   {}", report.valid_events);
        println!("Invalid events: {}", report.invalid_events);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!(
                    "  - Event {} (index {}): {}",
                    err.event_id.as_deref().unwrap_or("unknown"),
                    err.index,
                    err.error
                );
            }
        }
    }

    if report.invalid_events > 0 {
        Err(CarecastCliError::ValidationFailed(report.invalid_events))
    } else {
        Ok(())
    }
}

fn cmd_doctor(config: Option<&Path>, json: bool) -> Result<(), CarecastCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    // Check carecast version
    checks.push(DoctorCheck {
        name: "carecast_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Carecast version {}", CARECAST_VERSION),
    });

    // Check schema versions
    checks.push(DoctorCheck {
        name: "schema_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Input schema: {}, report schema: {}", SCHEMA_VERSION, REPORT_VERSION),
    });

    // Check config file if provided
    if let Some(config_path) = config {
        if config_path.exists() {
            match fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str::<CareConfig>(&content) {
                    Ok(config) => {
                        let message = match config.birth_date {
                            Some(birth_date) => {
                                let age = carecast::age::age_in_days(birth_date, Utc::now());
                                format!("Config valid (birth date set, age {} days)", age)
                            }
                            None => {
                                "Config valid (no birth date; general norms apply)".to_string()
                            }
                        };
                        checks.push(DoctorCheck {
                            name: "config".to_string(),
                            status: CheckStatus::Ok,
                            message,
                        });
                    }
                    Err(e) => {
                        checks.push(DoctorCheck {
                            name: "config".to_string(),
                            status: CheckStatus::Error,
                            message: format!("Invalid config JSON: {}", e),
                        });
                    }
                },
                Err(e) => {
                    checks.push(DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Cannot read config file: {}", e),
                    });
                }
            }
        } else {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "Config file does not exist".to_string(),
            });
        }
    }

    // Check stdin is available (for replay mode)
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
            message: "stdin is a pipe (replay mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: CARECAST_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Carecast Doctor Report");
        println!("======================");
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
        Err(CarecastCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), CarecastCliError> {
    match schema_type {
        SchemaType::Input => {
            if json_schema {
                println!("{}", get_input_json_schema());
            } else {
                println!("Input Schema: {}", SCHEMA_VERSION);
                println!();
                println!("One record per logged care event:");
                println!();
                println!("- schema_version: \"{}\"", SCHEMA_VERSION);
                println!("- event_id: optional unique identifier");
                println!("- activity: tagged payload, one of:");
                println!("    feeding  {{ method: bottle | nursing | solids }}");
                println!("    diaper   {{ kind: wet | dirty | both }}");
                println!("    sleep    {{ kind?: nap | night }}");
                println!("    pumping");
                println!("    other");
                println!("- recorded_at: event start (RFC 3339, UTC)");
                println!("- ended_at: optional event end");
                println!("- amount_ml: optional volume (feeding and pumping only)");
                println!("- duration_minutes: optional duration");
                println!("- outcome: completed (default) | skipped");
                println!("- scheduled: true for future plans (default false)");
                println!("- note: optional free text");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", get_output_json_schema());
            } else {
                println!("Output Schema: {}", REPORT_VERSION);
                println!();
                println!("A care.forecast.v1 report contains:");
                println!();
                println!("- schema_version: \"{}\"", REPORT_VERSION);
                println!("- producer: {{ name, version, instance_id }}");
                println!("- reference_time_utc: the instant the forecast describes");
                println!("- summary:");
                println!("  - age_days: infant age at the reference time, if known");
                println!("  - feeding / diaper / sleep: per-activity forecasts with");
                println!("    predicted_interval_hours, next_time, confidence, status,");
                println!("    minutes_until, overdue and skip-recovery fields, and a");
                println!("    calculation breakdown (weights, samples, correlations)");
                println!("  - suggestions: {{ amount, duration }} blended from history");
                println!("    and caregiver preferences");
                println!("  - goals: daily feeding/diaper/sleep targets");
                println!("  - events_considered: log size after filtering");
            }
        }
    }

    Ok(())
}

// Helper functions

fn read_input(input: &PathBuf) -> Result<String, CarecastCliError> {
    if input.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn parse_records(
    input_data: &str,
    input_format: &InputFormat,
) -> Result<Vec<EventRecord>, CarecastCliError> {
    let records = match input_format {
        InputFormat::Ndjson => EventLogAdapter::parse_ndjson(input_data)?,
        InputFormat::Json => EventLogAdapter::parse_array(input_data)?,
    };
    Ok(records)
}

fn load_config(config: Option<&Path>) -> Result<CareConfig, CarecastCliError> {
    match config {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            let config = serde_json::from_str(&content)?;
            Ok(config)
        }
        None => Ok(CareConfig::default()),
    }
}

fn resolve_reference_time(at: Option<&str>) -> Result<DateTime<Utc>, CarecastCliError> {
    match at {
        Some(text) => DateTime::parse_from_rfc3339(text)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| {
                CarecastCliError::ParseError(format!(
                    "Invalid reference time '{}': {} (expected RFC 3339)",
                    text, e
                ))
            }),
        None => Ok(Utc::now()),
    }
}

fn format_output(
    reports: &[ForecastReport],
    format: &OutputFormat,
) -> Result<String, CarecastCliError> {
    match format {
        OutputFormat::Ndjson => {
            let mut lines: Vec<String> = Vec::new();
            for report in reports {
                lines.push(serde_json::to_string(report)?);
            }
            Ok(lines.join("\n") + "\n")
        }
        OutputFormat::Json => Ok(serde_json::to_string(reports)?),
        OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(reports)?),
    }
}

fn get_input_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "https://carecast.dev/schemas/care.event.v1.json",
        "title": "care.event.v1",
        "description": "Carecast care event schema",
        "type": "object",
        "required": ["schema_version", "activity", "recorded_at"],
        "properties": {
            "schema_version": {
                "type": "string",
                "const": "care.event.v1"
            },
            "event_id": { "type": "string" },
            "activity": {
                "type": "object",
                "required": ["type"],
                "properties": {
                    "type": {
                        "type": "string",
                        "enum": ["feeding", "diaper", "sleep", "pumping", "other"]
                    },
                    "method": {
                        "type": "string",
                        "enum": ["bottle", "nursing", "solids"]
                    },
                    "kind": { "type": "string" }
                }
            },
            "recorded_at": { "type": "string", "format": "date-time" },
            "ended_at": { "type": "string", "format": "date-time" },
            "amount_ml": { "type": "number", "minimum": 0 },
            "duration_minutes": { "type": "number", "minimum": 0 },
            "outcome": {
                "type": "string",
                "enum": ["completed", "skipped"]
            },
            "scheduled": { "type": "boolean" },
            "note": { "type": "string" }
        }
    })
    .to_string()
}

fn get_output_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "$id": "https://carecast.dev/schemas/care.forecast.v1.json",
        "title": "care.forecast.v1",
        "description": "Carecast forecast report schema",
        "type": "object",
        "required": ["schema_version", "producer", "reference_time_utc", "summary"],
        "properties": {
            "schema_version": { "type": "string" },
            "producer": {
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "version": { "type": "string" },
                    "instance_id": { "type": "string" }
                }
            },
            "reference_time_utc": { "type": "string", "format": "date-time" },
            "summary": {
                "type": "object",
                "required": ["feeding", "diaper", "sleep", "suggestions", "goals"],
                "properties": {
                    "age_days": { "type": "integer" },
                    "feeding": { "type": "object" },
                    "diaper": { "type": "object" },
                    "sleep": { "type": "object" },
                    "suggestions": { "type": "object" },
                    "goals": { "type": "object" },
                    "events_considered": { "type": "integer" }
                }
            }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum CarecastCliError {
    Io(io::Error),
    Engine(carecast::EngineError),
    Json(serde_json::Error),
    Validation(carecast::schema::ValidationError),
    ValidationFailed(usize),
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for CarecastCliError {
    fn from(e: io::Error) -> Self {
        CarecastCliError::Io(e)
    }
}

impl From<carecast::EngineError> for CarecastCliError {
    fn from(e: carecast::EngineError) -> Self {
        CarecastCliError::Engine(e)
    }
}

impl From<serde_json::Error> for CarecastCliError {
    fn from(e: serde_json::Error) -> Self {
        CarecastCliError::Json(e)
    }
}

impl From<carecast::schema::ValidationError> for CarecastCliError {
    fn from(e: carecast::schema::ValidationError) -> Self {
        CarecastCliError::Validation(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<CarecastCliError> for CliError {
    fn from(e: CarecastCliError) -> Self {
        match e {
            CarecastCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            CarecastCliError::Engine(e) => CliError {
                code: "ENGINE_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Ensure input matches the care.event.v1 schema".to_string()),
            },
            CarecastCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            CarecastCliError::Validation(e) => CliError {
                code: "VALIDATION_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Run 'carecast validate' for details".to_string()),
            },
            CarecastCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{} events failed validation", count),
                hint: Some("Fix validation errors and retry".to_string()),
            },
            CarecastCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
            CarecastCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: Some("Check input format".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    total_events: usize,
    valid_events: usize,
    invalid_events: usize,
    errors: Vec<ValidationErrorDetail>,
}

#[derive(serde::Serialize)]
struct ValidationErrorDetail {
    index: usize,
    event_id: Option<String>,
    error: String,
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

//! SocialFlow CLI - Command-line interface for the metrics query engine
//!
//! Commands:
//! - ask: Answer a single query against a dataset
//! - repl: Answer query lines from stdin (interactive mode)
//! - summary: Print chart-view aggregates (engagement sums, likes breakdown)
//! - validate: Load a dataset and report row-level errors
//! - doctor: Diagnose dataset and environment health

use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use socialflow::{
    Dataset, LoadReport, MetricsError, QueryResolver, ViewBuilder, PRODUCER_NAME,
    SOCIALFLOW_VERSION,
};

/// SocialFlow - query engine and chart views over social post metrics
#[derive(Parser)]
#[command(name = "socialflow")]
#[command(version = SOCIALFLOW_VERSION)]
#[command(about = "Answer free-text questions about post engagement metrics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single query against a dataset
    Ask {
        /// Dataset CSV path
        #[arg(short, long)]
        data: PathBuf,

        /// The query text (e.g. "average likes for reels")
        #[arg(required = true, num_args = 1.., trailing_var_arg = true)]
        query: Vec<String>,
    },

    /// Answer query lines from stdin until EOF
    Repl {
        /// Dataset CSV path
        #[arg(short, long)]
        data: PathBuf,

        /// Flush output after each answer
        #[arg(long, default_value = "true")]
        flush: bool,
    },

    /// Print chart-view aggregates
    Summary {
        /// Dataset CSV path
        #[arg(short, long)]
        data: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Load a dataset and report row-level errors
    Validate {
        /// Dataset CSV path
        #[arg(short, long)]
        data: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose dataset and environment health
    Doctor {
        /// Dataset CSV path to check
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
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

fn run(cli: Cli) -> Result<(), SocialflowCliError> {
    match cli.command {
        Commands::Ask { data, query } => cmd_ask(&data, &query.join(" ")),
        Commands::Repl { data, flush } => cmd_repl(&data, flush),
        Commands::Summary { data, json } => cmd_summary(&data, json),
        Commands::Validate { data, json } => cmd_validate(&data, json),
        Commands::Doctor { data, json } => cmd_doctor(data.as_deref(), json),
    }
}

fn load_dataset(path: &Path) -> Result<Dataset, SocialflowCliError> {
    let report = Dataset::load_csv(path)?;

    if report.dataset.is_empty() {
        return Err(SocialflowCliError::Metrics(MetricsError::EmptyDataset));
    }

    // Bad rows are tolerated when answering queries; validate reports them.
    Ok(report.dataset)
}

fn cmd_ask(data: &Path, query: &str) -> Result<(), SocialflowCliError> {
    let dataset = load_dataset(data)?;
    let resolver = QueryResolver::new(&dataset);
    println!("{}", resolver.resolve(query));
    Ok(())
}

fn cmd_repl(data: &Path, flush: bool) -> Result<(), SocialflowCliError> {
    let dataset = load_dataset(data)?;
    let resolver = QueryResolver::new(&dataset);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    if atty::is(atty::Stream::Stdin) {
        eprintln!("Ask a question about the dataset (Ctrl-D to exit):");
    }

    for line in stdin.lock().lines() {
        let line = line?;
        let query = line.trim();

        if query.is_empty() {
            continue;
        }

        writeln!(stdout, "{}", resolver.resolve(query))?;
        if flush {
            stdout.flush()?;
        }
    }

    Ok(())
}

fn cmd_summary(data: &Path, json: bool) -> Result<(), SocialflowCliError> {
    let dataset = load_dataset(data)?;
    let builder = ViewBuilder::new(&dataset);

    let engagement = builder.engagement_by_type();
    let breakdown = builder.likes_breakdown();

    if json {
        let report = serde_json::json!({
            "engagement_by_type": engagement,
            "likes_breakdown": breakdown,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Engagement by Post Type");
    println!("=======================");
    println!("{:<12} {:>10} {:>10} {:>10}", "post_type", "likes", "shares", "comments");
    for row in &engagement.rows {
        println!(
            "{:<12} {:>10} {:>10} {:>10}",
            row.post_type, row.likes, row.shares, row.comments
        );
    }

    println!();
    println!("Likes Distribution");
    println!("==================");
    if breakdown.slices.is_empty() {
        println!("(no likes data)");
    } else {
        for slice in &breakdown.slices {
            println!(
                "{:<12} {:>10} {:>7.1}%",
                slice.post_type, slice.likes, slice.percent
            );
        }
    }

    Ok(())
}

fn cmd_validate(data: &Path, json: bool) -> Result<(), SocialflowCliError> {
    let LoadReport {
        dataset,
        rows_read,
        rows_used,
        row_errors,
    } = Dataset::load_csv(data)?;

    let report = ValidationReport {
        rows_read,
        rows_used,
        rows_rejected: row_errors.len(),
        post_types: dataset.group_sums_by_type().len(),
        errors: row_errors,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Rows read:     {}", report.rows_read);
        println!("Rows used:     {}", report.rows_used);
        println!("Rows rejected: {}", report.rows_rejected);
        println!("Post types:    {}", report.post_types);

        if !report.errors.is_empty() {
            println!("\nErrors:");
            for err in &report.errors {
                println!(
                    "  - line {} ({}): {}",
                    err.line,
                    err.post_id.as_deref().unwrap_or("unknown"),
                    err.message
                );
            }
        }
    }

    if report.rows_rejected > 0 {
        Err(SocialflowCliError::ValidationFailed(report.rows_rejected))
    } else {
        Ok(())
    }
}

fn cmd_doctor(data: Option<&Path>, json: bool) -> Result<(), SocialflowCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "socialflow_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("SocialFlow version {}", SOCIALFLOW_VERSION),
    });

    if let Some(data) = data {
        if data.exists() {
            match Dataset::load_csv(data) {
                Ok(report) => {
                    let status = if report.dataset.is_empty() {
                        CheckStatus::Error
                    } else if report.row_errors.is_empty() {
                        CheckStatus::Ok
                    } else {
                        CheckStatus::Warning
                    };
                    checks.push(DoctorCheck {
                        name: "dataset".to_string(),
                        status,
                        message: format!(
                            "{} of {} rows usable, {} post types",
                            report.rows_used,
                            report.rows_read,
                            report.dataset.group_sums_by_type().len()
                        ),
                    });
                }
                Err(e) => {
                    checks.push(DoctorCheck {
                        name: "dataset".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Cannot load dataset: {e}"),
                    });
                }
            }
        } else {
            checks.push(DoctorCheck {
                name: "dataset".to_string(),
                status: CheckStatus::Error,
                message: "Dataset file does not exist".to_string(),
            });
        }
    }

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
            message: "stdin is a pipe (repl mode ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: SOCIALFLOW_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("SocialFlow Doctor Report");
        println!("========================");
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
        Err(SocialflowCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

// Error types

#[derive(Debug)]
enum SocialflowCliError {
    Io(io::Error),
    Metrics(MetricsError),
    Json(serde_json::Error),
    ValidationFailed(usize),
    DoctorFailed,
}

impl From<io::Error> for SocialflowCliError {
    fn from(e: io::Error) -> Self {
        SocialflowCliError::Io(e)
    }
}

impl From<MetricsError> for SocialflowCliError {
    fn from(e: MetricsError) -> Self {
        SocialflowCliError::Metrics(e)
    }
}

impl From<serde_json::Error> for SocialflowCliError {
    fn from(e: serde_json::Error) -> Self {
        SocialflowCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<SocialflowCliError> for CliError {
    fn from(e: SocialflowCliError) -> Self {
        match e {
            SocialflowCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            SocialflowCliError::Metrics(e) => CliError {
                code: "DATASET_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Ensure the CSV has the expected header and rows".to_string()),
            },
            SocialflowCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON output options".to_string()),
            },
            SocialflowCliError::ValidationFailed(count) => CliError {
                code: "VALIDATION_FAILED".to_string(),
                message: format!("{count} rows failed validation"),
                hint: Some("Fix the reported rows and retry".to_string()),
            },
            SocialflowCliError::DoctorFailed => CliError {
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
    rows_read: usize,
    rows_used: usize,
    rows_rejected: usize,
    post_types: usize,
    errors: Vec<socialflow::RowError>,
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

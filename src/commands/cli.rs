// src/commands/cli.rs
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{info, warn};
use std::error::Error;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::app_config::AppConfig;
use crate::core::file_system::FileSystem;
use crate::core::reporting::{format_report, Report};
use crate::core::window::TimeWindow;
use crate::initialize_service;
use crate::services::report_service::{ReportOutcome, ReportService};

#[derive(Parser, Debug)]
#[command(name = "bidboard", about = "Tender and bid activity reports")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build the daily activity report for a time window
    Report(ReportArgs),
    /// Print the overall KPIs as JSON
    Summary(SourceArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Read tenders and bids from a snapshot file instead of the API
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// User whose tenders are reported (defaults to APP_USER_ID)
    #[arg(long)]
    pub user_id: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Lookback window: 4, 7 or 90 days (`7d`, `week`, ...)
    #[arg(long, short)]
    pub window: Option<String>,

    #[arg(long, short, value_enum, default_value_t = OutputFormat::Markdown)]
    pub format: OutputFormat,

    /// Write the rendered report to a file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Also save the JSON report under the reports directory
    #[arg(long)]
    pub save: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Markdown,
    Json,
}

pub fn parse_cli_args(args: &[String]) -> Result<Command, Box<dyn Error>> {
    let cli = Cli::try_parse_from(args)?;
    Ok(cli.command)
}

pub async fn execute_command<W: Write>(
    command: Command,
    config: &AppConfig,
    output: &mut W,
) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Report(args) => run_report(args, config, output).await,
        Command::Summary(source) => run_summary(source, config, output).await,
    }
}

async fn run_report<W: Write>(args: ReportArgs, config: &AppConfig, output: &mut W) -> Result<(), Box<dyn Error>> {
    let window = args
        .window
        .as_deref()
        .map(TimeWindow::parse)
        .unwrap_or_else(|| config.default_window());
    let service = initialize_service(config, args.source.snapshot.as_deref(), args.source.user_id.as_deref())?;

    let outcome = service.report_or_fallback(window, Utc::now()).await;
    let report = shown_report(&outcome)?;

    let rendered = match args.format {
        OutputFormat::Markdown => format_report(report),
        OutputFormat::Json => serde_json::to_string_pretty(report)?,
    };
    match &args.output {
        Some(path) => {
            write_file(path, &rendered)?;
            info!("Wrote {} report to {}", window, path.display());
        }
        None => writeln!(output, "{}", rendered)?,
    }

    if args.save {
        let path = FileSystem::generate_report_file_path(report, Path::new(&config.reports_dir));
        FileSystem::save_report(report, &path)?;
    }

    into_result(outcome)
}

async fn run_summary<W: Write>(source: SourceArgs, config: &AppConfig, output: &mut W) -> Result<(), Box<dyn Error>> {
    let service = initialize_service(config, source.snapshot.as_deref(), source.user_id.as_deref())?;
    write_summary(&service, config.default_window(), Utc::now(), output).await
}

/// Print the KPIs as JSON. A failed fetch still prints the all-zero KPIs
/// before reporting the error.
async fn write_summary<W: Write>(
    service: &ReportService,
    window: TimeWindow,
    now: DateTime<Utc>,
    output: &mut W,
) -> Result<(), Box<dyn Error>> {
    let outcome = service.report_or_fallback(window, now).await;
    let report = shown_report(&outcome)?;
    writeln!(output, "{}", serde_json::to_string_pretty(&report.summary)?)?;
    into_result(outcome)
}

fn shown_report(outcome: &ReportOutcome) -> Result<&Report, Box<dyn Error>> {
    outcome.report().ok_or_else(|| "Report is still loading".into())
}

fn into_result(outcome: ReportOutcome) -> Result<(), Box<dyn Error>> {
    match outcome {
        ReportOutcome::Failed { message, .. } => Err(message.into()),
        _ => Ok(()),
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    if path.exists() {
        warn!("Overwriting {}", path.display());
    }
    std::fs::write(path, contents)?;
    Ok(())
}

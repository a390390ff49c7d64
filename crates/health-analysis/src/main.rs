//! CLI entry point for the healthcare analysis pipeline.

use anyhow::{Result, anyhow};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use health_analysis::{
    AnalysisConfig, AnalysisError, AnalysisReport, DataFilter, DatasetKind, Pipeline,
    ReportGenerator, RiskOutcome, SyntheticGenerator,
};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// CLI-compatible dataset kind enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliDatasetKind {
    /// Pima Indians diabetes records
    Diabetes,
    /// Cleveland heart-disease records
    HeartDisease,
}

impl From<CliDatasetKind> for DatasetKind {
    fn from(cli: CliDatasetKind) -> Self {
        match cli {
            CliDatasetKind::Diabetes => DatasetKind::Diabetes,
            CliDatasetKind::HeartDisease => DatasetKind::HeartDisease,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Healthcare dataset analysis",
    long_about = "Cleans a diabetes or heart-disease dataset and reports summary \
                  statistics, correlations and risk factors.\n\n\
                  EXAMPLES:\n  \
                  # Analyze whichever dataset is in the current directory\n  \
                  health-analysis analyze\n\n  \
                  # Filter by age and export the filtered rows\n  \
                  health-analysis analyze --age-min 40 --age-max 60 --export\n\n  \
                  # Machine-readable output\n  \
                  health-analysis analyze --json | jq .risk\n\n  \
                  # Create a synthetic diabetes.csv\n  \
                  health-analysis generate --rows 500"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and results)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the cleaning, summary and risk analysis pipeline
    Analyze(AnalyzeArgs),
    /// Write a seeded synthetic diabetes dataset
    Generate(GenerateArgs),
    /// Download the sample diabetes and heart-disease datasets
    #[cfg(feature = "download")]
    Download(DownloadArgs),
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// Directory searched for diabetes.csv and heart_disease.csv
    #[arg(short, long, default_value = ".")]
    data_dir: PathBuf,

    /// Analyze this CSV file instead of searching the data directory
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Dataset kind of --input (guessed from the file name if omitted)
    #[arg(long, value_enum, requires = "input")]
    kind: Option<CliDatasetKind>,

    /// Outcome column (found by name if omitted)
    #[arg(short, long)]
    target: Option<String>,

    /// Keep only rows with age at or above this value
    #[arg(long)]
    age_min: Option<f64>,

    /// Keep only rows with age at or below this value
    #[arg(long)]
    age_max: Option<f64>,

    /// Keep only rows with this sex/gender value (repeatable)
    #[arg(long = "sex")]
    sexes: Vec<String>,

    /// Keep only rows where any cell contains this text (case-insensitive)
    #[arg(long)]
    search: Option<String>,

    /// Output directory for exports and reports
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Export the displayed (search-narrowed) table as a timestamped CSV
    #[arg(long)]
    export: bool,

    /// Write a detailed JSON report to the output directory
    ///
    /// The report will be saved as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,

    /// Number of risk factors analysed in detail
    #[arg(long, default_value = "3")]
    top: usize,

    /// Number of histogram bins
    #[arg(long, default_value = "30")]
    bins: usize,

    /// Keep duplicate rows
    #[arg(long)]
    keep_duplicates: bool,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Number of rows
    #[arg(long, default_value = "1000")]
    rows: usize,

    /// Random seed
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Output CSV path
    #[arg(short, long, default_value = "diabetes.csv")]
    output: PathBuf,
}

#[cfg(feature = "download")]
#[derive(Args, Debug)]
struct DownloadArgs {
    /// Directory the datasets are written to
    #[arg(short, long, default_value = ".")]
    data_dir: PathBuf,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    // Load environment variables from .env file (RUST_LOG)
    dotenv().ok();

    let cli = Cli::parse();

    let json_output = matches!(&cli.command, Command::Analyze(args) if args.json);
    init_logging(&cli.log_level, cli.quiet, json_output);

    match cli.command {
        Command::Analyze(args) => run_analyze(&args, cli.quiet),
        Command::Generate(args) => run_generate(&args),
        #[cfg(feature = "download")]
        Command::Download(args) => run_download(&args),
    }
}

fn build_filter(args: &AnalyzeArgs) -> DataFilter {
    let mut filter = DataFilter::new().sexes(args.sexes.iter().cloned());
    if args.age_min.is_some() || args.age_max.is_some() {
        filter = filter.age_range(
            args.age_min.unwrap_or(f64::NEG_INFINITY),
            args.age_max.unwrap_or(f64::INFINITY),
        );
    }
    if let Some(search) = &args.search {
        filter = filter.search(search.as_str());
    }
    filter
}

fn run_analyze(args: &AnalyzeArgs, quiet: bool) -> Result<()> {
    let mut config_builder = AnalysisConfig::builder()
        .data_dir(&args.data_dir)
        .output_dir(&args.output)
        .top_risk_factors(args.top)
        .histogram_bins(args.bins)
        .remove_duplicates(!args.keep_duplicates);

    if let Some(ref target) = args.target {
        config_builder = config_builder.target_column(target);
    }

    let config = config_builder.build()?;

    let mut builder = Pipeline::builder().config(config).filter(build_filter(args));
    if !quiet && !args.json {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }
    let pipeline = builder.build()?;

    let outcome = match &args.input {
        Some(path) => pipeline.run_path(path, args.kind.map(Into::into)),
        None => pipeline.run(),
    };
    let result = match outcome {
        Ok(result) => result,
        Err(e @ AnalysisError::NoDatasetFound { .. }) => {
            error!("{}", e);
            return Err(anyhow!("{}", e));
        }
        Err(e) => {
            error!("Pipeline failed: {}", e);
            return Err(anyhow!("Pipeline failed: {}", e));
        }
    };

    let generator = ReportGenerator::new(&args.output);

    let export_path = if args.export {
        let path = generator.export_csv(&result.explorer)?;
        info!("Filtered data exported to: {}", path.display());
        Some(path)
    } else {
        None
    };

    let report = ReportGenerator::build_report(&result, export_path.as_deref());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if args.emit_report {
        let report_path = generator.write_report_to_file(&report, &extract_file_stem(&result.source))?;
        info!("Report written to: {}", report_path.display());
    }

    print_human_readable_summary(&report);
    Ok(())
}

fn run_generate(args: &GenerateArgs) -> Result<()> {
    let df = SyntheticGenerator::new(args.rows, args.seed).write_csv(&args.output)?;
    println!(
        "Sample diabetes dataset written to {} ({} rows x {} columns)",
        args.output.display(),
        df.height(),
        df.width()
    );
    Ok(())
}

#[cfg(feature = "download")]
fn run_download(args: &DownloadArgs) -> Result<()> {
    use health_analysis::download::{DownloadStatus, Downloader};

    let summary = Downloader::new(&args.data_dir)?.download_all()?;

    println!();
    println!("Available datasets:");
    for (name, status) in [
        ("diabetes.csv", &summary.diabetes),
        ("heart_disease.csv", &summary.heart_disease),
    ] {
        match status {
            DownloadStatus::Downloaded { path, rows } => {
                println!("  - {}: {} records ({})", name, rows, path.display())
            }
            DownloadStatus::Synthetic { path, rows } => {
                println!("  - {}: {} synthetic records ({})", name, rows, path.display())
            }
            DownloadStatus::Failed { reason } => println!("  - {}: unavailable ({})", name, reason),
        }
    }
    Ok(())
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// Print a human-readable summary of the analysis.
///
/// This is the default output when `--json` is not given.
fn print_human_readable_summary(report: &AnalysisReport) {
    let summary = &report.summary;

    println!();
    println!("{}", "=".repeat(80));
    println!("{} DATASET ANALYSIS", report.dataset_kind.display_name().to_uppercase());
    println!("{}", "=".repeat(80));
    println!();

    println!("Input: {}", report.input_file);
    if let Some(ref output_file) = report.output_file {
        println!("Export: {}", output_file);
    }
    println!();

    println!("Overview:");
    println!("  Total Records: {}", summary.total_records);
    println!("  Features: {}", summary.total_features);
    println!("  Missing Values: {}", summary.missing_values);
    println!("  Duplicate Records: {}", summary.duplicate_records);
    println!("  Memory Usage: {}", summary.memory_usage);
    println!();

    println!("Cleaning:");
    println!(
        "  Rows: {} -> {} ({} missing cells before cleaning)",
        report.cleaning.rows_before, report.cleaning.rows_after, report.cleaning.missing_before
    );
    for action in &report.cleaning.actions {
        println!("  - {}", action);
    }
    println!();

    if !report.describe.is_empty() {
        println!("Descriptive Statistics:");
        println!(
            "  {:<26} {:>7} {:>10} {:>10} {:>10} {:>10} {:>10}",
            "Column", "Count", "Mean", "Std", "Min", "Median", "Max"
        );
        println!("  {}", "-".repeat(88));
        for stats in &report.describe {
            println!(
                "  {:<26} {:>7} {:>10.2} {:>10} {:>10.2} {:>10.2} {:>10.2}",
                truncate_str(&stats.column, 25),
                stats.count,
                stats.mean,
                stats
                    .std
                    .map(|s| format!("{:.2}", s))
                    .unwrap_or_else(|| "-".to_string()),
                stats.min,
                stats.median,
                stats.max
            );
        }
        println!();
    }

    match &report.risk {
        RiskOutcome::Analyzed(analysis) => {
            println!("Risk Factors (target: {}):", analysis.target_column);
            for factor in &analysis.ranking {
                println!(
                    "  {:<26} r = {:>6.3}",
                    truncate_str(&factor.column, 25),
                    factor.correlation
                );
            }
            println!();

            for (rank, factor) in analysis.top_factors.iter().enumerate() {
                println!("  {}. {}", rank + 1, factor.factor);
                println!("     Correlation: {:.3}", factor.correlation);
                if let Some(mean) = factor.mean_without_disease {
                    println!("     Average for non-disease: {:.2}", mean);
                }
                if let Some(mean) = factor.mean_with_disease {
                    println!("     Average for disease: {:.2}", mean);
                }
                if let (Some(difference), Some(direction)) = (factor.difference, factor.direction)
                {
                    println!("     Difference: {:+.2} ({})", difference, direction.insight());
                }
            }

            for warning in &analysis.warnings {
                println!("  Warning: {}", warning);
            }
        }
        RiskOutcome::Skipped { reason } => {
            println!("Risk Factors: skipped ({})", reason);
        }
    }
    println!();
    println!("Completed in {}ms", report.duration_ms);
    println!("{}", "=".repeat(80));
}

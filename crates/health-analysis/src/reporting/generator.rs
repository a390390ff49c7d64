use crate::error::{AnalysisError, Result};
use crate::pipeline::AnalysisResult;
use crate::types::{
    BoxPlotSummary, CleaningReport, ColumnInfo, CorrelationMatrix, DatasetKind, DatasetSummary,
    Distribution, NumericSummary, RiskOutcome,
};
use chrono::{DateTime, Local};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix of exported CSV files.
pub const EXPORT_PREFIX: &str = "healthcare_data_filtered";

/// Serializable record of one analysis run.
///
/// Used for both JSON output (`--json`) and file writing (`--emit-report`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    // Metadata
    pub generated_at: String,
    pub dataset_kind: DatasetKind,
    pub input_file: String,
    /// Path of the exported CSV, if one was written.
    pub output_file: Option<String>,
    pub duration_ms: u64,

    // Stage results
    /// The table as loaded, before cleaning
    pub raw_summary: DatasetSummary,
    pub cleaning: CleaningReport,
    /// The cleaned and filtered table
    pub summary: DatasetSummary,
    pub columns: Vec<ColumnInfo>,
    pub describe: Vec<NumericSummary>,
    pub distributions: Vec<Distribution>,
    pub box_plots: Vec<BoxPlotSummary>,
    pub correlation: CorrelationMatrix,
    pub risk: RiskOutcome,
}

/// Writes reports and CSV exports to an output directory.
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
        }
    }
}

impl ReportGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Build a report from a pipeline result.
    pub fn build_report(result: &AnalysisResult, output_file: Option<&Path>) -> AnalysisReport {
        AnalysisReport {
            generated_at: Local::now().to_rfc3339(),
            dataset_kind: result.dataset_kind,
            input_file: result.source.display().to_string(),
            output_file: output_file.map(|p| p.display().to_string()),
            duration_ms: result.duration_ms,
            raw_summary: result.raw_summary.clone(),
            cleaning: result.cleaning.clone(),
            summary: result.summary.clone(),
            columns: result.columns.clone(),
            describe: result.describe.clone(),
            distributions: result.distributions.clone(),
            box_plots: result.box_plots.clone(),
            correlation: result.correlation.clone(),
            risk: result.risk.clone(),
        }
    }

    /// Write `df` as CSV to `<output_dir>/healthcare_data_filtered_<timestamp>.csv`.
    pub fn export_csv(&self, df: &DataFrame) -> Result<PathBuf> {
        self.export_csv_at(df, Local::now())
    }

    pub(crate) fn export_csv_at(&self, df: &DataFrame, now: DateTime<Local>) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let output_path = self.output_dir.join(export_file_name(now));

        let mut df = df.clone();
        let mut file = File::create(&output_path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .finish(&mut df)
            .map_err(|e| AnalysisError::ReportGenerationFailed(e.to_string()))?;

        info!(
            "Exported {} rows to {}",
            df.height(),
            output_path.display()
        );
        Ok(output_path)
    }

    /// Write a report to `<output_dir>/<base_name>_report.json`.
    pub fn write_report_to_file(&self, report: &AnalysisReport, base_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self.output_dir.join(format!("{}_report.json", base_name));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}

/// `healthcare_data_filtered_<YYYYMMDD_HHMMSS>.csv`
pub fn export_file_name(now: DateTime<Local>) -> String {
    format!("{}_{}.csv", EXPORT_PREFIX, now.format("%Y%m%d_%H%M%S"))
}

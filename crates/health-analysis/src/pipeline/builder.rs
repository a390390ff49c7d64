//! Main analysis pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! running Loader -> Cleaner -> Filter -> Summarizer -> Risk Analyzer.

use crate::analysis::{RiskAnalyzer, correlation_matrix, find_target_column};
use crate::cleaner::DataCleaner;
use crate::config::{AnalysisConfig, ConfigValidationError};
use crate::error::{AnalysisError, Result};
use crate::filter::DataFilter;
use crate::loader::{Dataset, DatasetCache, DatasetLoader, detect_kind};
use crate::pipeline::progress::{
    AnalysisStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate,
};
use crate::profiler::DataProfiler;
use crate::types::{
    BoxPlotSummary, CleaningReport, ColumnInfo, CorrelationMatrix, DatasetKind, DatasetSummary,
    Distribution, NumericSummary, RiskAnalysis, RiskOutcome,
};
use crate::utils::numeric_column_names;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Reason reported when no outcome column can be identified.
pub const NO_TARGET_REASON: &str = "no target variable found";

/// Everything one pipeline run produced.
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub dataset_kind: DatasetKind,
    pub source: PathBuf,
    /// Summary of the table as loaded, before cleaning.
    pub raw_summary: DatasetSummary,
    pub cleaning: CleaningReport,
    pub cleaned: DataFrame,
    /// The cleaned table after the age and sex filters; every statistic
    /// below is computed on it.
    pub filtered: DataFrame,
    /// `filtered` narrowed by the free-text search, for display and export.
    pub explorer: DataFrame,
    pub summary: DatasetSummary,
    pub columns: Vec<ColumnInfo>,
    pub describe: Vec<NumericSummary>,
    pub distributions: Vec<Distribution>,
    pub box_plots: Vec<BoxPlotSummary>,
    pub correlation: CorrelationMatrix,
    pub risk: RiskOutcome,
    pub duration_ms: u64,
}

/// The healthcare analysis pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use health_analysis::{AnalysisConfig, DataFilter, Pipeline};
///
/// let config = AnalysisConfig::builder().data_dir("data").build()?;
/// let result = Pipeline::builder()
///     .config(config)
///     .filter(DataFilter::new().age_range(30.0, 60.0))
///     .build()?
///     .run()?;
///
/// println!("{} records", result.summary.total_records);
/// ```
pub struct Pipeline {
    config: AnalysisConfig,
    loader: DatasetLoader,
    cleaner: DataCleaner,
    filter: DataFilter,
    risk_analyzer: RiskAnalyzer,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load the first available candidate dataset and analyze it.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::NoDatasetFound`] when no candidate file
    /// exists. A missing outcome column is not an error; the risk stage
    /// reports [`RiskOutcome::Skipped`] instead.
    pub fn run(&self) -> Result<AnalysisResult> {
        self.finish(|| {
            self.report_progress(ProgressUpdate::new(
                AnalysisStage::Loading,
                0.0,
                "Looking for a dataset...",
            ));
            self.loader.load_first_available(&self.config)
        })
    }

    /// Analyze a specific CSV file.
    ///
    /// The dataset kind is taken from `kind`, or guessed from the file name.
    pub fn run_path(&self, path: &Path, kind: Option<DatasetKind>) -> Result<AnalysisResult> {
        self.finish(|| {
            self.report_progress(ProgressUpdate::new(
                AnalysisStage::Loading,
                0.0,
                format!("Loading {}...", path.display()),
            ));
            let kind = kind.or_else(|| detect_kind(path)).unwrap_or_else(|| {
                warn!(
                    "Cannot tell the dataset kind of {}, assuming diabetes",
                    path.display()
                );
                DatasetKind::Diabetes
            });
            self.loader.load_path(path, kind)
        })
    }

    /// Analyze an already loaded dataset.
    pub fn run_dataset(&self, dataset: Dataset) -> Result<AnalysisResult> {
        self.finish(|| Ok(dataset))
    }

    fn finish(&self, load: impl FnOnce() -> Result<Dataset>) -> Result<AnalysisResult> {
        let start_time = Instant::now();
        match load().and_then(|dataset| self.analyze(dataset, start_time)) {
            Ok(result) => {
                self.report_progress(ProgressUpdate::complete("Analysis completed successfully"));
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn analyze(&self, dataset: Dataset, start_time: Instant) -> Result<AnalysisResult> {
        let Dataset {
            kind,
            source,
            frame,
        } = dataset;

        let raw_summary = DataProfiler::summarize(&frame)
            .map_err(|e| AnalysisError::ProfilingFailed(e.to_string()))?;
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Loading,
            1.0,
            format!(
                "Loaded {} dataset: {} rows x {} columns",
                kind.display_name(),
                raw_summary.total_records,
                raw_summary.total_features
            ),
        ));

        // Step 1: Cleaning
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Cleaning,
            0.0,
            "Cleaning dataset...",
        ));
        info!("Step 1: Cleaning dataset...");

        let (cleaned, cleaning) = self
            .cleaner
            .clean(&frame)
            .map_err(|e| AnalysisError::CleaningFailed(e.to_string()))?;

        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Cleaning,
            1.0,
            format!("Cleaning complete: {} rows", cleaning.rows_after),
        ));

        // Step 2: Filtering and summaries
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Summarizing,
            0.0,
            "Summarizing dataset...",
        ));
        info!("Step 2: Summarizing dataset...");

        let filtered = if self.filter.is_empty() {
            cleaned.clone()
        } else {
            let filtered = self.filter.apply_demographics(&cleaned)?;
            info!(
                "Filters kept {} of {} rows",
                filtered.height(),
                cleaned.height()
            );
            filtered
        };
        let explorer = match &self.filter.search {
            Some(term) => {
                let explorer = self.filter.apply_search(&filtered)?;
                info!("Search '{}' matched {} rows", term, explorer.height());
                explorer
            }
            None => filtered.clone(),
        };

        let numeric_columns = numeric_column_names(&filtered);
        let profiling = |e: anyhow::Error| AnalysisError::ProfilingFailed(e.to_string());

        let summary = DataProfiler::summarize(&filtered).map_err(profiling)?;
        let columns = DataProfiler::column_info(&filtered);
        let describe = DataProfiler::describe(&filtered).map_err(profiling)?;
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Summarizing,
            0.4,
            format!("Described {} numeric columns", describe.len()),
        ));

        let distributions =
            DataProfiler::distributions(&filtered, &numeric_columns, self.config.histogram_bins)
                .map_err(profiling)?;
        let box_plots = DataProfiler::box_plots(&filtered, &numeric_columns).map_err(profiling)?;
        let correlation = correlation_matrix(&filtered).map_err(profiling)?;
        debug!(
            "Correlation matrix over {} columns",
            correlation.columns.len()
        );

        self.report_progress(ProgressUpdate::new(
            AnalysisStage::Summarizing,
            1.0,
            "Summary complete",
        ));

        // Step 3: Risk factors
        self.report_progress(ProgressUpdate::new(
            AnalysisStage::RiskAnalysis,
            0.0,
            "Analyzing risk factors...",
        ));
        info!("Step 3: Analyzing risk factors...");

        let risk = self.analyze_risk(&filtered);

        self.report_progress(ProgressUpdate::new(
            AnalysisStage::RiskAnalysis,
            1.0,
            match &risk {
                RiskOutcome::Analyzed(analysis) => format!(
                    "Ranked {} risk factors against '{}'",
                    analysis.ranking.len(),
                    analysis.target_column
                ),
                RiskOutcome::Skipped { reason } => format!("Risk analysis skipped: {}", reason),
            },
        ));

        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!("Analysis finished in {} ms", duration_ms);

        Ok(AnalysisResult {
            dataset_kind: kind,
            source,
            raw_summary,
            cleaning,
            cleaned,
            filtered,
            explorer,
            summary,
            columns,
            describe,
            distributions,
            box_plots,
            correlation,
            risk,
            duration_ms,
        })
    }

    /// Run the risk stage. Any failure inside it becomes a skip, so the
    /// other stages' results survive.
    fn analyze_risk(&self, df: &DataFrame) -> RiskOutcome {
        let target = match &self.config.target_column {
            Some(column) => {
                if df.column(column).is_err() {
                    warn!("Configured target column '{}' not found", column);
                    return RiskOutcome::Skipped {
                        reason: format!("target column '{}' not found", column),
                    };
                }
                column.clone()
            }
            None => match find_target_column(df, &self.config.target_keywords) {
                Some(column) => column,
                None => {
                    warn!("Risk analysis skipped: {}", NO_TARGET_REASON);
                    return RiskOutcome::Skipped {
                        reason: NO_TARGET_REASON.to_string(),
                    };
                }
            },
        };
        debug!("Using '{}' as the outcome column", target);

        risk_outcome(self.risk_analyzer.analyze(df, &target))
    }
}

/// Turn the risk analyzer's result into the stage outcome.
fn risk_outcome(analysis: Result<RiskAnalysis>) -> RiskOutcome {
    match analysis {
        Ok(analysis) => RiskOutcome::Analyzed(analysis),
        Err(e) => {
            warn!("Risk analysis skipped: {}", e);
            RiskOutcome::Skipped {
                reason: e.to_string(),
            }
        }
    }
}

/// Builder for creating a [`Pipeline`] with custom configuration.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<AnalysisConfig>,
    filter: Option<DataFilter>,
    cache: Option<Arc<DatasetCache>>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the analysis configuration.
    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the row filters applied after cleaning.
    pub fn filter(mut self, filter: DataFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Share a dataset cache between pipelines.
    ///
    /// Each run still works on its own copy of the table.
    pub fn cache(mut self, cache: Arc<DatasetCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Set a progress reporter for receiving updates during a run.
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let pipeline = Pipeline::builder()
    ///     .on_progress(|update| {
    ///         println!("[{:.0}%] {:?}: {}",
    ///             update.progress * 100.0,
    ///             update.stage,
    ///             update.message
    ///         );
    ///     })
    ///     .build()?;
    /// ```
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let loader = match self.cache {
            Some(cache) => DatasetLoader::with_cache(cache),
            None => DatasetLoader::new(),
        };

        Ok(Pipeline {
            cleaner: DataCleaner::new(config.remove_duplicates),
            risk_analyzer: RiskAnalyzer::new(config.top_risk_factors),
            filter: self.filter.unwrap_or_default(),
            loader,
            progress_reporter: self.progress_reporter,
            config,
        })
    }
}

//! Healthcare Dataset Analysis Library
//!
//! Loads a diabetes or heart-disease table, cleans it, and reports
//! descriptive statistics, correlations and simple univariate risk factors.
//!
//! # Overview
//!
//! - **Loading**: probes `diabetes.csv` then `heart_disease.csv` and tags the
//!   table with its dataset kind; loads can go through a shared cache
//! - **Cleaning**: median/mode imputation followed by removal of duplicate rows
//! - **Summarizing**: headline counts, `describe`, histograms, box plots and a
//!   Pearson correlation matrix
//! - **Risk Analysis**: ranks numeric features by absolute correlation with the
//!   outcome column and compares the group means of the strongest ones
//! - **Filtering and Export**: age/sex/search filters and timestamped CSV export
//! - **Data Utilities**: seeded synthetic data and sample dataset downloads
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use health_analysis::{AnalysisConfig, Pipeline, RiskOutcome};
//!
//! let config = AnalysisConfig::builder().data_dir("data").build()?;
//!
//! let result = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run()?;
//!
//! println!("{} records, {}", result.summary.total_records, result.summary.memory_usage);
//!
//! match &result.risk {
//!     RiskOutcome::Analyzed(analysis) => {
//!         for factor in &analysis.top_factors {
//!             println!("{}: {:?}", factor.factor, factor.difference);
//!         }
//!     }
//!     RiskOutcome::Skipped { reason } => println!("{}", reason),
//! }
//! ```

pub mod analysis;
pub mod cleaner;
pub mod config;
#[cfg(feature = "download")]
pub mod download;
pub mod error;
pub mod filter;
pub mod imputers;
pub mod loader;
pub mod pipeline;
pub mod profiler;
pub mod reporting;
pub mod synthetic;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use analysis::{RiskAnalyzer, correlation_matrix, find_target_column};
pub use cleaner::DataCleaner;
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError, DatasetCandidate};
pub use error::{AnalysisError, ResultExt};
pub use filter::DataFilter;
pub use imputers::StatisticalImputer;
pub use loader::{Dataset, DatasetCache, DatasetLoader};
pub use pipeline::{
    AnalysisResult, AnalysisStage, ClosureProgressReporter, Pipeline, PipelineBuilder,
    ProgressReporter, ProgressUpdate,
};
pub use profiler::DataProfiler;
pub use reporting::{AnalysisReport, ReportGenerator};
pub use synthetic::SyntheticGenerator;
pub use types::{
    CleaningReport, CorrelationMatrix, DatasetKind, DatasetSummary, FactorComparison,
    RiskAnalysis, RiskDirection, RiskFactor, RiskOutcome,
};

//! Configuration types for the analysis pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic pipeline setup.

use crate::types::DatasetKind;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default keywords used to locate the outcome column, in priority order.
pub const DEFAULT_TARGET_KEYWORDS: [&str; 5] = ["outcome", "target", "disease", "diabetes", "heart"];

/// A file the loader will try, together with the kind it is tagged with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetCandidate {
    pub file_name: String,
    pub kind: DatasetKind,
}

impl DatasetCandidate {
    pub fn new(file_name: impl Into<String>, kind: DatasetKind) -> Self {
        Self {
            file_name: file_name.into(),
            kind,
        }
    }
}

/// The candidate files probed when no explicit input is given.
pub fn default_candidates() -> Vec<DatasetCandidate> {
    vec![
        DatasetCandidate::new("diabetes.csv", DatasetKind::Diabetes),
        DatasetCandidate::new("heart_disease.csv", DatasetKind::HeartDisease),
    ]
}

/// Configuration for the analysis pipeline.
///
/// Use [`AnalysisConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use health_analysis::config::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .data_dir("data")
///     .top_risk_factors(5)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Directory probed for the candidate dataset files.
    /// Default: "."
    pub data_dir: PathBuf,

    /// Candidate dataset files, tried in order. The first that exists wins.
    /// Default: diabetes.csv, heart_disease.csv
    pub candidates: Vec<DatasetCandidate>,

    /// Lowercase substrings identifying the outcome column, in priority order.
    pub target_keywords: Vec<String>,

    /// Explicitly specified outcome column.
    /// If None, the column is found with `target_keywords`.
    /// Default: None
    pub target_column: Option<String>,

    /// Number of risk factors analysed in detail.
    /// Default: 3
    pub top_risk_factors: usize,

    /// Number of equal-width bins for distribution histograms.
    /// Default: 30
    pub histogram_bins: usize,

    /// Whether to remove exact-duplicate rows while cleaning.
    /// Default: true
    pub remove_duplicates: bool,

    /// Output directory for exports and reports.
    /// Default: "output"
    pub output_dir: PathBuf,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            candidates: default_candidates(),
            target_keywords: DEFAULT_TARGET_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            target_column: None,
            top_risk_factors: 3,
            histogram_bins: 30,
            remove_duplicates: true,
            output_dir: PathBuf::from("output"),
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.candidates.is_empty() {
            return Err(ConfigValidationError::NoCandidates);
        }

        if self.target_keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigValidationError::EmptyTargetKeyword);
        }

        if self.top_risk_factors == 0 {
            return Err(ConfigValidationError::InvalidCount {
                field: "top_risk_factors".to_string(),
                value: self.top_risk_factors,
            });
        }

        if self.histogram_bins == 0 {
            return Err(ConfigValidationError::InvalidCount {
                field: "histogram_bins".to_string(),
                value: self.histogram_bins,
            });
        }

        Ok(())
    }

    /// Full paths of the candidate files, in probe order.
    pub fn candidate_paths(&self) -> Vec<(PathBuf, DatasetKind)> {
        self.candidates
            .iter()
            .map(|c| (self.data_dir.join(&c.file_name), c.kind))
            .collect()
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("At least one candidate dataset file is required")]
    NoCandidates,

    #[error("Target keywords must not be empty strings")]
    EmptyTargetKeyword,

    #[error("Invalid value for '{field}': {value} (must be at least 1)")]
    InvalidCount { field: String, value: usize },
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    data_dir: Option<PathBuf>,
    candidates: Option<Vec<DatasetCandidate>>,
    target_keywords: Option<Vec<String>>,
    target_column: Option<String>,
    top_risk_factors: Option<usize>,
    histogram_bins: Option<usize>,
    remove_duplicates: Option<bool>,
    output_dir: Option<PathBuf>,
}

impl AnalysisConfigBuilder {
    /// Set the directory probed for dataset files.
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(path.into());
        self
    }

    /// Replace the candidate dataset files.
    pub fn candidates(mut self, candidates: Vec<DatasetCandidate>) -> Self {
        self.candidates = Some(candidates);
        self
    }

    /// Replace the outcome column keywords. They are matched lowercase.
    pub fn target_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_keywords = Some(
            keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
        );
        self
    }

    /// Set an explicit outcome column.
    ///
    /// If not set, the column is found by keyword.
    pub fn target_column(mut self, column: impl Into<String>) -> Self {
        self.target_column = Some(column.into());
        self
    }

    /// Set how many risk factors get a detailed group comparison.
    pub fn top_risk_factors(mut self, n: usize) -> Self {
        self.top_risk_factors = Some(n);
        self
    }

    /// Set the number of histogram bins.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Enable or disable duplicate row removal.
    pub fn remove_duplicates(mut self, remove: bool) -> Self {
        self.remove_duplicates = Some(remove);
        self
    }

    /// Set the output directory for exports and reports.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            data_dir: self.data_dir.unwrap_or(defaults.data_dir),
            candidates: self.candidates.unwrap_or(defaults.candidates),
            target_keywords: self.target_keywords.unwrap_or(defaults.target_keywords),
            target_column: self.target_column,
            top_risk_factors: self.top_risk_factors.unwrap_or(defaults.top_risk_factors),
            histogram_bins: self.histogram_bins.unwrap_or(defaults.histogram_bins),
            remove_duplicates: self.remove_duplicates.unwrap_or(true),
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
        };

        config.validate()?;
        Ok(config)
    }
}

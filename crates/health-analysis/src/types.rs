use serde::{Deserialize, Serialize};
use std::fmt;

/// Which healthcare dataset a table was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    Diabetes,
    HeartDisease,
}

impl DatasetKind {
    /// Tag used in file names and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Diabetes => "diabetes",
            Self::HeartDisease => "heart_disease",
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Diabetes => "Diabetes",
            Self::HeartDisease => "Heart Disease",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-column dtype and completeness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub dtype: String,
    pub non_null_count: usize,
    pub null_count: usize,
}

/// Headline numbers for a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub total_records: usize,
    pub total_features: usize,
    /// Missing cells across all columns; zero after cleaning.
    pub missing_values: usize,
    pub duplicate_records: usize,
    pub memory_bytes: usize,
    /// Memory footprint formatted as megabytes, e.g. "0.05 MB".
    pub memory_usage: String,
}

/// Descriptive statistics of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; undefined for fewer than two values.
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

/// Five-number summary with IQR fences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxPlotSummary {
    pub column: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub lower_fence: f64,
    pub upper_fence: f64,
    pub outlier_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Histogram of a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub column: String,
    pub bins: Vec<HistogramBin>,
}

/// Pairwise Pearson correlations between numeric columns.
///
/// `values[i][j]` is `None` when the correlation is undefined (constant
/// column or fewer than two shared observations).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Look up the correlation of two columns by name.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.values[i][j]
    }
}

/// How an imputed value was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputationMethod {
    Median,
    Mode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImputationRecord {
    pub column: String,
    pub method: ImputationMethod,
    pub filled_cells: usize,
    pub fill_value: String,
}

/// What the cleaner did to a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub rows_before: usize,
    pub rows_after: usize,
    pub missing_before: usize,
    pub duplicates_removed: usize,
    pub imputations: Vec<ImputationRecord>,
    pub actions: Vec<String>,
}

/// Correlation of one feature with the outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub column: String,
    pub correlation: f64,
}

impl RiskFactor {
    pub fn strength(&self) -> f64 {
        self.correlation.abs()
    }
}

/// Direction of the mean difference between disease and non-disease rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskDirection {
    HigherIncreasesRisk,
    LowerIncreasesRisk,
}

impl RiskDirection {
    /// Positive differences mean higher values go with the disease.
    pub fn from_difference(difference: f64) -> Self {
        if difference > 0.0 {
            Self::HigherIncreasesRisk
        } else {
            Self::LowerIncreasesRisk
        }
    }

    pub fn insight(&self) -> &'static str {
        match self {
            Self::HigherIncreasesRisk => "higher values increase risk",
            Self::LowerIncreasesRisk => "lower values increase risk",
        }
    }
}

/// Statistics of a factor within one outcome group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    pub outcome_value: String,
    pub stats: NumericSummary,
}

/// Detailed comparison of a top risk factor across outcome groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorComparison {
    pub factor: String,
    pub correlation: f64,
    /// Mean where outcome == 0.
    pub mean_without_disease: Option<f64>,
    /// Mean where outcome == 1.
    pub mean_with_disease: Option<f64>,
    /// `mean_with_disease - mean_without_disease`.
    pub difference: Option<f64>,
    pub direction: Option<RiskDirection>,
    pub by_outcome: Vec<GroupSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAnalysis {
    pub target_column: String,
    /// False when the outcome holds values other than 0 and 1.
    pub binary_outcome: bool,
    /// Every numeric feature, strongest absolute correlation first.
    pub ranking: Vec<RiskFactor>,
    pub top_factors: Vec<FactorComparison>,
    pub warnings: Vec<String>,
}

/// Result of the risk stage, which may skip itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RiskOutcome {
    Analyzed(RiskAnalysis),
    Skipped { reason: String },
}

impl RiskOutcome {
    pub fn analysis(&self) -> Option<&RiskAnalysis> {
        match self {
            Self::Analyzed(analysis) => Some(analysis),
            Self::Skipped { .. } => None,
        }
    }
}

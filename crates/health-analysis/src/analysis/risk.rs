//! Univariate risk-factor ranking against a binary outcome.

use super::correlation::pearson;
use crate::error::{AnalysisError, Result};
use crate::profiler::DataProfiler;
use crate::types::{FactorComparison, RiskAnalysis, RiskDirection, RiskFactor};
use crate::utils::{is_numeric_dtype, numeric_column_names, numeric_values};
use polars::prelude::*;
use tracing::{debug, info, warn};

/// First column whose lowercase name contains one of `keywords`.
///
/// Keywords are tried in order, so an earlier keyword wins even when a
/// later one matches a column further left. This differs from
/// scanning columns left to right for any keyword: that scan picks
/// `DiabetesPedigreeFunction` (matching "diabetes") over `Outcome` in the
/// diabetes table.
pub fn find_target_column(df: &DataFrame, keywords: &[String]) -> Option<String> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    keywords.iter().find_map(|keyword| {
        let keyword = keyword.to_lowercase();
        names
            .iter()
            .find(|name| name.to_lowercase().contains(&keyword))
            .cloned()
    })
}

/// Ranks numeric features by absolute Pearson correlation with an outcome.
#[derive(Debug, Clone)]
pub struct RiskAnalyzer {
    top_n: usize,
}

impl Default for RiskAnalyzer {
    fn default() -> Self {
        Self { top_n: 3 }
    }
}

impl RiskAnalyzer {
    pub fn new(top_n: usize) -> Self {
        Self { top_n }
    }

    /// Rank every numeric feature against `target` and compare the group
    /// means of the strongest `top_n`.
    pub fn analyze(&self, df: &DataFrame, target: &str) -> Result<RiskAnalysis> {
        let target_col = df
            .column(target)
            .map_err(|_| AnalysisError::ColumnNotFound(target.to_string()))?;
        if !is_numeric_dtype(target_col.dtype()) {
            return Err(AnalysisError::NoValidValues(target.to_string()));
        }
        let outcome = numeric_values(target_col.as_materialized_series())?;
        if outcome.iter().all(Option::is_none) {
            return Err(AnalysisError::NoValidValues(target.to_string()));
        }

        info!("Analyzing risk factors against '{}'", target);
        let mut warnings = Vec::new();

        let binary_outcome = outcome
            .iter()
            .flatten()
            .all(|v| *v == 0.0 || *v == 1.0);
        if !binary_outcome {
            let message = format!(
                "Outcome '{}' holds values other than 0 and 1; only the 0 and 1 groups are compared",
                target
            );
            warn!("{}", message);
            warnings.push(message);
        }

        // 1. Correlate every other numeric column with the outcome
        let mut ranking = Vec::new();
        for name in numeric_column_names(df) {
            if name == target {
                continue;
            }
            let values = numeric_values(df.column(&name)?.as_materialized_series())?;
            match pearson(&values, &outcome) {
                Some(correlation) => ranking.push(RiskFactor {
                    column: name,
                    correlation,
                }),
                None => {
                    debug!("Correlation of '{}' with '{}' is undefined", name, target);
                    warnings.push(format!(
                        "Correlation of '{}' with '{}' is undefined",
                        name, target
                    ));
                }
            }
        }

        // 2. Strongest first; ties keep table order
        ranking.sort_by(|a, b| b.strength().total_cmp(&a.strength()));

        // 3. Group means of the top factors
        let mut top_factors = Vec::new();
        for factor in ranking.iter().take(self.top_n) {
            top_factors.push(self.compare_groups(df, factor, target, &outcome)?);
        }

        info!(
            "Risk analysis complete: {} ranked factors, top {}",
            ranking.len(),
            top_factors.len()
        );

        Ok(RiskAnalysis {
            target_column: target.to_string(),
            binary_outcome,
            ranking,
            top_factors,
            warnings,
        })
    }

    fn compare_groups(
        &self,
        df: &DataFrame,
        factor: &RiskFactor,
        target: &str,
        outcome: &[Option<f64>],
    ) -> Result<FactorComparison> {
        let values = numeric_values(df.column(&factor.column)?.as_materialized_series())?;

        let mean_without_disease = group_mean(&values, outcome, 0.0);
        let mean_with_disease = group_mean(&values, outcome, 1.0);
        let difference = match (mean_with_disease, mean_without_disease) {
            (Some(with), Some(without)) => Some(with - without),
            _ => None,
        };

        let mut by_outcome = DataProfiler::describe_by_group(df, &factor.column, target)
            .map_err(|e| AnalysisError::RiskAnalysisFailed(e.to_string()))?;
        by_outcome.sort_by(|a, b| {
            let a = a.outcome_value.parse::<f64>().unwrap_or(f64::INFINITY);
            let b = b.outcome_value.parse::<f64>().unwrap_or(f64::INFINITY);
            a.total_cmp(&b)
        });

        Ok(FactorComparison {
            factor: factor.column.clone(),
            correlation: factor.correlation,
            mean_without_disease,
            mean_with_disease,
            difference,
            direction: difference.map(RiskDirection::from_difference),
            by_outcome,
        })
    }
}

/// Mean of `values` over the rows where `outcome == group`.
fn group_mean(values: &[Option<f64>], outcome: &[Option<f64>], group: f64) -> Option<f64> {
    let selected: Vec<f64> = values
        .iter()
        .zip(outcome)
        .filter_map(|(value, label)| match (value, label) {
            (Some(value), Some(label)) if *label == group => Some(*value),
            _ => None,
        })
        .collect();

    if selected.is_empty() {
        None
    } else {
        Some(selected.iter().sum::<f64>() / selected.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_TARGET_KEYWORDS;
    use pretty_assertions::assert_eq;

    fn keywords() -> Vec<String> {
        DEFAULT_TARGET_KEYWORDS.iter().map(|k| k.to_string()).collect()
    }

    // ==================== find_target_column tests ====================

    #[test]
    fn test_find_target_prefers_outcome_over_pedigree() {
        let df = df![
            "Glucose" => [1i64],
            "DiabetesPedigreeFunction" => [0.5],
            "Outcome" => [0i64],
        ]
        .unwrap();
        assert_eq!(
            find_target_column(&df, &keywords()),
            Some("Outcome".to_string())
        );
    }

    #[test]
    fn test_find_target_heart_dataset() {
        let df = df![
            "age" => [63i64],
            "thalach" => [150i64],
            "target" => [1i64],
        ]
        .unwrap();
        assert_eq!(
            find_target_column(&df, &keywords()),
            Some("target".to_string())
        );
    }

    #[test]
    fn test_find_target_none() {
        let df = df!["Glucose" => [1i64], "BMI" => [22.0]].unwrap();
        assert_eq!(find_target_column(&df, &keywords()), None);
    }

    // ==================== RiskAnalyzer tests ====================

    #[test]
    fn test_glucose_example() {
        let df = df![
            "Glucose" => [90i64, 200],
            "Outcome" => [0i64, 1],
        ]
        .unwrap();

        let analysis = RiskAnalyzer::default().analyze(&df, "Outcome").unwrap();
        assert!(analysis.binary_outcome);
        assert_eq!(analysis.top_factors.len(), 1);

        let glucose = &analysis.top_factors[0];
        assert_eq!(glucose.factor, "Glucose");
        assert_eq!(glucose.mean_without_disease, Some(90.0));
        assert_eq!(glucose.mean_with_disease, Some(200.0));
        assert_eq!(glucose.difference, Some(110.0));
        assert_eq!(
            glucose.direction.map(|d| d.insight()),
            Some("higher values increase risk")
        );
    }

    #[test]
    fn test_perfect_correlation_ranks_first() {
        let df = df![
            "Noise" => [1.0, 3.0, 5.0, 1.0, 3.0, 5.0],
            "Signal" => [0.0, 0.0, 0.0, 1.0, 1.0, 1.0],
            "Outcome" => [0i64, 0, 0, 1, 1, 1],
        ]
        .unwrap();

        let analysis = RiskAnalyzer::default().analyze(&df, "Outcome").unwrap();
        assert_eq!(analysis.ranking[0].column, "Signal");
        assert!((analysis.ranking[0].correlation - 1.0).abs() < 1e-12);
        assert!(analysis.ranking[1].correlation.abs() < 1e-12);
    }

    #[test]
    fn test_top_n_limits_factors_and_keeps_ranking() {
        let df = df![
            "a" => [1.0, 2.0, 3.0, 4.0],
            "b" => [4.0, 1.0, 3.0, 2.0],
            "c" => [1.0, 1.0, 2.0, 3.0],
            "d" => [2.0, 1.0, 4.0, 3.0],
            "Outcome" => [0i64, 0, 1, 1],
        ]
        .unwrap();

        let analysis = RiskAnalyzer::default().analyze(&df, "Outcome").unwrap();
        assert_eq!(analysis.ranking.len(), 4);
        assert_eq!(analysis.top_factors.len(), 3);
        for pair in analysis.ranking.windows(2) {
            assert!(pair[0].strength() >= pair[1].strength());
        }
    }

    #[test]
    fn test_negative_difference_insight() {
        let df = df![
            "thalach" => [170.0, 160.0, 120.0, 110.0],
            "target" => [0i64, 0, 1, 1],
        ]
        .unwrap();

        let analysis = RiskAnalyzer::default().analyze(&df, "target").unwrap();
        let factor = &analysis.top_factors[0];
        assert_eq!(factor.difference, Some(-50.0));
        assert_eq!(factor.direction, Some(RiskDirection::LowerIncreasesRisk));
        assert_eq!(factor.by_outcome.len(), 2);
        assert_eq!(factor.by_outcome[0].stats.mean, 165.0);
    }

    #[test]
    fn test_non_binary_outcome_warns() {
        let df = df![
            "chol" => [200.0, 250.0, 300.0, 280.0],
            "num" => [0i64, 1, 2, 3],
        ]
        .unwrap();

        let analysis = RiskAnalyzer::default().analyze(&df, "num").unwrap();
        assert!(!analysis.binary_outcome);
        assert_eq!(analysis.warnings.len(), 1);
        assert_eq!(analysis.top_factors[0].mean_with_disease, Some(250.0));
    }

    #[test]
    fn test_constant_feature_is_excluded() {
        let df = df![
            "flat" => [1.0, 1.0, 1.0],
            "BMI" => [20.0, 30.0, 25.0],
            "Outcome" => [0i64, 1, 0],
        ]
        .unwrap();

        let analysis = RiskAnalyzer::default().analyze(&df, "Outcome").unwrap();
        assert_eq!(analysis.ranking.len(), 1);
        assert_eq!(analysis.ranking[0].column, "BMI");
        assert!(analysis.warnings[0].contains("flat"));
    }

    #[test]
    fn test_missing_target_fails_with_column_not_found() {
        let df = df!["BMI" => [20.0, 30.0]].unwrap();
        let error = RiskAnalyzer::default().analyze(&df, "Outcome").unwrap_err();
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND");
    }

    #[test]
    fn test_text_target_rejected() {
        let df = df![
            "BMI" => [20.0, 30.0],
            "disease" => ["no", "yes"],
        ]
        .unwrap();
        let error = RiskAnalyzer::default().analyze(&df, "disease").unwrap_err();
        assert_eq!(error.error_code(), "NO_VALID_VALUES");
    }
}

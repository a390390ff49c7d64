//! Data cleaning module.
//!
//! This module provides functionality for:
//! - Filling missing numeric cells with the column median
//! - Filling missing categorical cells with the column mode
//! - Removing rows that duplicate an earlier row
//!
//! Imputation always runs before deduplication, so rows that only become
//! identical after filling are treated as duplicates.

use crate::imputers::StatisticalImputer;
use crate::types::CleaningReport;
use crate::utils::{
    categorical_column_names, drop_duplicate_rows, numeric_column_names, total_missing_count,
};
use anyhow::Result;
use polars::prelude::*;
use tracing::{debug, info};

/// Data cleaner for imputation and deduplication.
#[derive(Debug, Clone)]
pub struct DataCleaner {
    remove_duplicates: bool,
}

impl Default for DataCleaner {
    fn default() -> Self {
        Self {
            remove_duplicates: true,
        }
    }
}

impl DataCleaner {
    pub fn new(remove_duplicates: bool) -> Self {
        Self { remove_duplicates }
    }

    /// Clean a table, leaving the input untouched.
    ///
    /// 1. Median-fill numeric columns with missing cells (null or NaN)
    /// 2. Mode-fill categorical and boolean columns with missing cells
    /// 3. Drop rows identical to an earlier row, keeping the first
    pub fn clean(&self, df: &DataFrame) -> Result<(DataFrame, CleaningReport)> {
        let mut df = df.clone();
        let mut report = CleaningReport {
            rows_before: df.height(),
            missing_before: total_missing_count(&df),
            ..CleaningReport::default()
        };

        info!("Performing data cleaning...");

        // 1-2. Impute, only when something is missing
        if report.missing_before > 0 {
            for col in numeric_column_names(&df) {
                StatisticalImputer::apply_numeric_median(&mut df, &col, &mut report.imputations)?;
            }
            for col in categorical_column_names(&df) {
                StatisticalImputer::apply_mode_imputation(&mut df, &col, &mut report.imputations)?;
            }

            for record in &report.imputations {
                report.actions.push(format!(
                    "Filled {} missing values in '{}' with {:?}: {}",
                    record.filled_cells, record.column, record.method, record.fill_value
                ));
            }
        } else {
            report.actions.push("No missing values found".to_string());
            debug!("No missing values found");
        }

        // 3. Remove duplicate rows
        if self.remove_duplicates {
            let deduped = drop_duplicate_rows(&df)?;
            let removed = df.height() - deduped.height();
            df = deduped;
            report.duplicates_removed = removed;

            if removed > 0 {
                let pct = (removed as f64 / report.rows_before as f64) * 100.0;
                report.actions.push(format!(
                    "Removed {} duplicate rows ({:.1}%)",
                    removed, pct
                ));
                debug!("Removed {} duplicate rows", removed);
            } else {
                report.actions.push("No duplicate rows found".to_string());
                debug!("No duplicate rows found");
            }
        }

        report.rows_after = df.height();
        info!(
            "Cleaning complete: {} -> {} rows, {} cells imputed",
            report.rows_before,
            report.rows_after,
            report
                .imputations
                .iter()
                .map(|r| r.filled_cells)
                .sum::<usize>()
        );

        Ok((df, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ImputationMethod;
    use crate::utils::{missing_count, numeric_values, text_values};
    use pretty_assertions::assert_eq;

    fn f64_column(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        numeric_values(df.column(name).unwrap().as_materialized_series()).unwrap()
    }

    #[test]
    fn test_clean_glucose_example() {
        let df = df![
            "Glucose" => [90i64, 200, 90],
            "Outcome" => [0i64, 1, 0],
        ]
        .unwrap();

        let (cleaned, report) = DataCleaner::default().clean(&df).unwrap();

        assert_eq!(cleaned.height(), 2);
        assert_eq!(f64_column(&cleaned, "Glucose"), vec![Some(90.0), Some(200.0)]);
        assert_eq!(f64_column(&cleaned, "Outcome"), vec![Some(0.0), Some(1.0)]);
        assert_eq!(report.duplicates_removed, 1);
        assert!(report.imputations.is_empty());
    }

    #[test]
    fn test_clean_leaves_input_unmodified() {
        let df = df![
            "BMI" => [Some(20.0), None, Some(30.0)],
        ]
        .unwrap();

        let (cleaned, _) = DataCleaner::default().clean(&df).unwrap();

        assert_eq!(df.column("BMI").unwrap().null_count(), 1);
        assert_eq!(cleaned.column("BMI").unwrap().null_count(), 0);
    }

    #[test]
    fn test_clean_preserves_median() {
        let df = df![
            "Insulin" => [Some(10.0), None, Some(40.0), Some(20.0), None, Some(80.0)],
        ]
        .unwrap();
        let before = df.column("Insulin").unwrap().as_materialized_series().median();

        let (cleaned, report) = DataCleaner::new(false).clean(&df).unwrap();

        assert_eq!(cleaned.column("Insulin").unwrap().null_count(), 0);
        assert_eq!(
            cleaned.column("Insulin").unwrap().as_materialized_series().median(),
            before
        );
        assert_eq!(report.imputations[0].method, ImputationMethod::Median);
        assert_eq!(report.imputations[0].filled_cells, 2);
    }

    #[test]
    fn test_clean_mode_fills_categorical() {
        let df = df![
            "age" => [50i64, 60, 70, 80],
            "sex" => [Some("F"), Some("M"), None, Some("F")],
        ]
        .unwrap();

        let (cleaned, report) = DataCleaner::default().clean(&df).unwrap();

        let sex = text_values(cleaned.column("sex").unwrap().as_materialized_series()).unwrap();
        assert_eq!(sex[2].as_deref(), Some("F"));
        assert_eq!(report.imputations.len(), 1);
    }

    #[test]
    fn test_clean_fills_nan_cells() {
        let df = df![
            "Glucose" => [90.5, f64::NAN, 100.5],
            "Outcome" => [0i64, 1, 0],
        ]
        .unwrap();

        let (cleaned, report) = DataCleaner::default().clean(&df).unwrap();

        assert_eq!(report.missing_before, 1);
        assert_eq!(report.imputations.len(), 1);
        assert_eq!(
            f64_column(&cleaned, "Glucose"),
            vec![Some(90.5), Some(95.5), Some(100.5)]
        );
        assert_eq!(
            missing_count(cleaned.column("Glucose").unwrap().as_materialized_series()),
            0
        );
    }

    #[test]
    fn test_clean_mode_fills_boolean() {
        let df = df![
            "smoker" => [Some(true), None, Some(false), Some(true)],
            "Outcome" => [0i64, 1, 0, 1],
        ]
        .unwrap();

        let (cleaned, report) = DataCleaner::default().clean(&df).unwrap();

        let smoker = cleaned.column("smoker").unwrap();
        assert_eq!(smoker.dtype(), &DataType::Boolean);
        assert_eq!(smoker.null_count(), 0);
        assert_eq!(report.imputations[0].method, ImputationMethod::Mode);
    }

    #[test]
    fn test_dedup_runs_after_imputation() {
        // Row 2 only equals row 0 once its missing BMI takes the median (25)
        let df = df![
            "BMI" => [Some(25.0), Some(20.0), None, Some(30.0)],
            "Outcome" => [1i64, 0, 1, 0],
        ]
        .unwrap();

        let (cleaned, report) = DataCleaner::default().clean(&df).unwrap();

        assert_eq!(report.duplicates_removed, 1);
        assert_eq!(
            f64_column(&cleaned, "BMI"),
            vec![Some(25.0), Some(20.0), Some(30.0)]
        );
    }

    #[test]
    fn test_dedup_keeps_first_occurrence_in_order() {
        let df = df![
            "a" => [3i64, 1, 3, 2, 1],
            "b" => ["x", "y", "x", "z", "y"],
        ]
        .unwrap();

        let (cleaned, _) = DataCleaner::default().clean(&df).unwrap();

        assert_eq!(
            f64_column(&cleaned, "a"),
            vec![Some(3.0), Some(1.0), Some(2.0)]
        );
    }

    #[test]
    fn test_clean_is_idempotent() {
        let df = df![
            "Glucose" => [Some(90.0), None, Some(120.0), Some(90.0)],
            "sex" => [Some("M"), Some("F"), None, Some("M")],
            "Outcome" => [0i64, 1, 1, 0],
        ]
        .unwrap();

        let cleaner = DataCleaner::default();
        let (once, _) = cleaner.clean(&df).unwrap();
        let (twice, report) = cleaner.clean(&once).unwrap();

        assert!(once.equals(&twice));
        assert!(report.imputations.is_empty());
        assert_eq!(report.duplicates_removed, 0);
    }

    #[test]
    fn test_remove_duplicates_disabled() {
        let df = df![
            "a" => [1i64, 1],
        ]
        .unwrap();

        let (cleaned, report) = DataCleaner::new(false).clean(&df).unwrap();
        assert_eq!(cleaned.height(), 2);
        assert_eq!(report.duplicates_removed, 0);
    }
}

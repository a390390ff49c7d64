//! Statistical imputation methods.
//!
//! Provides median imputation for numeric columns and mode imputation for
//! categorical columns.

use crate::types::{ImputationMethod, ImputationRecord};
use crate::utils::{missing_count, string_mode};
use anyhow::Result;
use polars::prelude::*;
use tracing::debug;

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Replace missing cells (null or NaN) of a numeric column with its median.
    ///
    /// The filled column is `Float64`. Columns without missing cells, and
    /// columns with no observed values, are left untouched.
    pub fn apply_numeric_median(
        df: &mut DataFrame,
        col_name: &str,
        records: &mut Vec<ImputationRecord>,
    ) -> Result<()> {
        let Ok(column) = df.column(col_name) else {
            return Ok(());
        };
        let series = column.as_materialized_series().cast(&DataType::Float64)?;
        let missing = missing_count(&series);
        if missing == 0 {
            return Ok(());
        }

        let observed = series.filter(&!series.is_nan()?)?;
        let Some(median_val) = observed.median() else {
            debug!("'{}' has no observed values, skipping median fill", col_name);
            return Ok(());
        };

        *df = df
            .clone()
            .lazy()
            .with_column(
                col(col_name)
                    .cast(DataType::Float64)
                    .fill_nan(lit(median_val))
                    .fill_null(lit(median_val)),
            )
            .collect()?;

        records.push(ImputationRecord {
            column: col_name.to_string(),
            method: ImputationMethod::Median,
            filled_cells: missing,
            fill_value: format!("{:.2}", median_val),
        });
        debug!("Filled '{}' with median: {:.2}", col_name, median_val);

        Ok(())
    }

    /// Replace missing cells of a categorical or boolean column with its mode.
    ///
    /// Boolean columns keep their dtype; text columns come back as `String`.
    pub fn apply_mode_imputation(
        df: &mut DataFrame,
        col_name: &str,
        records: &mut Vec<ImputationRecord>,
    ) -> Result<()> {
        let Ok(column) = df.column(col_name) else {
            return Ok(());
        };
        let series = column.as_materialized_series();
        let missing = series.null_count();
        if missing == 0 {
            return Ok(());
        }

        let Some(mode_val) = string_mode(series) else {
            debug!("'{}' has no observed values, skipping mode fill", col_name);
            return Ok(());
        };

        let filled = match series.dtype() {
            DataType::Boolean => col(col_name).fill_null(lit(mode_val == "true")),
            _ => col(col_name)
                .cast(DataType::String)
                .fill_null(lit(mode_val.as_str())),
        };
        *df = df.clone().lazy().with_column(filled).collect()?;

        records.push(ImputationRecord {
            column: col_name.to_string(),
            method: ImputationMethod::Mode,
            filled_cells: missing,
            fill_value: mode_val.clone(),
        });
        debug!("Filled '{}' with mode: '{}'", col_name, mode_val);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::text_values;
    use pretty_assertions::assert_eq;

    // ========================================================================
    // apply_numeric_median() tests
    // ========================================================================

    #[test]
    fn test_apply_numeric_median_basic() {
        let mut df = df![
            "values" => [Some(1.0), None, Some(3.0), None, Some(5.0)],
        ]
        .unwrap();
        let mut records = Vec::new();

        StatisticalImputer::apply_numeric_median(&mut df, "values", &mut records).unwrap();

        let values = df.column("values").unwrap();
        assert_eq!(values.null_count(), 0);
        assert_eq!(values.get(1).unwrap().try_extract::<f64>().unwrap(), 3.0);
        assert_eq!(values.get(3).unwrap().try_extract::<f64>().unwrap(), 3.0);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].method, ImputationMethod::Median);
        assert_eq!(records[0].filled_cells, 2);
        assert_eq!(records[0].fill_value, "3.00");
    }

    #[test]
    fn test_apply_numeric_median_integer_column() {
        let mut df = df![
            "Insulin" => [Some(10i64), Some(20), None, Some(40), Some(50)],
        ]
        .unwrap();
        let mut records = Vec::new();

        StatisticalImputer::apply_numeric_median(&mut df, "Insulin", &mut records).unwrap();

        let insulin = df.column("Insulin").unwrap();
        assert_eq!(insulin.dtype(), &DataType::Float64);
        // Median of [10, 20, 40, 50] = 30
        assert_eq!(insulin.get(2).unwrap().try_extract::<f64>().unwrap(), 30.0);
    }

    #[test]
    fn test_apply_numeric_median_no_nulls_untouched() {
        let mut df = df![
            "values" => [1i64, 2, 3],
        ]
        .unwrap();
        let mut records = Vec::new();

        StatisticalImputer::apply_numeric_median(&mut df, "values", &mut records).unwrap();

        assert!(records.is_empty());
        assert_eq!(df.column("values").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_apply_numeric_median_all_nulls() {
        let mut df = df![
            "values" => [Option::<f64>::None, None, None],
        ]
        .unwrap();
        let mut records = Vec::new();

        StatisticalImputer::apply_numeric_median(&mut df, "values", &mut records).unwrap();

        assert!(records.is_empty());
        assert_eq!(df.column("values").unwrap().null_count(), 3);
    }

    #[test]
    fn test_apply_numeric_median_fills_nan() {
        let mut df = df![
            "Glucose" => [Some(90.5), Some(f64::NAN), None, Some(100.5), Some(95.0)],
        ]
        .unwrap();
        let mut records = Vec::new();

        StatisticalImputer::apply_numeric_median(&mut df, "Glucose", &mut records).unwrap();

        let glucose = df.column("Glucose").unwrap().as_materialized_series();
        assert_eq!(missing_count(glucose), 0);
        // Median of [90.5, 95.0, 100.5]
        assert_eq!(glucose.get(1).unwrap().try_extract::<f64>().unwrap(), 95.0);
        assert_eq!(glucose.get(2).unwrap().try_extract::<f64>().unwrap(), 95.0);
        assert_eq!(records[0].filled_cells, 2);
    }

    #[test]
    fn test_apply_numeric_median_nonexistent_column() {
        let mut df = df![
            "other" => [1.0, 2.0, 3.0],
        ]
        .unwrap();
        let mut records = Vec::new();

        StatisticalImputer::apply_numeric_median(&mut df, "values", &mut records).unwrap();
        assert!(records.is_empty());
    }

    // ========================================================================
    // apply_mode_imputation() tests
    // ========================================================================

    #[test]
    fn test_apply_mode_imputation_basic() {
        let mut df = df![
            "sex" => [Some("M"), Some("F"), Some("M"), None, Some("M")],
        ]
        .unwrap();
        let mut records = Vec::new();

        StatisticalImputer::apply_mode_imputation(&mut df, "sex", &mut records).unwrap();

        let values = text_values(df.column("sex").unwrap().as_materialized_series()).unwrap();
        assert_eq!(values[3].as_deref(), Some("M"));
        assert_eq!(records[0].method, ImputationMethod::Mode);
        assert_eq!(records[0].fill_value, "M");
    }

    #[test]
    fn test_apply_mode_imputation_tie_breaking() {
        let mut df = df![
            "smoker" => [Some("no"), Some("yes"), None, Some("yes"), Some("no")],
        ]
        .unwrap();
        let mut records = Vec::new();

        StatisticalImputer::apply_mode_imputation(&mut df, "smoker", &mut records).unwrap();

        // "no" and "yes" both appear twice, "no" was seen first
        let values = text_values(df.column("smoker").unwrap().as_materialized_series()).unwrap();
        assert_eq!(values[2].as_deref(), Some("no"));
    }

    #[test]
    fn test_apply_mode_imputation_boolean_keeps_dtype() {
        let mut df = df![
            "smoker" => [Some(true), None, Some(false), Some(true)],
        ]
        .unwrap();
        let mut records = Vec::new();

        StatisticalImputer::apply_mode_imputation(&mut df, "smoker", &mut records).unwrap();

        let smoker = df.column("smoker").unwrap();
        assert_eq!(smoker.dtype(), &DataType::Boolean);
        assert_eq!(smoker.null_count(), 0);
        assert_eq!(smoker.get(1).unwrap(), AnyValue::Boolean(true));
        assert_eq!(records[0].fill_value, "true");
    }

    #[test]
    fn test_apply_mode_imputation_no_nulls() {
        let mut df = df![
            "sex" => ["M", "F"],
        ]
        .unwrap();
        let mut records = Vec::new();

        StatisticalImputer::apply_mode_imputation(&mut df, "sex", &mut records).unwrap();
        assert!(records.is_empty());
    }
}

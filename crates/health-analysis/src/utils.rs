//! Shared utilities for the analysis pipeline.
//!
//! This module contains the column helpers used by the cleaner, the
//! profiler and the risk analyzer, so that every stage agrees on what
//! counts as numeric, missing or duplicated.

use polars::prelude::*;
use std::collections::HashMap;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a data type for analysis purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// String, categorical text or boolean flags
    Categorical,
    /// Dates and anything else
    Other,
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if matches!(
        dtype,
        DataType::String | DataType::Categorical(_, _) | DataType::Boolean
    ) {
        DtypeCategory::Categorical
    } else {
        DtypeCategory::Other
    }
}

/// Names of the numeric columns, in table order.
pub fn numeric_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| is_numeric_dtype(col.dtype()))
        .map(|col| col.name().to_string())
        .collect()
}

/// Names of the categorical (text) columns, in table order.
pub fn categorical_column_names(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|col| get_dtype_category(col.dtype()) == DtypeCategory::Categorical)
        .map(|col| col.name().to_string())
        .collect()
}

// =============================================================================
// Value Extraction
// =============================================================================

/// Values of a Series as `f64`; nulls and NaN become `None`.
pub fn numeric_values(series: &Series) -> PolarsResult<Vec<Option<f64>>> {
    let casted = series.cast(&DataType::Float64)?;
    Ok(casted
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

/// Values of a Series coerced to text; nulls become `None`.
pub fn text_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let casted = series.cast(&DataType::String)?;
    Ok(casted
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Missing cells of a Series: nulls, plus NaN in float columns.
pub fn missing_count(series: &Series) -> usize {
    let nan_count = match series.dtype() {
        DataType::Float32 | DataType::Float64 => {
            series.is_nan().map(|mask| mask.num_trues()).unwrap_or(0)
        }
        _ => 0,
    };
    series.null_count() + nan_count
}

/// Total number of missing cells in a DataFrame.
pub fn total_missing_count(df: &DataFrame) -> usize {
    df.get_columns()
        .iter()
        .map(|col| missing_count(col.as_materialized_series()))
        .sum()
}

// =============================================================================
// Series Statistics Utilities
// =============================================================================

/// Most frequent non-null value of a Series, as text.
///
/// Ties go to the value encountered first.
pub fn string_mode(series: &Series) -> Option<String> {
    let values = text_values(series).ok()?;

    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (position, value) in values.into_iter().flatten().enumerate() {
        counts.entry(value).or_insert((0, position)).0 += 1;
    }

    counts
        .into_iter()
        .max_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_a.cmp(count_b).then(first_b.cmp(first_a))
        })
        .map(|(value, _)| value)
}

// =============================================================================
// Row Utilities
// =============================================================================

/// Drop rows that repeat an earlier row, keeping the first and the row order.
pub fn drop_duplicate_rows(df: &DataFrame) -> PolarsResult<DataFrame> {
    df.unique_stable(None, UniqueKeepStrategy::First, None)
}

/// Number of rows that repeat an earlier row.
pub fn count_duplicates(df: &DataFrame) -> PolarsResult<usize> {
    Ok(df.height() - drop_duplicate_rows(df)?.height())
}

/// Format a byte count as megabytes with two decimals.
pub fn format_megabytes(bytes: usize) -> String {
    format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_dtype_category() {
        assert_eq!(get_dtype_category(&DataType::Int32), DtypeCategory::Numeric);
        assert_eq!(
            get_dtype_category(&DataType::String),
            DtypeCategory::Categorical
        );
        assert_eq!(
            get_dtype_category(&DataType::Boolean),
            DtypeCategory::Categorical
        );
        assert_eq!(get_dtype_category(&DataType::Date), DtypeCategory::Other);
    }

    #[test]
    fn test_column_partitions() {
        let df = df![
            "age" => [40i64, 50],
            "sex" => ["M", "F"],
            "bmi" => [22.5, 30.1],
        ]
        .unwrap();
        assert_eq!(numeric_column_names(&df), vec!["age", "bmi"]);
        assert_eq!(categorical_column_names(&df), vec!["sex"]);
    }

    #[test]
    fn test_string_mode() {
        let series = Series::new("test".into(), &["a", "b", "a", "c", "a"]);
        assert_eq!(string_mode(&series), Some("a".to_string()));
    }

    #[test]
    fn test_string_mode_tie_prefers_first_seen() {
        let series = Series::new("test".into(), &[Some("b"), None, Some("a"), Some("a"), Some("b")]);
        assert_eq!(string_mode(&series), Some("b".to_string()));
    }

    #[test]
    fn test_string_mode_all_null() {
        let series = Series::new("test".into(), &[Option::<&str>::None, None]);
        assert_eq!(string_mode(&series), None);
    }

    #[test]
    fn test_missing_count_includes_nan() {
        let floats = Series::new("bmi".into(), &[Some(22.5), Some(f64::NAN), None, Some(30.1)]);
        assert_eq!(missing_count(&floats), 2);

        let ints = Series::new("age".into(), &[Some(40i64), None]);
        assert_eq!(missing_count(&ints), 1);

        let df = df![
            "bmi" => [Some(22.5), Some(f64::NAN)],
            "sex" => [None, Some("F")],
        ]
        .unwrap();
        assert_eq!(total_missing_count(&df), 2);
    }

    #[test]
    fn test_drop_duplicate_rows_keeps_first_in_order() {
        let df = df![
            "Glucose" => [90i64, 200, 90, 90],
            "Outcome" => [0i64, 1, 0, 1],
        ]
        .unwrap();

        let deduped = drop_duplicate_rows(&df).unwrap();
        let expected = df![
            "Glucose" => [90i64, 200, 90],
            "Outcome" => [0i64, 1, 1],
        ]
        .unwrap();
        assert!(deduped.equals(&expected));
        assert_eq!(count_duplicates(&df).unwrap(), 1);
    }

    #[test]
    fn test_count_duplicates_treats_nulls_as_equal() {
        let df = df![
            "a" => [Some(1i64), None, None],
        ]
        .unwrap();
        assert_eq!(count_duplicates(&df).unwrap(), 1);
    }

    #[test]
    fn test_format_megabytes() {
        assert_eq!(format_megabytes(0), "0.00 MB");
        assert_eq!(format_megabytes(1024 * 1024 * 3 / 2), "1.50 MB");
    }
}

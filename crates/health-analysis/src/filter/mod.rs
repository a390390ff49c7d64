//! Row filters applied to a cleaned table.
//!
//! Filters run in a fixed order: age range, then sex, then free-text search.
//! A filter whose column is absent is skipped.
//!
//! The age and sex filters select the population every statistic is computed
//! on. The search only narrows the rows shown and exported.

use crate::error::Result;
use crate::utils::{numeric_values, text_values};
use polars::prelude::*;
use tracing::debug;

/// Row filter over the age, sex and free-text dimensions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataFilter {
    /// Inclusive bounds on the age column.
    pub age_range: Option<(f64, f64)>,
    /// Accepted values of the sex column; empty accepts everything.
    pub sexes: Vec<String>,
    /// Case-insensitive substring searched in every cell.
    pub search: Option<String>,
}

impl DataFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn age_range(mut self, min: f64, max: f64) -> Self {
        self.age_range = Some((min, max));
        self
    }

    pub fn sexes<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sexes = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.search = if text.trim().is_empty() {
            None
        } else {
            Some(text)
        };
        self
    }

    pub fn is_empty(&self) -> bool {
        self.age_range.is_none() && self.sexes.is_empty() && self.search.is_none()
    }

    /// Apply every configured filter, returning the kept rows in order.
    pub fn apply(&self, df: &DataFrame) -> Result<DataFrame> {
        self.apply_search(&self.apply_demographics(df)?)
    }

    /// Apply the age and sex filters.
    pub fn apply_demographics(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut df = df.clone();

        if let Some((min, max)) = self.age_range
            && let Some(column) = find_column(&df, &["age"])
        {
            let values = numeric_values(df.column(&column)?.as_materialized_series())?;
            let keep: Vec<bool> = values
                .iter()
                .map(|v| v.is_some_and(|v| v >= min && v <= max))
                .collect();
            df = filter_rows(&df, &keep)?;
            debug!("Age filter on '{}' kept {} rows", column, df.height());
        }

        if !self.sexes.is_empty()
            && let Some(column) = find_column(&df, &["gender", "sex"])
        {
            let values = text_values(df.column(&column)?.as_materialized_series())?;
            let keep: Vec<bool> = values
                .iter()
                .map(|cell| {
                    cell.as_deref()
                        .is_some_and(|cell| self.sexes.iter().any(|s| same_value(cell, s)))
                })
                .collect();
            df = filter_rows(&df, &keep)?;
            debug!("Sex filter on '{}' kept {} rows", column, df.height());
        }

        Ok(df)
    }

    /// Apply the free-text search: keep rows where any cell, as text,
    /// contains the search term ignoring case.
    pub fn apply_search(&self, df: &DataFrame) -> Result<DataFrame> {
        let mut df = df.clone();

        if let Some(needle) = &self.search {
            let needle = needle.to_lowercase();
            let mut keep = vec![false; df.height()];
            for col in df.get_columns() {
                let values = text_values(col.as_materialized_series())?;
                for (row, cell) in values.iter().enumerate() {
                    if let Some(cell) = cell
                        && cell.to_lowercase().contains(&needle)
                    {
                        keep[row] = true;
                    }
                }
            }
            df = filter_rows(&df, &keep)?;
            debug!("Search '{}' kept {} rows", needle, df.height());
        }

        Ok(df)
    }
}

/// First column whose lowercase name contains any of `needles`.
fn find_column(df: &DataFrame, needles: &[&str]) -> Option<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .find(|name| {
            let lower = name.to_lowercase();
            needles.iter().any(|needle| lower.contains(needle))
        })
}

/// Text equality that treats "1" and "1.0" as the same value.
fn same_value(cell: &str, wanted: &str) -> bool {
    if cell == wanted {
        return true;
    }
    match (cell.trim().parse::<f64>(), wanted.trim().parse::<f64>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn filter_rows(df: &DataFrame, keep: &[bool]) -> PolarsResult<DataFrame> {
    let mask = BooleanChunked::from_slice("keep".into(), keep);
    df.filter(&mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn heart_df() -> DataFrame {
        df![
            "age" => [29i64, 45, 54, 63, 71],
            "sex" => [1i64, 0, 1, 1, 0],
            "cp" => ["typical", "atypical", "typical", "asymptomatic", "typical"],
            "target" => [0i64, 1, 1, 0, 1],
        ]
        .unwrap()
    }

    fn ages(df: &DataFrame) -> Vec<Option<f64>> {
        numeric_values(df.column("age").unwrap().as_materialized_series()).unwrap()
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let filter = DataFilter::new();
        assert!(filter.is_empty());
        assert!(filter.apply(&heart_df()).unwrap().equals(&heart_df()));
    }

    #[test]
    fn test_age_range_inclusive() {
        let filtered = DataFilter::new().age_range(45.0, 63.0).apply(&heart_df()).unwrap();
        assert_eq!(ages(&filtered), vec![Some(45.0), Some(54.0), Some(63.0)]);
    }

    #[test]
    fn test_sex_filter_compares_as_text() {
        let filtered = DataFilter::new().sexes(["0"]).apply(&heart_df()).unwrap();
        assert_eq!(ages(&filtered), vec![Some(45.0), Some(71.0)]);

        let filtered = DataFilter::new().sexes(["1.0"]).apply(&heart_df()).unwrap();
        assert_eq!(filtered.height(), 3);
    }

    #[test]
    fn test_gender_column_detected() {
        let df = df![
            "Gender" => ["Female", "Male", "Female"],
            "BMI" => [22.0, 31.0, 27.5],
        ]
        .unwrap();
        let filtered = DataFilter::new().sexes(["Female"]).apply(&df).unwrap();
        assert_eq!(filtered.height(), 2);
    }

    #[test]
    fn test_search_is_case_insensitive_across_columns() {
        let filtered = DataFilter::new().search("TYPICAL").apply(&heart_df()).unwrap();
        // "atypical" contains "typical" too
        assert_eq!(filtered.height(), 4);

        let filtered = DataFilter::new().search("63").apply(&heart_df()).unwrap();
        assert_eq!(ages(&filtered), vec![Some(63.0)]);
    }

    #[test]
    fn test_blank_search_ignored() {
        assert!(DataFilter::new().search("  ").is_empty());
    }

    #[test]
    fn test_filters_compose_in_order() {
        let filtered = DataFilter::new()
            .age_range(40.0, 80.0)
            .sexes(["1"])
            .search("typical")
            .apply(&heart_df())
            .unwrap();
        assert_eq!(ages(&filtered), vec![Some(54.0)]);
    }

    #[test]
    fn test_demographics_ignore_search() {
        let filter = DataFilter::new().sexes(["1"]).search("no-such-text");

        let population = filter.apply_demographics(&heart_df()).unwrap();
        let shown = filter.apply_search(&population).unwrap();

        assert!(population.height() > 0);
        assert_eq!(shown.height(), 0);
    }

    #[test]
    fn test_missing_age_column_skips_filter() {
        let df = df!["Glucose" => [90i64, 200]].unwrap();
        let filtered = DataFilter::new().age_range(0.0, 1.0).apply(&df).unwrap();
        assert_eq!(filtered.height(), 2);
    }
}

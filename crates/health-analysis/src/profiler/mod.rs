//! Data profiling module.
//!
//! This module summarizes a table:
//! - Headline counts (records, features, missing cells, duplicates, memory)
//! - Per-column dtype and completeness
//! - Descriptive statistics of numeric columns, optionally split by group
//! - Histograms and box-plot summaries

pub(crate) mod statistics;

use crate::types::{
    BoxPlotSummary, ColumnInfo, DatasetSummary, Distribution, GroupSummary, NumericSummary,
};
use crate::utils::{
    count_duplicates, format_megabytes, missing_count, numeric_column_names, numeric_values,
    text_values, total_missing_count,
};
use anyhow::Result;
use polars::prelude::*;
use statistics::{box_plot, build_histogram, describe_values};
use std::collections::HashMap;

/// Number of rows in the head preview.
pub const PREVIEW_ROWS: usize = 5;

/// Data profiler for summarizing a table.
pub struct DataProfiler;

impl DataProfiler {
    /// Headline counts for a table.
    pub fn summarize(df: &DataFrame) -> Result<DatasetSummary> {
        let memory_bytes = df.estimated_size();
        Ok(DatasetSummary {
            total_records: df.height(),
            total_features: df.width(),
            missing_values: total_missing_count(df),
            duplicate_records: count_duplicates(df)?,
            memory_bytes,
            memory_usage: format_megabytes(memory_bytes),
        })
    }

    /// Dtype, non-null and null counts for every column. NaN counts as null.
    pub fn column_info(df: &DataFrame) -> Vec<ColumnInfo> {
        df.get_columns()
            .iter()
            .map(|col| {
                let missing = missing_count(col.as_materialized_series());
                ColumnInfo {
                    name: col.name().to_string(),
                    dtype: format!("{}", col.dtype()),
                    non_null_count: col.len() - missing,
                    null_count: missing,
                }
            })
            .collect()
    }

    /// The first rows of the table.
    pub fn preview(df: &DataFrame) -> DataFrame {
        df.head(Some(PREVIEW_ROWS))
    }

    /// Descriptive statistics for every numeric column with observed values.
    pub fn describe(df: &DataFrame) -> Result<Vec<NumericSummary>> {
        let mut summaries = Vec::new();
        for name in numeric_column_names(df) {
            let values = Self::observed_values(df, &name)?;
            if let Some(summary) = describe_values(&name, &values) {
                summaries.push(summary);
            }
        }
        Ok(summaries)
    }

    /// Descriptive statistics of `column` for each distinct value of `group_by`.
    ///
    /// Groups are ordered by their first appearance.
    pub fn describe_by_group(
        df: &DataFrame,
        column: &str,
        group_by: &str,
    ) -> Result<Vec<GroupSummary>> {
        let values = numeric_values(df.column(column)?.as_materialized_series())?;
        let groups = text_values(df.column(group_by)?.as_materialized_series())?;

        let mut order: Vec<String> = Vec::new();
        let mut grouped: HashMap<String, Vec<f64>> = HashMap::new();
        for (value, group) in values.into_iter().zip(groups) {
            let (Some(value), Some(group)) = (value, group) else {
                continue;
            };
            if !grouped.contains_key(&group) {
                order.push(group.clone());
            }
            grouped.entry(group).or_default().push(value);
        }

        Ok(order
            .into_iter()
            .filter_map(|group| {
                let stats = describe_values(column, grouped.get(&group)?)?;
                Some(GroupSummary {
                    outcome_value: group,
                    stats,
                })
            })
            .collect())
    }

    /// Histogram of each of `columns`.
    pub fn distributions(df: &DataFrame, columns: &[String], bins: usize) -> Result<Vec<Distribution>> {
        columns
            .iter()
            .map(|name| {
                let values = Self::observed_values(df, name)?;
                Ok(Distribution {
                    column: name.clone(),
                    bins: build_histogram(&values, bins),
                })
            })
            .collect()
    }

    /// Box-plot summary of each of `columns`.
    pub fn box_plots(df: &DataFrame, columns: &[String]) -> Result<Vec<BoxPlotSummary>> {
        let mut summaries = Vec::new();
        for name in columns {
            let values = Self::observed_values(df, name)?;
            if let Some(summary) = box_plot(name, &values) {
                summaries.push(summary);
            }
        }
        Ok(summaries)
    }

    fn observed_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
        let series = df.column(name)?.as_materialized_series();
        Ok(numeric_values(series)?.into_iter().flatten().collect())
    }
}

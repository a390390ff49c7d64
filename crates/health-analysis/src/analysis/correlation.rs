//! Pairwise Pearson correlation.

use crate::types::CorrelationMatrix;
use crate::utils::{numeric_column_names, numeric_values};
use anyhow::Result;
use polars::prelude::*;

/// Pearson correlation over pairwise-complete observations.
///
/// Returns `None` for fewer than two shared observations or when either
/// side has zero variance.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> Option<f64> {
    let x: Float64Chunked = x.iter().copied().collect();
    let y: Float64Chunked = y.iter().copied().collect();

    let r = cov::pearson_corr(&x, &y)?;
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Correlation matrix over every numeric column of the table.
///
/// The matrix is symmetric and its diagonal is exactly 1.0 for columns
/// with non-zero variance.
pub fn correlation_matrix(df: &DataFrame) -> Result<CorrelationMatrix> {
    let columns = numeric_column_names(df);

    let mut series_values: Vec<Vec<Option<f64>>> = Vec::with_capacity(columns.len());
    for name in &columns {
        series_values.push(numeric_values(df.column(name)?.as_materialized_series())?);
    }

    let size = columns.len();
    let mut values = vec![vec![None; size]; size];

    for i in 0..size {
        for j in i..size {
            if i == j {
                values[i][j] = pearson(&series_values[i], &series_values[i]).map(|_| 1.0);
                continue;
            }
            let r = pearson(&series_values[i], &series_values[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix { columns, values })
}

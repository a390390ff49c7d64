//! Seeded synthetic diabetes data.
//!
//! Produces a table with the Pima diabetes columns, used when no real
//! dataset can be downloaded.

use crate::error::{AnalysisError, Result};
use polars::prelude::*;
use rand::prelude::*;
use rand_distr::{Binomial, Exp, Normal, Poisson};
use std::fs::{self, File};
use std::path::Path;
use tracing::info;

pub const DEFAULT_ROWS: usize = 1000;
pub const DEFAULT_SEED: u64 = 42;

/// Column names of the diabetes dataset, in file order.
pub const DIABETES_COLUMNS: [&str; 9] = [
    "Pregnancies",
    "Glucose",
    "BloodPressure",
    "SkinThickness",
    "Insulin",
    "BMI",
    "DiabetesPedigreeFunction",
    "Age",
    "Outcome",
];

/// Generator for a synthetic diabetes table.
///
/// The same seed always yields the same table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticGenerator {
    rows: usize,
    seed: u64,
}

impl Default for SyntheticGenerator {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            seed: DEFAULT_SEED,
        }
    }
}

impl SyntheticGenerator {
    pub fn new(rows: usize, seed: u64) -> Self {
        Self { rows, seed }
    }

    pub fn generate(&self) -> Result<DataFrame> {
        if self.rows == 0 {
            return Err(AnalysisError::InvalidConfig(
                "synthetic row count must be at least 1".to_string(),
            ));
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let n = self.rows;

        let pregnancies = Poisson::new(3.0).map_err(invalid)?;
        let pregnancies: Vec<i64> = (0..n)
            .map(|_| pregnancies.sample(&mut rng) as i64)
            .collect();

        let glucose = normal_clipped(&mut rng, n, 120.0, 30.0, (50.0, 300.0))?;
        let blood_pressure = normal_clipped(&mut rng, n, 80.0, 15.0, (50.0, 120.0))?;
        let skin_thickness = normal_clipped(&mut rng, n, 25.0, 10.0, (0.0, 50.0))?;
        let insulin = normal_clipped(&mut rng, n, 150.0, 100.0, (0.0, 500.0))?;
        let bmi = normal_clipped(&mut rng, n, 30.0, 8.0, (15.0, 50.0))?;

        // Rate 2.0 gives a mean of 0.5
        let pedigree = Exp::new(2.0).map_err(invalid)?;
        let pedigree: Vec<f64> = (0..n).map(|_| pedigree.sample(&mut rng)).collect();

        let age: Vec<i64> = (0..n).map(|_| rng.gen_range(20..80)).collect();

        let outcome = Binomial::new(1, 0.35).map_err(invalid)?;
        let outcome: Vec<i64> = (0..n).map(|_| outcome.sample(&mut rng) as i64).collect();

        let df = DataFrame::new(vec![
            Column::new(DIABETES_COLUMNS[0].into(), pregnancies),
            Column::new(DIABETES_COLUMNS[1].into(), glucose),
            Column::new(DIABETES_COLUMNS[2].into(), blood_pressure),
            Column::new(DIABETES_COLUMNS[3].into(), skin_thickness),
            Column::new(DIABETES_COLUMNS[4].into(), insulin),
            Column::new(DIABETES_COLUMNS[5].into(), bmi),
            Column::new(DIABETES_COLUMNS[6].into(), pedigree),
            Column::new(DIABETES_COLUMNS[7].into(), age),
            Column::new(DIABETES_COLUMNS[8].into(), outcome),
        ])?;

        Ok(df)
    }

    /// Generate the table and write it as CSV to `path`.
    pub fn write_csv(&self, path: &Path) -> Result<DataFrame> {
        let mut df = self.generate()?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut file = File::create(path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)?;

        info!(
            "Sample diabetes dataset created: {} ({} rows)",
            path.display(),
            df.height()
        );
        Ok(df)
    }
}

fn normal_clipped(
    rng: &mut StdRng,
    n: usize,
    mean: f64,
    std_dev: f64,
    (low, high): (f64, f64),
) -> Result<Vec<f64>> {
    let normal = Normal::new(mean, std_dev).map_err(invalid)?;
    Ok((0..n)
        .map(|_| normal.sample(rng).clamp(low, high))
        .collect())
}

fn invalid(e: impl std::fmt::Display) -> AnalysisError {
    AnalysisError::InvalidConfig(e.to_string())
}

//! Sample dataset downloads.
//!
//! Fetches the Pima Indians diabetes data and the Cleveland heart-disease
//! data, both published without a header row, and writes them as
//! `diabetes.csv` and `heart_disease.csv`. When the diabetes download fails
//! a synthetic table is written in its place.

use crate::error::{AnalysisError, Result};
use crate::synthetic::{DIABETES_COLUMNS, SyntheticGenerator};
use crate::types::DatasetKind;
use polars::prelude::*;
use reqwest::blocking::Client;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Default timeout for download requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const HEART_DISEASE_COLUMNS: [&str; 14] = [
    "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang", "oldpeak",
    "slope", "ca", "thal", "target",
];

/// A remote header-less CSV and where it goes.
#[derive(Debug, Clone, Copy)]
pub struct DatasetSource {
    pub kind: DatasetKind,
    pub url: &'static str,
    pub file_name: &'static str,
    pub columns: &'static [&'static str],
}

pub const DIABETES_SOURCE: DatasetSource = DatasetSource {
    kind: DatasetKind::Diabetes,
    url: "https://raw.githubusercontent.com/jbrownlee/Datasets/master/pima-indians-diabetes.csv",
    file_name: "diabetes.csv",
    columns: &DIABETES_COLUMNS,
};

pub const HEART_DISEASE_SOURCE: DatasetSource = DatasetSource {
    kind: DatasetKind::HeartDisease,
    url: "https://archive.ics.uci.edu/ml/machine-learning-databases/heart-disease/processed.cleveland.data",
    file_name: "heart_disease.csv",
    columns: &HEART_DISEASE_COLUMNS,
};

/// How each dataset was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DownloadStatus {
    Downloaded { path: PathBuf, rows: usize },
    Synthetic { path: PathBuf, rows: usize },
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct DownloadSummary {
    pub diabetes: DownloadStatus,
    pub heart_disease: DownloadStatus,
}

/// Downloads sample datasets into a directory.
pub struct Downloader {
    client: Client,
    data_dir: PathBuf,
}

impl Downloader {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            data_dir: data_dir.into(),
        })
    }

    /// Fetch one dataset and parse it into a table.
    pub fn fetch(&self, source: &DatasetSource) -> Result<DataFrame> {
        info!("Downloading {} dataset...", source.kind.display_name());

        let response = self.client.get(source.url).send()?;
        if !response.status().is_success() {
            return Err(AnalysisError::DownloadFailed {
                name: source.file_name.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        parse_headerless(&response.text()?, source.columns)
    }

    /// Fetch one dataset and write it into the data directory.
    pub fn download(&self, source: &DatasetSource) -> Result<(PathBuf, usize)> {
        let mut df = self.fetch(source)?;
        fs::create_dir_all(&self.data_dir)?;
        let path = self.data_dir.join(source.file_name);

        let mut file = File::create(&path)?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)?;

        info!(
            "{} dataset downloaded: {} rows x {} columns",
            source.kind.display_name(),
            df.height(),
            df.width()
        );
        Ok((path, df.height()))
    }

    /// Download both datasets, substituting synthetic diabetes data when
    /// that download fails.
    pub fn download_all(&self) -> Result<DownloadSummary> {
        let diabetes = match self.download(&DIABETES_SOURCE) {
            Ok((path, rows)) => DownloadStatus::Downloaded { path, rows },
            Err(e) => {
                warn!("Error downloading diabetes dataset: {}", e);
                let path = self.data_dir.join(DIABETES_SOURCE.file_name);
                let df = SyntheticGenerator::default().write_csv(&path)?;
                DownloadStatus::Synthetic {
                    path,
                    rows: df.height(),
                }
            }
        };

        let heart_disease = match self.download(&HEART_DISEASE_SOURCE) {
            Ok((path, rows)) => DownloadStatus::Downloaded { path, rows },
            Err(e) => {
                warn!("Error downloading heart disease dataset: {}", e);
                DownloadStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };

        Ok(DownloadSummary {
            diabetes,
            heart_disease,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

/// Parse header-less CSV text, naming the columns and reading `?` as missing.
pub fn parse_headerless(text: &str, columns: &[&str]) -> Result<DataFrame> {
    let null_values = NullValues::AllColumns(vec!["?".into()]);
    let mut df = CsvReadOptions::default()
        .with_has_header(false)
        .with_infer_schema_length(None)
        .with_parse_options(CsvParseOptions::default().with_null_values(Some(null_values)))
        .into_reader_with_file_handle(Cursor::new(text.as_bytes().to_vec()))
        .finish()?;

    if df.width() != columns.len() {
        return Err(AnalysisError::DownloadFailed {
            name: columns.join(","),
            reason: format!(
                "expected {} columns, found {}",
                columns.len(),
                df.width()
            ),
        });
    }

    df.set_column_names(columns.iter().copied())?;
    Ok(df)
}

//! Dataset loading.
//!
//! This module provides functionality for:
//! - Probing the candidate dataset files in order
//! - Reading a CSV file into a DataFrame
//! - Tagging the table with the dataset kind
//! - Caching loaded tables keyed by file path

mod cache;

pub use cache::DatasetCache;

use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use crate::types::DatasetKind;
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Values read as missing in addition to empty fields.
///
/// The usual spreadsheet and dataframe spellings of "missing", plus `?`
/// used by the UCI heart-disease files.
pub const NULL_MARKERS: [&str; 19] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null", "?",
];

/// A loaded table with its provenance.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub kind: DatasetKind,
    pub source: PathBuf,
    pub frame: DataFrame,
}

/// Loads datasets from disk, optionally through a shared cache.
#[derive(Default, Clone)]
pub struct DatasetLoader {
    cache: Option<Arc<DatasetCache>>,
}

impl DatasetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read through `cache` instead of hitting the disk on every load.
    pub fn with_cache(cache: Arc<DatasetCache>) -> Self {
        Self { cache: Some(cache) }
    }

    /// Load the first candidate file that exists.
    ///
    /// Fails with [`AnalysisError::NoDatasetFound`] when none of them do.
    pub fn load_first_available(&self, config: &AnalysisConfig) -> Result<Dataset> {
        for (path, kind) in config.candidate_paths() {
            if path.is_file() {
                info!("Using {} dataset: {}", kind.display_name(), path.display());
                return self.load_path(&path, kind);
            }
            debug!("Candidate not found: {}", path.display());
        }

        Err(AnalysisError::NoDatasetFound {
            candidates: config
                .candidates
                .iter()
                .map(|c| c.file_name.clone())
                .collect(),
        })
    }

    /// Load a specific file and tag it with `kind`.
    pub fn load_path(&self, path: &Path, kind: DatasetKind) -> Result<Dataset> {
        let frame = match &self.cache {
            Some(cache) => cache.get_or_load(path)?,
            None => read_csv(path)?,
        };
        info!(
            "Loaded {}: {} rows x {} columns",
            path.display(),
            frame.height(),
            frame.width()
        );

        Ok(Dataset {
            kind,
            source: path.to_path_buf(),
            frame,
        })
    }
}

/// Guess the dataset kind from a file name.
pub fn detect_kind(path: &Path) -> Option<DatasetKind> {
    let stem = path.file_stem()?.to_str()?.to_lowercase();
    if stem.contains("heart") {
        Some(DatasetKind::HeartDisease)
    } else if stem.contains("diabetes") {
        Some(DatasetKind::Diabetes)
    } else {
        None
    }
}

fn read_options() -> CsvReadOptions {
    let null_values = NullValues::AllColumns(NULL_MARKERS.iter().map(|m| (*m).into()).collect());
    CsvReadOptions::default()
        .with_infer_schema_length(None)
        .with_has_header(true)
        .with_parse_options(
            CsvParseOptions::default()
                .with_quote_char(Some(b'"'))
                .with_null_values(Some(null_values)),
        )
}

/// Read a CSV file with a header row into a DataFrame.
///
/// Falls back to re-parsing the text without blank lines when the
/// direct read fails.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    if !path.is_file() {
        return Err(AnalysisError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} not found", path.display()),
        )));
    }

    match read_options()
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Standard loading failed: {}", e),
    }

    let content = std::fs::read_to_string(path)?;
    let cleaned = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    read_options()
        .into_reader_with_file_handle(Cursor::new(cleaned))
        .finish()
        .map_err(AnalysisError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatasetCandidate;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("health-analysis-loader-{}", name));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_detect_kind() {
        assert_eq!(
            detect_kind(Path::new("data/heart_disease.csv")),
            Some(DatasetKind::HeartDisease)
        );
        assert_eq!(
            detect_kind(Path::new("Diabetes.csv")),
            Some(DatasetKind::Diabetes)
        );
        assert_eq!(detect_kind(Path::new("patients.csv")), None);
    }

    #[test]
    fn test_read_csv_nulls() {
        let dir = scratch_dir("nulls");
        let path = dir.join("heart_disease.csv");
        fs::write(&path, "age,ca,thal\n63,0,6\n67,?,3\n41,,NA\n").unwrap();

        let df = read_csv(&path).unwrap();
        assert_eq!(df.shape(), (3, 3));
        assert_eq!(df.column("ca").unwrap().null_count(), 2);
        assert_eq!(df.column("thal").unwrap().null_count(), 1);
    }

    #[test]
    fn test_read_csv_common_missing_markers() {
        let dir = scratch_dir("markers");
        let path = dir.join("diabetes.csv");
        fs::write(
            &path,
            "Glucose,BMI,Outcome\n90,22.1,0\nN/A,null,1\n100,30.2,0\nNaN,None,1\n",
        )
        .unwrap();

        let df = read_csv(&path).unwrap();

        assert_eq!(df.column("Glucose").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("BMI").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("Glucose").unwrap().null_count(), 2);
        assert_eq!(df.column("BMI").unwrap().null_count(), 2);
    }

    #[test]
    fn test_read_csv_skips_blank_lines() {
        let dir = scratch_dir("blank");
        let path = dir.join("diabetes.csv");
        fs::write(&path, "Glucose,Outcome\n90,0\n\n200,1\n").unwrap();

        let df = read_csv(&path).unwrap();
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn test_read_csv_missing_file() {
        let err = read_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }

    #[test]
    fn test_load_first_available_prefers_order() {
        let dir = scratch_dir("order");
        fs::write(dir.join("diabetes.csv"), "Glucose,Outcome\n90,0\n").unwrap();
        fs::write(dir.join("heart_disease.csv"), "age,target\n50,1\n").unwrap();

        let config = AnalysisConfig::builder().data_dir(&dir).build().unwrap();
        let dataset = DatasetLoader::new().load_first_available(&config).unwrap();
        assert_eq!(dataset.kind, DatasetKind::Diabetes);
        assert_eq!(dataset.source, dir.join("diabetes.csv"));
    }

    #[test]
    fn test_load_first_available_falls_through() {
        let dir = scratch_dir("fallthrough");
        fs::write(dir.join("heart_disease.csv"), "age,target\n50,1\n").unwrap();

        let config = AnalysisConfig::builder().data_dir(&dir).build().unwrap();
        let dataset = DatasetLoader::new().load_first_available(&config).unwrap();
        assert_eq!(dataset.kind, DatasetKind::HeartDisease);
        assert_eq!(dataset.frame.width(), 2);
    }

    #[test]
    fn test_load_first_available_none_found() {
        let dir = scratch_dir("none");
        let config = AnalysisConfig::builder()
            .data_dir(&dir)
            .candidates(vec![DatasetCandidate::new("diabetes.csv", DatasetKind::Diabetes)])
            .build()
            .unwrap();

        let err = DatasetLoader::new().load_first_available(&config).unwrap_err();
        assert!(matches!(err, AnalysisError::NoDatasetFound { .. }));
    }
}

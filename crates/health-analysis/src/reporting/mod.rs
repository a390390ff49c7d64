//! Report generation module.
//!
//! This module turns a pipeline result into:
//! - A serializable [`AnalysisReport`], printed with `--json` or written with
//!   `--emit-report` as `<stem>_report.json`
//! - A CSV export of the filtered table, stamped with the local time
//!
//! # Example
//!
//! ```rust,ignore
//! use health_analysis::reporting::ReportGenerator;
//!
//! let generator = ReportGenerator::new("output");
//! let csv_path = generator.export_csv(&result.explorer)?;
//! let report = ReportGenerator::build_report(&result, Some(&csv_path));
//! generator.write_report_to_file(&report, "diabetes")?;
//! ```

mod generator;

pub use generator::{AnalysisReport, EXPORT_PREFIX, ReportGenerator, export_file_name};

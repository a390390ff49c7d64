//! Correlation and risk-factor analysis.
//!
//! - [`correlation_matrix`] builds the pairwise Pearson matrix of numeric columns
//! - [`RiskAnalyzer`] ranks features against a binary outcome column

mod correlation;
mod risk;

pub use correlation::{correlation_matrix, pearson};
pub use risk::{RiskAnalyzer, find_target_column};

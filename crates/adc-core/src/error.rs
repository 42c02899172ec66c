//! Error taxonomy shared by every crate of the workspace.
//!
//! Each failure class a caller may need to tell apart gets its own variant:
//! invalid run parameters, absent input tables, broken reference data, an
//! export with nothing in it, and an output that already exists. Errors
//! coming from external libraries (CSV/Excel parsers, the workbook writer)
//! are flattened into [`AdcError::Parse`] or [`AdcError::Workbook`] with the
//! offending path in the message.
//!
//! # Example
//!
//! ```
//! use adc_core::{AdcError, AdcResult};
//!
//! fn scenario_for(year: i32) -> AdcResult<&'static str> {
//!     match year {
//!         2030 => Ok("ERAA"),
//!         _ => Err(AdcError::DataIntegrity(format!("no scenario for year {year}"))),
//!     }
//! }
//!
//! assert!(scenario_for(2040).is_err());
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the links data collection.
#[derive(Error, Debug)]
pub enum AdcError {
    /// Invalid run parameters (missing directories, blank scenario name, ...)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// One or more expected input tables are absent
    #[error("Input file does not exist: {}", format_missing(.directory, .files))]
    MissingInput {
        directory: PathBuf,
        files: Vec<String>,
    },

    /// Reference lookups that must be unique returned zero or several rows
    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    /// Nothing survived to the export boundary
    #[error("{0}")]
    EmptyResult(String),

    /// Output workbook or sheet already exists and overwrite was not requested
    #[error("{0}")]
    ExportConflict(String),

    /// Data validation errors (missing columns, unknown labels, bad values)
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing errors raised while reading tables or workbooks
    #[error("Parse error: {0}")]
    Parse(String),

    /// Errors raised by the workbook writer
    #[error("Workbook error: {0}")]
    Workbook(String),
}

/// Convenience type alias for Results using AdcError.
pub type AdcResult<T> = Result<T, AdcError>;

impl AdcError {
    /// The canonical empty-export error.
    pub fn no_data_for_export() -> Self {
        AdcError::EmptyResult("No DATA for export".to_string())
    }
}

fn format_missing(directory: &std::path::Path, files: &[String]) -> String {
    files
        .iter()
        .map(|file| directory.join(file).display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

//! Description of a single tabular input file.

use std::path::{Path, PathBuf};

use adc_core::{AdcError, AdcResult};

/// On-disk format of a table, inferred from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Excel,
    Parquet,
}

impl FileFormat {
    pub fn detect(path: &Path) -> Option<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|s| s.to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "csv" | "txt" | "tsv" => Some(FileFormat::Csv),
            "xls" | "xlsx" => Some(FileFormat::Excel),
            "parquet" => Some(FileFormat::Parquet),
            _ => None,
        }
    }
}

/// How one table file should be read. Excel files are read from their first
/// sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSource {
    pub path: PathBuf,
    pub format: FileFormat,
    /// Field separator for CSV-like files
    pub separator: u8,
}

impl TableSource {
    /// Describe an existing file, inferring its format.
    pub fn new(path: impl Into<PathBuf>) -> AdcResult<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(missing_file(&path));
        }
        let format = FileFormat::detect(&path).ok_or_else(|| {
            AdcError::Validation(format!(
                "unsupported file extension for {}; use .csv, .tsv, .xlsx or .parquet",
                path.display()
            ))
        })?;
        let is_tsv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("tsv"));
        Ok(Self {
            path,
            format,
            separator: if is_tsv { b'\t' } else { b',' },
        })
    }

    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

}

fn missing_file(path: &Path) -> AdcError {
    let directory = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    AdcError::MissingInput {
        directory,
        files: vec![file],
    }
}

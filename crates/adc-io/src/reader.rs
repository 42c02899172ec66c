//! Table readers.
//!
//! [`TabularReader`] is the seam between the pipeline and the file system:
//! the links run asks for tables by contract name ("Transfer Links", "NTCs
//! Index", "NTCs") and gets polars frames back. [`CsvDirectoryReader`] serves
//! them from `<name>.csv` files in an input directory, [`MemoryTableReader`]
//! from frames held in memory.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use adc_core::columns::inputs;
use adc_core::{AdcError, AdcResult};
use polars::prelude::*;
use tracing::debug;

use crate::excel;
use crate::source::{FileFormat, TableSource};
use crate::values::polars_err;

/// Source of named input tables.
pub trait TabularReader {
    /// Where tables are looked up, for error messages.
    fn location(&self) -> PathBuf;

    /// File name (or key) a table is expected under.
    fn file_name(&self, table: &str) -> String;

    fn has_table(&self, table: &str) -> bool;

    fn read_table(&self, table: &str) -> AdcResult<DataFrame>;
}

/// Fail with one [`AdcError::MissingInput`] listing every absent table.
pub fn require_tables<R: TabularReader + ?Sized>(reader: &R, tables: &[&str]) -> AdcResult<()> {
    let missing: Vec<String> = tables
        .iter()
        .filter(|table| !reader.has_table(table))
        .map(|table| reader.file_name(table))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AdcError::MissingInput {
            directory: reader.location(),
            files: missing,
        })
    }
}

/// Read a table file according to its source description.
pub fn read_frame(source: &TableSource) -> AdcResult<DataFrame> {
    let path = source.path.as_path();
    debug!(path = %path.display(), format = ?source.format, "reading table");
    match source.format {
        FileFormat::Csv => {
            let file = File::open(path)?;
            CsvReader::new(file)
                .has_header(true)
                .with_separator(source.separator)
                .infer_schema(None)
                .finish()
                .map_err(polars_err(&format!("reading CSV file {}", path.display())))
        }
        FileFormat::Excel => excel::read_sheet(path, None),
        #[cfg(feature = "parquet")]
        FileFormat::Parquet => {
            let mut file = File::open(path)?;
            ParquetReader::new(&mut file)
                .finish()
                .map_err(polars_err(&format!("reading Parquet file {}", path.display())))
        }
        #[cfg(not(feature = "parquet"))]
        FileFormat::Parquet => Err(AdcError::Configuration(format!(
            "parquet support is disabled; rebuild with the 'parquet' feature to read {}",
            path.display()
        ))),
    }
}

/// Serves `<table>.csv` files from one directory.
#[derive(Debug, Clone)]
pub struct CsvDirectoryReader {
    dir: PathBuf,
    separator: u8,
}

impl CsvDirectoryReader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            separator: b',',
        }
    }

    pub fn with_separator(mut self, separator: u8) -> Self {
        self.separator = separator;
        self
    }

    fn path_of(&self, table: &str) -> PathBuf {
        self.dir.join(inputs::csv_file_name(table))
    }
}

impl TabularReader for CsvDirectoryReader {
    fn location(&self) -> PathBuf {
        self.dir.clone()
    }

    fn file_name(&self, table: &str) -> String {
        inputs::csv_file_name(table)
    }

    fn has_table(&self, table: &str) -> bool {
        self.path_of(table).is_file()
    }

    fn read_table(&self, table: &str) -> AdcResult<DataFrame> {
        let source = TableSource::new(self.path_of(table))?.with_separator(self.separator);
        read_frame(&source)
    }
}

/// Serves frames registered in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTableReader {
    tables: BTreeMap<String, DataFrame>,
}

impl MemoryTableReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: impl Into<String>, frame: DataFrame) -> Self {
        self.tables.insert(table.into(), frame);
        self
    }
}

impl TabularReader for MemoryTableReader {
    fn location(&self) -> PathBuf {
        Path::new("<memory>").to_path_buf()
    }

    fn file_name(&self, table: &str) -> String {
        table.to_string()
    }

    fn has_table(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    fn read_table(&self, table: &str) -> AdcResult<DataFrame> {
        self.tables
            .get(table)
            .cloned()
            .ok_or_else(|| AdcError::MissingInput {
                directory: self.location(),
                files: vec![table.to_string()],
            })
    }
}

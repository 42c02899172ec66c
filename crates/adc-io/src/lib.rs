//! # adc-io: Tables in, workbook out
//!
//! File-facing half of the links data collection.
//!
//! - [`reader`] - [`TabularReader`] over a CSV input directory or in-memory frames
//! - [`source`] - [`TableSource`] with format detection (CSV, Excel, Parquet)
//! - [`records`] - Header validation and typed record extraction
//! - [`reference`] - [`ReferenceCatalog`] loaded from the reference workbook
//! - [`workbook`] - [`WorkbookWriter`] creating and editing `.xlsx` files
//!
//! All tables travel as polars `DataFrame`s until they are turned into the
//! typed records of `adc-core`.

pub mod excel;
pub mod reader;
pub mod records;
pub mod reference;
pub mod source;
pub mod workbook;

mod values;

pub use reader::{read_frame, require_tables, CsvDirectoryReader, MemoryTableReader, TabularReader};
pub use records::{hourly_series, ntc_index_entries, transfer_records, validate_headers};
pub use reference::{CountryEntry, NodeCode, ReferenceCatalog, ScenarioEntry};
pub use source::{FileFormat, TableSource};
pub use workbook::{WorkbookWriter, XlsxWorkbookWriter};

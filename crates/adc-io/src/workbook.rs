//! XLSX workbook output.
//!
//! Workbooks are built in memory with rust_xlsxwriter, saved next to their
//! final location and renamed into place, so a failed run never leaves a
//! half-written file behind. Editing reads the existing sheets back with
//! calamine and re-writes their cell values; formatting is not carried over.

use std::fs;
use std::path::{Path, PathBuf};

use adc_core::{AdcError, AdcResult};
use calamine::{Data, Range};
use polars::prelude::*;
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use tracing::{debug, info};

use crate::excel;
use crate::values::{float_values, polars_err};

/// Destination of the export tables.
pub trait WorkbookWriter {
    /// Write a new workbook `<dir>/<name>.xlsx` holding `sheets` in order.
    fn create_workbook(
        &self,
        dir: &Path,
        name: &str,
        sheets: &[(String, DataFrame)],
        overwrite: bool,
    ) -> AdcResult<PathBuf>;

    /// Add `sheet` to an existing workbook, or replace it when `overwrite_sheet`.
    fn edit_workbook(
        &self,
        path: &Path,
        sheet: &str,
        frame: &DataFrame,
        overwrite_sheet: bool,
    ) -> AdcResult<()>;
}

/// [`WorkbookWriter`] producing `.xlsx` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxWorkbookWriter;

impl XlsxWorkbookWriter {
    pub fn new() -> Self {
        Self
    }
}

fn xlsx_err(context: &str) -> impl Fn(XlsxError) -> AdcError + '_ {
    move |err| AdcError::Workbook(format!("{context}: {err}"))
}

fn file_name(name: &str) -> String {
    if name.to_ascii_lowercase().ends_with(".xlsx") {
        name.to_string()
    } else {
        format!("{name}.xlsx")
    }
}

impl WorkbookWriter for XlsxWorkbookWriter {
    fn create_workbook(
        &self,
        dir: &Path,
        name: &str,
        sheets: &[(String, DataFrame)],
        overwrite: bool,
    ) -> AdcResult<PathBuf> {
        if !dir.is_dir() {
            return Err(AdcError::Configuration(format!(
                "Export directory does not exist: {}",
                dir.display()
            )));
        }
        let file_name = file_name(name);
        let path = dir.join(&file_name);
        if path.exists() && !overwrite {
            return Err(AdcError::ExportConflict(format!(
                "This Workbook already exist: {file_name}"
            )));
        }

        let mut workbook = Workbook::new();
        for (sheet, frame) in sheets {
            let worksheet = new_sheet(&mut workbook, sheet)?;
            write_frame(worksheet, frame)?;
        }
        save_atomically(&mut workbook, &path)?;
        info!(path = %path.display(), sheets = sheets.len(), "workbook written");
        Ok(path)
    }

    fn edit_workbook(
        &self,
        path: &Path,
        sheet: &str,
        frame: &DataFrame,
        overwrite_sheet: bool,
    ) -> AdcResult<()> {
        if !path.is_file() {
            return Err(AdcError::MissingInput {
                directory: path.parent().map(Path::to_path_buf).unwrap_or_default(),
                files: vec![path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()],
            });
        }
        let existing = excel::read_all_sheets(path)?;
        let present = existing.iter().any(|(name, _)| name == sheet);
        match (present, overwrite_sheet) {
            (true, false) => {
                return Err(AdcError::ExportConflict(format!(
                    "This sheet already exists: {sheet}"
                )))
            }
            (false, true) => {
                return Err(AdcError::Validation(format!("Sheet '{sheet}' not found")))
            }
            _ => {}
        }

        let mut workbook = Workbook::new();
        for (name, range) in &existing {
            let worksheet = new_sheet(&mut workbook, name)?;
            if name == sheet {
                write_frame(worksheet, frame)?;
            } else {
                copy_range(worksheet, range)?;
            }
        }
        if !present {
            let worksheet = new_sheet(&mut workbook, sheet)?;
            write_frame(worksheet, frame)?;
        }
        save_atomically(&mut workbook, path)?;
        info!(path = %path.display(), sheet, replaced = present, "workbook edited");
        Ok(())
    }
}

fn new_sheet<'a>(workbook: &'a mut Workbook, name: &str) -> AdcResult<&'a mut Worksheet> {
    workbook
        .add_worksheet()
        .set_name(name)
        .map_err(xlsx_err(&format!("naming sheet '{name}'")))
}

/// The workbook is assembled in memory first; only complete bytes reach the
/// temporary file, which is removed again if writing or renaming fails.
fn save_atomically(workbook: &mut Workbook, path: &Path) -> AdcResult<()> {
    let bytes = workbook
        .save_to_buffer()
        .map_err(xlsx_err(&format!("assembling {}", path.display())))?;
    let temp = path.with_extension("xlsx.tmp");
    if let Err(err) = fs::write(&temp, bytes).and_then(|()| fs::rename(&temp, path)) {
        let _ = fs::remove_file(&temp);
        return Err(err.into());
    }
    Ok(())
}

/// Header row, then one row per frame row; nulls are left blank.
pub(crate) fn write_frame(worksheet: &mut Worksheet, frame: &DataFrame) -> AdcResult<()> {
    for (col, series) in frame.get_columns().iter().enumerate() {
        let col = sheet_column(col)?;
        let name = series.name();
        let context = format!("writing column '{name}'");
        if !name.is_empty() {
            worksheet
                .write_string(0, col, name)
                .map_err(xlsx_err(&context))?;
        }

        match series.dtype() {
            DataType::Null => {}
            DataType::Boolean => {
                let values = series.bool().map_err(polars_err(&context))?;
                for (row, value) in values.into_iter().enumerate() {
                    if let Some(value) = value {
                        worksheet
                            .write_boolean(sheet_row(row)?, col, value)
                            .map_err(xlsx_err(&context))?;
                    }
                }
            }
            dtype if dtype.is_numeric() => {
                for (row, value) in float_values(series)?.into_iter().enumerate() {
                    if let Some(value) = value {
                        worksheet
                            .write_number(sheet_row(row)?, col, value)
                            .map_err(xlsx_err(&context))?;
                    }
                }
            }
            _ => {
                let text = series
                    .cast(&DataType::Utf8)
                    .map_err(polars_err(&context))?;
                let values = text.utf8().map_err(polars_err(&context))?;
                for (row, value) in values.into_iter().enumerate() {
                    if let Some(value) = value {
                        worksheet
                            .write_string(sheet_row(row)?, col, value)
                            .map_err(xlsx_err(&context))?;
                    }
                }
            }
        }
    }
    debug!(rows = frame.height(), columns = frame.width(), "sheet written");
    Ok(())
}

fn copy_range(worksheet: &mut Worksheet, range: &Range<Data>) -> AdcResult<()> {
    let (first_row, first_col) = range.start().unwrap_or((0, 0));
    for (row_idx, row) in range.rows().enumerate() {
        let row_num = first_row + row_idx as u32;
        for (col_idx, data) in row.iter().enumerate() {
            let col_num = u16::try_from(first_col as usize + col_idx)
                .map_err(|_| AdcError::Workbook("sheet is too wide to copy".into()))?;
            let result = match data {
                Data::Empty | Data::Error(_) => continue,
                Data::Int(value) => worksheet.write_number(row_num, col_num, *value as f64),
                Data::Float(value) => worksheet.write_number(row_num, col_num, *value),
                Data::Bool(value) => worksheet.write_boolean(row_num, col_num, *value),
                Data::String(value) => worksheet.write_string(row_num, col_num, value),
                other => worksheet.write_string(row_num, col_num, other.to_string()),
            };
            result.map_err(xlsx_err("copying existing sheet"))?;
        }
    }
    Ok(())
}

fn sheet_row(frame_row: usize) -> AdcResult<u32> {
    u32::try_from(frame_row + 1)
        .map_err(|_| AdcError::Workbook(format!("row {frame_row} exceeds the sheet size")))
}

fn sheet_column(idx: usize) -> AdcResult<u16> {
    u16::try_from(idx)
        .map_err(|_| AdcError::Workbook(format!("column {idx} exceeds the sheet size")))
}

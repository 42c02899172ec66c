//! Excel workbook reading (calamine).
//!
//! Sheets are turned into polars frames with one column per header cell.
//! Column types are inferred from the cells: all-numeric columns become
//! `Float64`, all-boolean columns `Boolean`, anything else text.

use std::path::Path;

use adc_core::{AdcError, AdcResult};
use calamine::{open_workbook, Data, Range, Reader, Xlsx};
use polars::prelude::*;

use crate::values::{format_number, polars_err};

fn open(path: &Path) -> AdcResult<Xlsx<std::io::BufReader<std::fs::File>>> {
    open_workbook(path)
        .map_err(|err| AdcError::Parse(format!("opening workbook {}: {err}", path.display())))
}

/// Sheet names in workbook order.
pub fn sheet_names(path: &Path) -> AdcResult<Vec<String>> {
    Ok(open(path)?.sheet_names().to_vec())
}

/// Raw cell grid of every sheet, in workbook order.
pub(crate) fn read_all_sheets(path: &Path) -> AdcResult<Vec<(String, Range<Data>)>> {
    let mut workbook = open(path)?;
    let names = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook.worksheet_range(&name).map_err(|err| {
            AdcError::Parse(format!(
                "reading sheet '{name}' of {}: {err}",
                path.display()
            ))
        })?;
        sheets.push((name, range));
    }
    Ok(sheets)
}

/// Read one sheet (the first one when `sheet` is `None`) into a frame.
pub fn read_sheet(path: &Path, sheet: Option<&str>) -> AdcResult<DataFrame> {
    let mut workbook = open(path)?;
    let names = workbook.sheet_names().to_vec();
    let name = match sheet {
        Some(name) => {
            if !names.iter().any(|n| n == name) {
                return Err(AdcError::Validation(format!(
                    "Sheet '{name}' not found in {}",
                    path.display()
                )));
            }
            name.to_string()
        }
        None => names.first().cloned().ok_or_else(|| {
            AdcError::Validation(format!("no sheets found in {}", path.display()))
        })?,
    };
    let range = workbook.worksheet_range(&name).map_err(|err| {
        AdcError::Parse(format!(
            "reading sheet '{name}' of {}: {err}",
            path.display()
        ))
    })?;
    range_to_frame(&range, &name)
}

/// Numeric, boolean or text content of a cell.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Number(f64),
    Bool(bool),
    Text(String),
    Empty,
}

fn cell(data: &Data) -> Cell {
    match data {
        Data::Int(value) => Cell::Number(*value as f64),
        Data::Float(value) => Cell::Number(*value),
        Data::Bool(value) => Cell::Bool(*value),
        Data::String(value) if value.trim().is_empty() => Cell::Empty,
        Data::String(value) => Cell::Text(value.trim().to_string()),
        Data::Empty | Data::Error(_) => Cell::Empty,
        other => Cell::Text(other.to_string()),
    }
}

pub(crate) fn range_to_frame(range: &Range<Data>, sheet: &str) -> AdcResult<DataFrame> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(DataFrame::empty());
    };
    let headers: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(idx, data)| match cell(data) {
            Cell::Text(text) => text,
            Cell::Number(value) => format_number(value),
            Cell::Bool(value) => value.to_string(),
            Cell::Empty => format!("column_{idx}"),
        })
        .collect();
    let body: Vec<Vec<Cell>> = rows
        .map(|row| row.iter().map(cell).collect())
        .filter(|row: &Vec<Cell>| row.iter().any(|c| *c != Cell::Empty))
        .collect();

    let mut columns = Vec::with_capacity(headers.len());
    for (idx, name) in headers.iter().enumerate() {
        let cells: Vec<Cell> = body
            .iter()
            .map(|row| row.get(idx).cloned().unwrap_or(Cell::Empty))
            .collect();
        columns.push(cells_to_series(name, cells));
    }
    DataFrame::new(columns).map_err(polars_err(&format!("building frame for sheet '{sheet}'")))
}

fn cells_to_series(name: &str, cells: Vec<Cell>) -> Series {
    let all_numbers = cells
        .iter()
        .all(|c| matches!(c, Cell::Number(_) | Cell::Empty));
    let all_bools = cells
        .iter()
        .all(|c| matches!(c, Cell::Bool(_) | Cell::Empty));
    let has_values = cells.iter().any(|c| *c != Cell::Empty);

    if has_values && all_numbers {
        let values: Vec<Option<f64>> = cells
            .into_iter()
            .map(|c| match c {
                Cell::Number(v) => Some(v),
                _ => None,
            })
            .collect();
        Series::new(name, values)
    } else if has_values && all_bools {
        let values: Vec<Option<bool>> = cells
            .into_iter()
            .map(|c| match c {
                Cell::Bool(v) => Some(v),
                _ => None,
            })
            .collect();
        Series::new(name, values)
    } else {
        let values: Vec<Option<String>> = cells
            .into_iter()
            .map(|c| match c {
                Cell::Text(v) => Some(v),
                Cell::Number(v) => Some(format_number(v)),
                Cell::Bool(v) => Some(v.to_string()),
                Cell::Empty => None,
            })
            .collect();
        Series::new(name, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_columns_become_text() {
        let series = cells_to_series(
            "YEAR",
            vec![Cell::Number(2030.0), Cell::Text("2060".into()), Cell::Empty],
        );
        assert_eq!(series.dtype(), &DataType::Utf8);
        assert_eq!(series.null_count(), 1);
    }

    #[test]
    fn numeric_columns_keep_nulls() {
        let series = cells_to_series("month", vec![Cell::Number(1.0), Cell::Empty]);
        assert_eq!(series.dtype(), &DataType::Float64);
        assert_eq!(series.null_count(), 1);
    }

    #[test]
    fn blank_strings_are_empty_cells() {
        assert_eq!(cell(&Data::String("  ".into())), Cell::Empty);
        assert_eq!(cell(&Data::Int(3)), Cell::Number(3.0));
    }
}

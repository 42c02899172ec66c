//! Typed column access on loosely-typed frames.
//!
//! Input tables come from CSV inference or from Excel cells, so the same
//! logical column may arrive as integers, floats or text. These helpers
//! normalize a column to the type a record field needs, treating blank text
//! as null.

use adc_core::{AdcError, AdcResult};
use polars::prelude::*;

pub(crate) fn polars_err(context: &str) -> impl Fn(PolarsError) -> AdcError + '_ {
    move |err| AdcError::Parse(format!("{context}: {err}"))
}

pub(crate) fn column<'a>(df: &'a DataFrame, table: &str, name: &str) -> AdcResult<&'a Series> {
    df.column(name).map_err(|_| {
        AdcError::Validation(format!("table '{table}' is missing column: {name}"))
    })
}

/// Text values; numbers are rendered without a trailing `.0` when integral.
pub(crate) fn string_values(series: &Series) -> AdcResult<Vec<Option<String>>> {
    let context = format!("reading column '{}' as text", series.name());
    match series.dtype() {
        DataType::Utf8 => Ok(series
            .utf8()
            .map_err(polars_err(&context))?
            .into_iter()
            .map(|value| {
                value
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
            })
            .collect()),
        DataType::Null => Ok(vec![None; series.len()]),
        dtype if dtype.is_numeric() => Ok(float_values(series)?
            .into_iter()
            .map(|value| value.map(format_number))
            .collect()),
        DataType::Boolean => Ok(series
            .bool()
            .map_err(polars_err(&context))?
            .into_iter()
            .map(|value| value.map(|b| b.to_string()))
            .collect()),
        other => Err(AdcError::Validation(format!(
            "column '{}' has unsupported type {other} for text values",
            series.name()
        ))),
    }
}

/// Numeric values; numeric text is parsed, other text is null.
pub(crate) fn float_values(series: &Series) -> AdcResult<Vec<Option<f64>>> {
    let context = format!("reading column '{}' as numbers", series.name());
    match series.dtype() {
        DataType::Utf8 => Ok(series
            .utf8()
            .map_err(polars_err(&context))?
            .into_iter()
            .map(|value| value.and_then(|v| v.trim().parse::<f64>().ok()))
            .collect()),
        DataType::Null => Ok(vec![None; series.len()]),
        dtype if dtype.is_numeric() => {
            let cast = series
                .cast(&DataType::Float64)
                .map_err(polars_err(&context))?;
            let values = cast.f64().map_err(polars_err(&context))?;
            Ok(values
                .into_iter()
                .map(|value| value.filter(|v| !v.is_nan()))
                .collect())
        }
        other => Err(AdcError::Validation(format!(
            "column '{}' has unsupported type {other} for numeric values",
            series.name()
        ))),
    }
}

/// Whole-number values; fractional numbers are rejected.
pub(crate) fn int_values(series: &Series) -> AdcResult<Vec<Option<i64>>> {
    float_values(series)?
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some(v) if v.fract() != 0.0 => Err(AdcError::Validation(format!(
                "column '{}' row {}: expected a whole number, got {v}",
                series.name(),
                row + 1
            ))),
            Some(v) => Ok(Some(v as i64)),
            None => Ok(None),
        })
        .collect()
}

pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

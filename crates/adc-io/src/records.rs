//! Typed records extracted from validated input frames.

use adc_core::columns::{
    ntc_index, ntc_timeseries, transfer_links, TableContract, NTC_INDEX_CONTRACT,
    NTC_TIMESERIES_CONTRACT, TRANSFER_LINKS_CONTRACT,
};
use adc_core::{AdcError, AdcResult, HourStamp, HourlyCapacitySeries, NtcIndexEntry, TransferRecord};
use polars::prelude::*;
use tracing::debug;

use crate::values::{column, float_values, int_values, string_values};

/// Check a frame's headers against a table contract.
pub fn validate_headers(df: &DataFrame, contract: &TableContract) -> AdcResult<()> {
    contract.validate(&df.get_column_names())
}

fn optional_strings(df: &DataFrame, name: &str) -> AdcResult<Vec<Option<String>>> {
    match df.column(name) {
        Ok(series) => string_values(series),
        Err(_) => Ok(vec![None; df.height()]),
    }
}

fn optional_floats(df: &DataFrame, name: &str) -> AdcResult<Vec<Option<f64>>> {
    match df.column(name) {
        Ok(series) => float_values(series),
        Err(_) => Ok(vec![None; df.height()]),
    }
}

fn years(df: &DataFrame, table: &str, name: &str) -> AdcResult<Vec<Option<i32>>> {
    int_values(column(df, table, name)?)?
        .into_iter()
        .map(|value| {
            value
                .map(|v| {
                    i32::try_from(v).map_err(|_| {
                        AdcError::Validation(format!("column '{name}' holds an invalid year: {v}"))
                    })
                })
                .transpose()
        })
        .collect()
}

/// Rows of the "Transfer Links" table.
///
/// Text fields that are blank become empty strings, except `NTC_CURVE_ID`
/// which stays `None`. A missing `NTC_LIMIT_CAPACITY_STATIC` column reads as
/// all-null.
pub fn transfer_records(df: &DataFrame) -> AdcResult<Vec<TransferRecord>> {
    validate_headers(df, &TRANSFER_LINKS_CONTRACT)?;
    let table = TRANSFER_LINKS_CONTRACT.table;
    let text = |name: &str| -> AdcResult<Vec<String>> {
        Ok(string_values(column(df, table, name)?)?
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect())
    };

    let zone = text(transfer_links::ZONE)?;
    let source = text(transfer_links::MARKET_ZONE_SOURCE)?;
    let destination = text(transfer_links::MARKET_ZONE_DESTINATION)?;
    let transfer_type = text(transfer_links::TRANSFER_TYPE)?;
    let technology = text(transfer_links::TRANSFER_TECHNOLOGY)?;
    let scenario = text(transfer_links::STUDY_SCENARIO)?;
    let start = years(df, table, transfer_links::YEAR_VALID_START)?;
    let end = years(df, table, transfer_links::YEAR_VALID_END)?;
    let static_limit = optional_floats(df, transfer_links::NTC_LIMIT_CAPACITY_STATIC)?;
    let curve_id = optional_strings(df, transfer_links::NTC_CURVE_ID)?;

    let records: Vec<TransferRecord> = (0..df.height())
        .map(|row| TransferRecord {
            zone: zone[row].clone(),
            market_zone_source: source[row].clone(),
            market_zone_destination: destination[row].clone(),
            transfer_type: transfer_type[row].clone(),
            transfer_technology: technology[row].clone(),
            study_scenario: scenario[row].clone(),
            year_valid_start: start[row],
            year_valid_end: end[row],
            ntc_limit_capacity_static: static_limit[row],
            ntc_curve_id: curve_id[row].clone(),
        })
        .collect();
    debug!(rows = records.len(), "transfer records extracted");
    Ok(records)
}

/// Rows of the "NTCs Index" table; rows missing a uid, zone or id are skipped.
pub fn ntc_index_entries(df: &DataFrame) -> AdcResult<Vec<NtcIndexEntry>> {
    validate_headers(df, &NTC_INDEX_CONTRACT)?;
    let table = NTC_INDEX_CONTRACT.table;
    let uids = string_values(column(df, table, ntc_index::CURVE_UID)?)?;
    let zones = string_values(column(df, table, ntc_index::ZONE)?)?;
    let ids = string_values(column(df, table, ntc_index::ID)?)?;

    let mut entries = Vec::with_capacity(uids.len());
    for (row, ((uid, zone), id)) in uids.into_iter().zip(zones).zip(ids).enumerate() {
        match (uid, zone, id) {
            (Some(curve_uid), Some(zone), Some(id)) => entries.push(NtcIndexEntry {
                curve_uid,
                zone,
                id,
            }),
            _ => debug!(row = row + 1, "skipping incomplete NTCs Index row"),
        }
    }
    Ok(entries)
}

fn calendar(df: &DataFrame, name: &str) -> AdcResult<Vec<u32>> {
    let table = NTC_TIMESERIES_CONTRACT.table;
    int_values(column(df, table, name)?)?
        .into_iter()
        .enumerate()
        .map(|(row, value)| {
            value
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| {
                    AdcError::Validation(format!(
                        "table '{table}' row {}: {name} must be a non-negative whole number",
                        row + 1
                    ))
                })
        })
        .collect()
}

/// The hourly "NTCs" table; every column besides MONTH, DAY and HOUR is a curve.
pub fn hourly_series(df: &DataFrame) -> AdcResult<HourlyCapacitySeries> {
    validate_headers(df, &NTC_TIMESERIES_CONTRACT)?;
    let months = calendar(df, ntc_timeseries::MONTH)?;
    let days = calendar(df, ntc_timeseries::DAY)?;
    let hours = calendar(df, ntc_timeseries::HOUR)?;

    let mut curve_ids = Vec::new();
    let mut columns = Vec::new();
    for series in df.get_columns() {
        if ntc_timeseries::CALENDAR.contains(&series.name()) {
            continue;
        }
        curve_ids.push(series.name().to_string());
        columns.push(float_values(series)?);
    }

    let mut hourly = HourlyCapacitySeries::new(curve_ids);
    let mut row_values = Vec::with_capacity(columns.len());
    for row in 0..df.height() {
        row_values.clear();
        row_values.extend(columns.iter().map(|values| values[row]));
        let stamp = HourStamp {
            month: months[row],
            day: days[row],
            hour: hours[row],
        };
        hourly.push_row(stamp, &row_values)?;
    }
    debug!(
        rows = hourly.len(),
        curves = hourly.curve_ids().len(),
        "hourly series extracted"
    );
    Ok(hourly)
}

//! End-to-end links run: input tables in, `links_{scenario}.xlsx` out.

use std::path::PathBuf;

use adc_core::columns::{export, inputs};
use adc_core::diagnostics::Stage;
use adc_core::{
    AdcResult, Diagnostics, HourlyCapacitySeries, NtcIndexEntry, RunConfiguration, TransferRecord,
};
use adc_io::{
    hourly_series, ntc_index_entries, require_tables, transfer_records, ReferenceCatalog,
    TabularReader, WorkbookWriter,
};
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::info;

use crate::filter::filter_year;
use crate::formatter::{export_frame, format_export, parameters_frame, YearTable};
use crate::joiner::join_transfer_records;
use crate::reducer::reduce_curves;
use crate::resolver::resolve_borders;

/// Typed content of the three input tables.
#[derive(Debug, Clone, Default)]
pub struct LinksInputs {
    pub transfer_records: Vec<TransferRecord>,
    pub ntc_index: Vec<NtcIndexEntry>,
    pub hourly: HourlyCapacitySeries,
}

impl LinksInputs {
    /// Read and validate the three tables; every missing one is reported at once.
    pub fn read<R: TabularReader + ?Sized>(reader: &R) -> AdcResult<Self> {
        require_tables(reader, &inputs::LINKS_TABLES)?;
        let ntc_index = ntc_index_entries(&reader.read_table(inputs::NTC_INDEX)?)?;
        let hourly = hourly_series(&reader.read_table(inputs::NTC_TIMESERIES)?)?;
        let transfer_records = transfer_records(&reader.read_table(inputs::TRANSFER_LINKS)?)?;
        info!(
            transfer_records = transfer_records.len(),
            index_entries = ntc_index.len(),
            hours = hourly.len(),
            curves = hourly.curve_ids().len(),
            "links inputs loaded"
        );
        Ok(Self {
            transfer_records,
            ntc_index,
            hourly,
        })
    }
}

/// Export rows per year, with the issues met on the way.
#[derive(Debug, Clone)]
pub struct LinksResolution {
    pub tables: Vec<YearTable>,
    pub diagnostics: Diagnostics,
}

/// Row count of one exported year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRows {
    pub year: i32,
    pub rows: usize,
}

/// What a links run produced.
#[derive(Debug, Clone, Serialize)]
pub struct LinksOutcome {
    pub workbook_path: PathBuf,
    pub rows_per_year: Vec<YearRows>,
    pub diagnostics: Diagnostics,
}

/// Years in the given order, repeated years dropped.
fn distinct_years(years: &[i32], diag: &mut Diagnostics) -> Vec<i32> {
    let mut out: Vec<i32> = Vec::with_capacity(years.len());
    for year in years {
        if out.contains(year) {
            diag.warn(
                Stage::Export,
                "calendar year requested twice; exported once",
                year.to_string(),
            );
        } else {
            out.push(*year);
        }
    }
    out
}

/// Reduce, join, filter, resolve and format, all in memory.
pub fn resolve_links(
    inputs: &LinksInputs,
    catalog: &ReferenceCatalog,
    years: &[i32],
) -> AdcResult<LinksResolution> {
    let mut diagnostics = Diagnostics::new();
    let years = distinct_years(years, &mut diagnostics);

    let profiles = reduce_curves(&inputs.hourly, catalog.peak_mapping(), &mut diagnostics);
    let joined = join_transfer_records(
        &inputs.transfer_records,
        &inputs.ntc_index,
        &profiles,
        catalog,
        &mut diagnostics,
    );

    let mut resolved = Vec::with_capacity(years.len());
    for year in &years {
        let selected = filter_year(&joined, catalog, *year)?;
        resolved.push((*year, resolve_borders(selected, *year, &mut diagnostics)));
    }

    let tables = format_export(&resolved, &mut diagnostics)?;
    Ok(LinksResolution {
        tables,
        diagnostics,
    })
}

/// Sheets of the links workbook: `parameters`, then one per year.
pub fn links_sheets(
    resolution: &LinksResolution,
    config: &RunConfiguration,
) -> AdcResult<Vec<(String, DataFrame)>> {
    let years: Vec<i32> = resolution.tables.iter().map(|table| table.year).collect();
    let mut sheets = vec![(
        export::PARAMETERS_SHEET.to_string(),
        parameters_frame(&years, config.hurdle_cost)?,
    )];
    for table in &resolution.tables {
        sheets.push((
            table.year.to_string(),
            export_frame(&table.rows, config.hvdc_layout)?,
        ));
    }
    Ok(sheets)
}

/// Run the whole links data collection for `config`.
///
/// Nothing is written unless every year resolved.
pub fn create_links_outputs<R, W>(
    config: &RunConfiguration,
    reader: &R,
    writer: &W,
) -> AdcResult<LinksOutcome>
where
    R: TabularReader + ?Sized,
    W: WorkbookWriter + ?Sized,
{
    info!(
        scenario = %config.scenario_name,
        input = %config.input_dir.display(),
        years = ?config.calendar_years,
        "links run started"
    );
    // Missing input files are reported before the reference workbook is opened.
    let inputs = LinksInputs::read(reader)?;
    let catalog = ReferenceCatalog::from_workbook(&config.reference_path)?;

    let resolution = resolve_links(&inputs, &catalog, &config.calendar_years)?;
    let sheets = links_sheets(&resolution, config)?;
    let workbook_path = writer.create_workbook(
        &config.export_dir,
        &config.workbook_name(),
        &sheets,
        config.overwrite,
    )?;

    let rows_per_year = resolution
        .tables
        .iter()
        .map(|table| YearRows {
            year: table.year,
            rows: table.rows.len(),
        })
        .collect();
    info!(
        path = %workbook_path.display(),
        issues = %resolution.diagnostics.summary(),
        "links run finished"
    );
    Ok(LinksOutcome {
        workbook_path,
        rows_per_year,
        diagnostics: resolution.diagnostics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use adc_core::{HourStamp, PeakPeriodMapping, PeriodHour, PeriodMonth, Severity};
    use adc_io::{NodeCode, ScenarioEntry};

    fn catalog() -> ReferenceCatalog {
        let links = [("BE00", "BE"), ("FR00", "FR")]
            .iter()
            .map(|(node, code)| NodeCode {
                market_node: node.to_string(),
                code_antares: code.to_string(),
            })
            .collect();
        let scenarios = vec![ScenarioEntry {
            year: 2030,
            scenario: "ERAA".into(),
        }];
        let peak = PeakPeriodMapping::new()
            .with_hour(1, PeriodHour::Peak)
            .with_month(1, PeriodMonth::Winter);
        ReferenceCatalog::new(Vec::new(), scenarios, links, peak)
    }

    fn record(zone: &str, source: &str, destination: &str) -> TransferRecord {
        TransferRecord {
            zone: zone.into(),
            market_zone_source: source.into(),
            market_zone_destination: destination.into(),
            transfer_type: "NTC".into(),
            transfer_technology: "HVAC".into(),
            study_scenario: "ERAA&TYNDP".into(),
            year_valid_start: Some(2025),
            year_valid_end: Some(2035),
            ntc_limit_capacity_static: Some(4300.0),
            ntc_curve_id: None,
        }
    }

    fn inputs() -> LinksInputs {
        let mut hourly = HourlyCapacitySeries::new(Vec::new());
        hourly
            .push_row(
                HourStamp {
                    month: 1,
                    day: 1,
                    hour: 1,
                },
                &[],
            )
            .unwrap();
        LinksInputs {
            transfer_records: vec![
                record("FR", "BE00", "FR00"),
                record("BE", "FR00", "BE00"),
            ],
            ntc_index: Vec::new(),
            hourly,
        }
    }

    #[test]
    fn symmetric_declarations_give_one_direct_row() {
        let resolution = resolve_links(&inputs(), &catalog(), &[2030]).unwrap();
        assert_eq!(resolution.tables.len(), 1);
        let rows = &resolution.tables[0].rows;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "BE-FR");
        assert_eq!(rows[0].direct.summer_hp, Some(4300.0));
    }

    #[test]
    fn repeated_runs_are_identical() {
        let first = resolve_links(&inputs(), &catalog(), &[2030]).unwrap();
        let second = resolve_links(&inputs(), &catalog(), &[2030]).unwrap();
        assert_eq!(first.tables, second.tables);
    }

    #[test]
    fn unknown_year_stops_the_run() {
        let err = resolve_links(&inputs(), &catalog(), &[2030, 2040]).unwrap_err();
        assert!(matches!(err, adc_core::AdcError::DataIntegrity(_)));
    }

    #[test]
    fn repeated_years_are_exported_once() {
        let resolution = resolve_links(&inputs(), &catalog(), &[2030, 2030]).unwrap();
        assert_eq!(resolution.tables.len(), 1);
        assert_eq!(resolution.diagnostics.count(Severity::Warning), 1);
    }
}

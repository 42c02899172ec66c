//! Canonical border names and the export tables.
//!
//! A border declared as `FR-BE` and one declared as `BE-FR` both end up on
//! the row named `BE-FR` (endpoint codes sorted). The declaration whose
//! direction already matches the name fills the `*_Direct_MW` columns, the
//! other one the `*_Indirect_MW` columns. Names lacking one direction are
//! left out of the export and counted as diagnostics.

use std::collections::{BTreeMap, BTreeSet};

use adc_core::columns::export;
use adc_core::diagnostics::Stage;
use adc_core::{
    AdcError, AdcResult, Diagnostics, ExportRow, HvdcLayout, LinkDirection,
    ResolvedBorderRecord, Season, SeasonalValues,
};
use polars::prelude::*;
use tracing::{debug, info};

/// Rows of one year's export sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct YearTable {
    pub year: i32,
    pub rows: Vec<ExportRow>,
}

/// `AL-GR` for both (`GR`, `AL`) and (`AL`, `GR`).
pub fn antares_name(code_source: &str, code_destination: &str) -> String {
    if code_source <= code_destination {
        format!("{code_source}-{code_destination}")
    } else {
        format!("{code_destination}-{code_source}")
    }
}

/// Direction of a declared border relative to its canonical name.
pub fn link_direction(code_source: &str, code_destination: &str) -> LinkDirection {
    let border = format!("{code_source}-{code_destination}");
    if border == antares_name(code_source, code_destination) {
        LinkDirection::Direct
    } else {
        LinkDirection::Indirect
    }
}

/// `{Y-1}-{Y}` label of the winter straddling into `year`.
pub fn straddling_year_label(year: i32) -> String {
    format!("{}-{}", year - 1, year)
}

fn format_year(
    year: i32,
    records: &[ResolvedBorderRecord],
    diag: &mut Diagnostics,
) -> Vec<ExportRow> {
    let mut direct: BTreeMap<String, SeasonalValues> = BTreeMap::new();
    let mut indirect: BTreeMap<String, SeasonalValues> = BTreeMap::new();
    for record in records {
        if record.code_source == record.code_destination {
            debug!(year, border = %record.border, "self-loop dropped");
            continue;
        }
        let name = antares_name(&record.code_source, &record.code_destination);
        let side = match link_direction(&record.code_source, &record.code_destination) {
            LinkDirection::Direct => &mut direct,
            LinkDirection::Indirect => &mut indirect,
        };
        side.entry(name).or_insert(record.seasonal);
    }

    let one_sided: BTreeSet<&String> = direct
        .keys()
        .filter(|name| !indirect.contains_key(*name))
        .chain(indirect.keys().filter(|name| !direct.contains_key(*name)))
        .collect();
    if !one_sided.is_empty() {
        let names: Vec<&str> = one_sided.iter().map(|name| name.as_str()).collect();
        diag.warn(
            Stage::Export,
            format!(
                "{} border(s) declared in one direction only in {year}; left out of the export",
                names.len()
            ),
            names.join(", "),
        );
    }

    // BTreeMap iteration keeps rows sorted by name.
    direct
        .iter()
        .filter_map(|(name, direct_values)| {
            let indirect_values = indirect.get(name)?;
            Some(ExportRow {
                year,
                name: name.clone(),
                direct: *direct_values,
                indirect: *indirect_values,
                flowbased_perimeter: false,
                hvdc_direct: None,
                hvdc_indirect: None,
                specific_ts: false,
                forced_outage_hvac: false,
            })
        })
        .collect()
}

/// Turn each year's resolved borders into export rows.
///
/// Fails with "No DATA for export" when there is no year at all or when no
/// year has a single row; a year without rows on its own is kept empty.
pub fn format_export(
    resolved: &[(i32, Vec<ResolvedBorderRecord>)],
    diag: &mut Diagnostics,
) -> AdcResult<Vec<YearTable>> {
    if resolved.is_empty() {
        return Err(AdcError::no_data_for_export());
    }
    let tables: Vec<YearTable> = resolved
        .iter()
        .map(|(year, records)| YearTable {
            year: *year,
            rows: format_year(*year, records, diag),
        })
        .collect();
    if tables.iter().all(|table| table.rows.is_empty()) {
        return Err(AdcError::no_data_for_export());
    }
    for table in &tables {
        info!(year = table.year, rows = table.rows.len(), "export rows formatted");
    }
    Ok(tables)
}

fn seasonal_columns(season: Season) -> (&'static str, &'static str) {
    match season {
        Season::WinterHp => (export::WINTER_HP_DIRECT, export::WINTER_HP_INDIRECT),
        Season::WinterHc => (export::WINTER_HC_DIRECT, export::WINTER_HC_INDIRECT),
        Season::SummerHp => (export::SUMMER_HP_DIRECT, export::SUMMER_HP_INDIRECT),
        Season::SummerHc => (export::SUMMER_HC_DIRECT, export::SUMMER_HC_INDIRECT),
    }
}

/// One year's sheet, columns in export order.
pub fn export_frame(rows: &[ExportRow], layout: HvdcLayout) -> AdcResult<DataFrame> {
    let mut columns = vec![Series::new(
        export::NAME,
        rows.iter().map(|row| row.name.as_str()).collect::<Vec<_>>(),
    )];
    for season in Season::ALL {
        let (direct, indirect) = seasonal_columns(season);
        columns.push(Series::new(
            direct,
            rows.iter().map(|row| row.direct.get(season)).collect::<Vec<_>>(),
        ));
        columns.push(Series::new(
            indirect,
            rows.iter().map(|row| row.indirect.get(season)).collect::<Vec<_>>(),
        ));
    }
    columns.push(Series::new(
        export::FLOWBASED_PERIMETER,
        rows.iter().map(|row| row.flowbased_perimeter).collect::<Vec<_>>(),
    ));
    match layout {
        HvdcLayout::Split => {
            columns.push(Series::new(
                export::HVDC_DIRECT,
                rows.iter().map(|row| row.hvdc_direct).collect::<Vec<_>>(),
            ));
            columns.push(Series::new(
                export::HVDC_INDIRECT,
                rows.iter().map(|row| row.hvdc_indirect).collect::<Vec<_>>(),
            ));
        }
        HvdcLayout::Single => {
            columns.push(Series::new(
                export::HVDC,
                rows.iter().map(|row| row.hvdc_direct).collect::<Vec<_>>(),
            ));
        }
    }
    columns.push(Series::new(
        export::SPECIFIC_TS,
        rows.iter().map(|row| row.specific_ts).collect::<Vec<_>>(),
    ));
    columns.push(Series::new(
        export::FORCED_OUTAGE_HVAC,
        rows.iter().map(|row| row.forced_outage_hvac).collect::<Vec<_>>(),
    ));
    DataFrame::new(columns)
        .map_err(|err| AdcError::Parse(format!("building export frame: {err}")))
}

/// The `parameters` sheet: a blank corner cell, one straddling-year label per
/// year, and a single `Hurdle Costs` row.
pub fn parameters_frame(years: &[i32], hurdle_cost: f64) -> AdcResult<DataFrame> {
    let mut columns = vec![Series::new("", [export::HURDLE_COSTS])];
    for year in years {
        columns.push(Series::new(&straddling_year_label(*year), [hurdle_cost]));
    }
    DataFrame::new(columns)
        .map_err(|err| AdcError::Parse(format!("building parameters frame: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use adc_core::ResolutionRule;

    fn resolved(source: &str, destination: &str, mw: f64) -> ResolvedBorderRecord {
        ResolvedBorderRecord {
            zone: source.into(),
            border: format!("{source}-{destination}"),
            code_source: source.into(),
            code_destination: destination.into(),
            ntc_curve_id: None,
            seasonal: SeasonalValues::uniform(Some(mw)),
            median: None,
            rule: ResolutionRule::StaticMinimum,
        }
    }

    #[test]
    fn names_are_symmetric() {
        assert_eq!(antares_name("GR", "AL"), "AL-GR");
        assert_eq!(antares_name("AL", "GR"), antares_name("GR", "AL"));
        assert_eq!(link_direction("AL", "GR"), LinkDirection::Direct);
        assert_eq!(link_direction("GR", "AL"), LinkDirection::Indirect);
    }

    #[test]
    fn both_directions_merge_into_one_row() {
        let mut diag = Diagnostics::new();
        let tables = format_export(
            &[(2030, vec![resolved("FR", "BE", 2000.0), resolved("BE", "FR", 3000.0)])],
            &mut diag,
        )
        .unwrap();
        let row = &tables[0].rows[0];
        assert_eq!(row.name, "BE-FR");
        assert_eq!(row.direct.winter_hp, Some(3000.0));
        assert_eq!(row.indirect.winter_hp, Some(2000.0));
        assert!(!row.flowbased_perimeter);
        assert!(diag.is_empty());
    }

    #[test]
    fn one_sided_borders_are_dropped_and_counted() {
        let mut diag = Diagnostics::new();
        let tables = format_export(
            &[(
                2030,
                vec![
                    resolved("FR", "BE", 2000.0),
                    resolved("BE", "FR", 3000.0),
                    resolved("DE", "FR", 1000.0),
                    resolved("FR", "FR", 1000.0),
                ],
            )],
            &mut diag,
        )
        .unwrap();
        assert_eq!(tables[0].rows.len(), 1);
        let issue = diag.in_stage(Stage::Export).next().unwrap();
        assert_eq!(issue.entity, "DE-FR");
    }

    #[test]
    fn rows_are_sorted_by_name() {
        let mut diag = Diagnostics::new();
        let tables = format_export(
            &[(
                2030,
                vec![
                    resolved("FR", "DE", 1.0),
                    resolved("DE", "FR", 1.0),
                    resolved("BE", "FR", 1.0),
                    resolved("FR", "BE", 1.0),
                ],
            )],
            &mut diag,
        )
        .unwrap();
        let names: Vec<&str> = tables[0].rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["BE-FR", "DE-FR"]);
    }

    #[test]
    fn empty_exports_fail() {
        let mut diag = Diagnostics::new();
        let err = format_export(&[], &mut diag).unwrap_err();
        assert_eq!(err.to_string(), "No DATA for export");
        let err = format_export(&[(2030, Vec::new()), (2060, Vec::new())], &mut diag).unwrap_err();
        assert!(matches!(err, AdcError::EmptyResult(_)));
    }

    #[test]
    fn empty_year_next_to_a_full_one_is_kept() {
        let mut diag = Diagnostics::new();
        let tables = format_export(
            &[
                (2030, vec![resolved("FR", "BE", 1.0), resolved("BE", "FR", 1.0)]),
                (2060, Vec::new()),
            ],
            &mut diag,
        )
        .unwrap();
        assert_eq!(tables.len(), 2);
        assert!(tables[1].rows.is_empty());
    }

    #[test]
    fn export_columns_follow_the_layout() {
        let split = export_frame(&[], HvdcLayout::Split).unwrap();
        assert_eq!(
            split.get_column_names(),
            [
                "Name",
                "Winter_HP_Direct_MW",
                "Winter_HP_Indirect_MW",
                "Winter_HC_Direct_MW",
                "Winter_HC_Indirect_MW",
                "Summer_HP_Direct_MW",
                "Summer_HP_Indirect_MW",
                "Summer_HC_Direct_MW",
                "Summer_HC_Indirect_MW",
                "Flowbased_perimeter",
                "HVDC_Direct",
                "HVDC_Indirect",
                "Specific_TS",
                "Forced_Outage_HVAC",
            ]
        );
        let single = export_frame(&[], HvdcLayout::Single).unwrap();
        assert_eq!(single.width(), 13);
        assert!(single.get_column_names().contains(&"HVDC"));
    }

    #[test]
    fn parameters_use_straddling_years() {
        let frame = parameters_frame(&[2030, 2060], 0.5).unwrap();
        assert_eq!(frame.get_column_names(), ["", "2029-2030", "2059-2060"]);
        assert_eq!(frame.height(), 1);
        let cost = frame.column("2059-2060").unwrap().f64().unwrap().get(0);
        assert_eq!(cost, Some(0.5));
    }
}

use adc_core::{AdcError, PeriodHour, PeriodMonth};
use adc_io::{CsvDirectoryReader, ReferenceCatalog, TabularReader, WorkbookWriter, XlsxWorkbookWriter};
use polars::prelude::*;
use std::fs;
use tempfile::tempdir;

fn reference_sheets() -> Vec<(String, DataFrame)> {
    let pays = df![
        "Nom_pays" => &["Belgique", "France"],
        "code_pays" => &["BE", "FR"],
        "areas" => &["be", "fr"],
        "market_node" => &["BE00", "FR00"],
        "code_antares" => &["BE", "FR"],
    ]
    .unwrap();
    let scenarios = df![
        "YEAR" => &[2030i64, 2060],
        "STUDY_SCENARIO" => &["ERAA", "TYNDP"],
    ]
    .unwrap();
    let links = df![
        "market_node" => &["BE00", "FR00"],
        "code_antares" => &["BE", "FR"],
    ]
    .unwrap();
    let peak = df![
        "hour" => &[Some(1i64), Some(2), Some(3), Some(4)],
        "period_hour" => &[Some("HC"), Some("HC"), Some("HP"), Some("HP")],
        "month" => &[Some(1i64), Some(7), None, None],
        "period_month" => &[Some("winter"), Some("summer"), None, None],
    ]
    .unwrap();
    vec![
        ("PAYS".to_string(), pays),
        ("STUDY_SCENARIO".to_string(), scenarios),
        ("LINKS".to_string(), links),
        ("CLUSTER".to_string(), DataFrame::empty()),
        ("PEAK_PARAMS".to_string(), peak),
    ]
}

#[test]
fn catalog_loads_from_written_workbook() {
    let dir = tempdir().unwrap();
    let path = XlsxWorkbookWriter::new()
        .create_workbook(dir.path(), "MAIN_PARAMS", &reference_sheets(), false)
        .unwrap();

    let catalog = ReferenceCatalog::from_workbook(&path).unwrap();
    assert_eq!(catalog.countries().len(), 2);
    assert_eq!(catalog.scenario_for_year(2060).unwrap(), "TYNDP");
    assert_eq!(catalog.code_for_market_node("FR00"), Some("FR"));

    let peak = catalog.peak_mapping();
    assert_eq!(peak.hour_count(), 4);
    assert_eq!(peak.month_count(), 2);
    assert_eq!(peak.period_hour(3), Some(PeriodHour::Peak));
    assert_eq!(peak.period_month(7), Some(PeriodMonth::Summer));
}

#[test]
fn missing_reference_sheet_is_reported() {
    let dir = tempdir().unwrap();
    let sheets: Vec<(String, DataFrame)> = reference_sheets()
        .into_iter()
        .filter(|(name, _)| name != "LINKS")
        .collect();
    let path = XlsxWorkbookWriter::new()
        .create_workbook(dir.path(), "MAIN_PARAMS", &sheets, false)
        .unwrap();

    let err = ReferenceCatalog::from_workbook(&path).unwrap_err();
    assert!(matches!(err, AdcError::Validation(_)));
    assert!(err.to_string().contains("LINKS"));
}

#[test]
fn missing_reference_file_is_configuration_error() {
    let dir = tempdir().unwrap();
    let err = ReferenceCatalog::from_workbook(&dir.path().join("MAIN_PARAMS.xlsx")).unwrap_err();
    assert!(matches!(err, AdcError::Configuration(_)));
}

#[test]
fn csv_directory_reader_reads_contract_tables() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("NTCs.csv"),
        "MONTH,DAY,HOUR,curve_1\n1,1,1,100\n1,1,2,\n",
    )
    .unwrap();
    let reader = CsvDirectoryReader::new(dir.path());
    let frame = reader.read_table("NTCs").unwrap();
    let series = adc_io::hourly_series(&frame).unwrap();
    assert_eq!(series.len(), 2);
    assert_eq!(series.column(0), [Some(100.0), None]);
}

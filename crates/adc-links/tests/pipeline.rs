use std::fs;
use std::path::{Path, PathBuf};

use adc_core::{AdcError, RunConfiguration};
use adc_io::excel::{read_sheet, sheet_names};
use adc_io::{CsvDirectoryReader, WorkbookWriter, XlsxWorkbookWriter};
use adc_links::create_links_outputs;
use polars::prelude::*;
use tempfile::{tempdir, TempDir};

const TRANSFER_HEADER: &str = "ZONE,MARKET_ZONE_SOURCE,MARKET_ZONE_DESTINATION,TRANSFER_TYPE,STUDY_SCENARIO,YEAR_VALID_START,YEAR_VALID_END,TRANSFER_TECHNOLOGY,NTC_LIMIT_CAPACITY_STATIC,NTC_CURVE_ID,NO_POLES,FOR,COMPL,FOR_DIRECTION,EXCHANGE_FLOW_CURVE_ID";

struct Workspace {
    _root: TempDir,
    input: PathBuf,
    export: PathBuf,
    reference: PathBuf,
}

fn write_reference(dir: &Path) -> PathBuf {
    let pays = df![
        "Nom_pays" => &["Belgique", "France", "Allemagne"],
        "code_pays" => &["BE", "FR", "DE"],
        "areas" => &["be", "fr", "de"],
        "market_node" => &["BE00", "FR00", "DE00"],
        "code_antares" => &["BE", "FR", "DE"],
    ]
    .unwrap();
    let scenarios = df![
        "YEAR" => &[2030i64, 2060],
        "STUDY_SCENARIO" => &["ERAA", "TYNDP"],
    ]
    .unwrap();
    let links = df![
        "market_node" => &["BE00", "FR00", "DE00"],
        "code_antares" => &["BE", "FR", "DE"],
    ]
    .unwrap();
    let peak = df![
        "hour" => &[1i64, 2],
        "period_hour" => &["HC", "HP"],
        "month" => &[1i64, 7],
        "period_month" => &["winter", "summer"],
    ]
    .unwrap();
    let sheets = vec![
        ("PAYS".to_string(), pays),
        ("STUDY_SCENARIO".to_string(), scenarios),
        ("LINKS".to_string(), links),
        ("PEAK_PARAMS".to_string(), peak),
    ];
    XlsxWorkbookWriter::new()
        .create_workbook(dir, "MAIN_PARAMS", &sheets, false)
        .unwrap()
}

fn workspace(transfer_rows: &[&str]) -> Workspace {
    let root = tempdir().unwrap();
    let input = root.path().join("input");
    let export = root.path().join("export");
    fs::create_dir_all(&input).unwrap();
    fs::create_dir_all(&export).unwrap();

    let mut transfer = String::from(TRANSFER_HEADER);
    for row in transfer_rows {
        transfer.push('\n');
        transfer.push_str(row);
    }
    transfer.push('\n');
    fs::write(input.join("Transfer Links.csv"), transfer).unwrap();
    fs::write(
        input.join("NTCs Index.csv"),
        "CURVE_UID,ZONE,ID,LABEL,COUNT\nuid_de_fr,DE,DE-FR-1,DE to FR,1\n",
    )
    .unwrap();
    fs::write(
        input.join("NTCs.csv"),
        "MONTH,DAY,HOUR,uid_de_fr\n1,1,1,1000\n1,1,2,3000\n7,1,1,2000\n7,1,2,4000\n",
    )
    .unwrap();

    let reference = write_reference(root.path());
    Workspace {
        _root: root,
        input,
        export,
        reference,
    }
}

fn config(ws: &Workspace, years: Vec<i32>) -> RunConfiguration {
    RunConfiguration::new(&ws.input, &ws.export, "test", &ws.reference, years).unwrap()
}

fn symmetric_rows() -> Vec<&'static str> {
    vec![
        "FR,BE00,FR00,NTC,ERAA&TYNDP,2025,2035,HVAC,4300,,,,,,",
        "BE,FR00,BE00,NTC,ERAA&TYNDP,2025,2035,HVAC,3500,,,,,,",
    ]
}

fn text_column(frame: &DataFrame, name: &str) -> Vec<Option<String>> {
    frame
        .column(name)
        .unwrap()
        .utf8()
        .unwrap()
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect()
}

fn number(frame: &DataFrame, name: &str, row: usize) -> Option<f64> {
    frame.column(name).unwrap().f64().unwrap().get(row)
}

#[test]
fn symmetric_border_becomes_one_direct_row() {
    let ws = workspace(&symmetric_rows());
    let outcome = create_links_outputs(
        &config(&ws, vec![2030]),
        &CsvDirectoryReader::new(&ws.input),
        &XlsxWorkbookWriter::new(),
    )
    .unwrap();

    assert_eq!(outcome.workbook_path, ws.export.join("links_test.xlsx"));
    assert_eq!(outcome.rows_per_year[0].rows, 1);
    assert_eq!(
        sheet_names(&outcome.workbook_path).unwrap(),
        ["parameters", "2030"]
    );

    let sheet = read_sheet(&outcome.workbook_path, Some("2030")).unwrap();
    assert_eq!(text_column(&sheet, "Name"), [Some("BE-FR".to_string())]);
    assert_eq!(number(&sheet, "Winter_HP_Direct_MW", 0), Some(4300.0));
    assert_eq!(number(&sheet, "Summer_HC_Indirect_MW", 0), Some(3500.0));

    let parameters = read_sheet(&outcome.workbook_path, Some("parameters")).unwrap();
    assert_eq!(number(&parameters, "2029-2030", 0), Some(0.5));
    assert_eq!(
        text_column(&parameters, "column_0"),
        [Some("Hurdle Costs".to_string())]
    );
}

#[test]
fn curve_declaration_beats_static_one() {
    let mut rows = symmetric_rows();
    rows.push("FR,FR00,DE00,NTC,ERAA,2025,2035,HVAC,100,,,,,,");
    rows.push("FR,DE00,FR00,NTC,ERAA,2025,2035,HVAC,100,,,,,,");
    rows.push("DE,DE00,FR00,NTC,ERAA,2025,2035,HVAC,,DE-FR-1,,,,,");
    let ws = workspace(&rows);
    let outcome = create_links_outputs(
        &config(&ws, vec![2030]),
        &CsvDirectoryReader::new(&ws.input),
        &XlsxWorkbookWriter::new(),
    )
    .unwrap();

    let sheet = read_sheet(&outcome.workbook_path, Some("2030")).unwrap();
    let names = text_column(&sheet, "Name");
    assert_eq!(names, [Some("BE-FR".to_string()), Some("DE-FR".to_string())]);
    assert_eq!(number(&sheet, "Winter_HC_Direct_MW", 1), Some(1000.0));
    assert_eq!(number(&sheet, "Summer_HP_Direct_MW", 1), Some(4000.0));
    assert_eq!(number(&sheet, "Winter_HP_Indirect_MW", 1), Some(100.0));
}

#[test]
fn rerun_needs_overwrite_and_reproduces_the_export() {
    let ws = workspace(&symmetric_rows());
    let reader = CsvDirectoryReader::new(&ws.input);
    let writer = XlsxWorkbookWriter::new();
    let mut config = config(&ws, vec![2030]);

    let first = create_links_outputs(&config, &reader, &writer).unwrap();
    let before = read_sheet(&first.workbook_path, Some("2030")).unwrap();

    let err = create_links_outputs(&config, &reader, &writer).unwrap_err();
    assert!(matches!(err, AdcError::ExportConflict(_)));
    assert_eq!(err.to_string(), "This Workbook already exist: links_test.xlsx");

    config.overwrite = true;
    let second = create_links_outputs(&config, &reader, &writer).unwrap();
    let after = read_sheet(&second.workbook_path, Some("2030")).unwrap();
    assert!(before.frame_equal_missing(&after));
}

#[test]
fn every_missing_input_is_listed() {
    let ws = workspace(&symmetric_rows());
    fs::remove_file(ws.input.join("NTCs.csv")).unwrap();
    fs::remove_file(ws.input.join("Transfer Links.csv")).unwrap();
    let err = create_links_outputs(
        &config(&ws, vec![2030]),
        &CsvDirectoryReader::new(&ws.input),
        &XlsxWorkbookWriter::new(),
    )
    .unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Input file does not exist"));
    assert!(message.contains("NTCs.csv"));
    assert!(message.contains("Transfer Links.csv"));
    assert!(!message.contains("NTCs Index.csv"));
}

#[test]
fn missing_inputs_are_reported_before_the_reference_is_opened() {
    let ws = workspace(&symmetric_rows());
    fs::remove_file(ws.input.join("NTCs Index.csv")).unwrap();
    fs::write(&ws.reference, b"not a workbook").unwrap();
    let err = create_links_outputs(
        &config(&ws, vec![2030]),
        &CsvDirectoryReader::new(&ws.input),
        &XlsxWorkbookWriter::new(),
    )
    .unwrap_err();
    match err {
        AdcError::MissingInput { files, .. } => assert_eq!(files, ["NTCs Index.csv"]),
        other => panic!("expected missing input, got {other}"),
    }
}

#[test]
fn year_without_scenario_is_fatal() {
    let ws = workspace(&symmetric_rows());
    let err = create_links_outputs(
        &config(&ws, vec![2030, 2045]),
        &CsvDirectoryReader::new(&ws.input),
        &XlsxWorkbookWriter::new(),
    )
    .unwrap_err();
    assert!(matches!(err, AdcError::DataIntegrity(_)));
    assert!(!ws.export.join("links_test.xlsx").exists());
}

#[test]
fn nothing_to_export_writes_nothing() {
    let ws = workspace(&["FR,BE00,FR00,NTC,ERAA,2040,2050,HVAC,4300,,,,,,"]);
    let err = create_links_outputs(
        &config(&ws, vec![2030]),
        &CsvDirectoryReader::new(&ws.input),
        &XlsxWorkbookWriter::new(),
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "No DATA for export");
    assert!(!ws.export.join("links_test.xlsx").exists());
}

#[test]
fn empty_year_gets_a_header_only_sheet() {
    let ws = workspace(&symmetric_rows());
    let outcome = create_links_outputs(
        &config(&ws, vec![2030, 2060]),
        &CsvDirectoryReader::new(&ws.input),
        &XlsxWorkbookWriter::new(),
    )
    .unwrap();
    // 2060 runs under TYNDP; the shared tag still applies but 2060 is
    // outside the validity window.
    assert_eq!(outcome.rows_per_year[1].rows, 0);
    let sheet = read_sheet(&outcome.workbook_path, Some("2060")).unwrap();
    assert_eq!(sheet.height(), 0);
    assert_eq!(sheet.width(), 14);
}

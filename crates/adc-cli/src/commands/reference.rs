use std::io::{self, Write};
use std::path::Path;

use adc_core::{Diagnostics, Severity};
use adc_io::ReferenceCatalog;
use anyhow::{bail, Context, Result};
use serde::Serialize;
use tabwriter::TabWriter;

use adc_cli::cli::OutputFormat;

use super::write_diagnostics;

#[derive(Serialize)]
struct SheetRows {
    sheet: &'static str,
    rows: usize,
}

#[derive(Serialize)]
struct ReferenceReport<'a> {
    sheets: Vec<SheetRows>,
    diagnostics: &'a Diagnostics,
}

pub fn check(path: &Path, years: &[i32], format: OutputFormat) -> Result<()> {
    let catalog = ReferenceCatalog::from_workbook(path)
        .with_context(|| format!("loading reference workbook {}", path.display()))?;
    let diag = catalog.check(years);

    match format {
        OutputFormat::Plain => {
            let mut writer = TabWriter::new(io::stdout());
            writeln!(writer, "SHEET\tROWS")?;
            for (sheet, rows) in catalog.sheet_counts() {
                writeln!(writer, "{sheet}\t{rows}")?;
            }
            write_diagnostics(&mut writer, &diag)?;
            writer.flush()?;
        }
        OutputFormat::Json => {
            let report = ReferenceReport {
                sheets: catalog
                    .sheet_counts()
                    .into_iter()
                    .map(|(sheet, rows)| SheetRows { sheet, rows })
                    .collect(),
                diagnostics: &diag,
            };
            serde_json::to_writer_pretty(io::stdout(), &report)
                .map_err(|err| anyhow::anyhow!("serializing reference report to JSON: {err}"))?;
            println!();
        }
    }

    let errors = diag.count(Severity::Error);
    if errors > 0 {
        bail!(
            "reference workbook {} has {} error(s)",
            path.display(),
            errors
        );
    }
    Ok(())
}

use std::io::{self, Write};

use adc_core::RunSettings;
use adc_io::{CsvDirectoryReader, XlsxWorkbookWriter};
use adc_links::{create_links_outputs, LinksOutcome};
use anyhow::{bail, Context, Result};
use tabwriter::TabWriter;
use tracing::info;

use adc_cli::cli::{LinksArgs, OutputFormat};

use super::write_diagnostics;

pub fn handle(args: &LinksArgs) -> Result<()> {
    let from_file = match &args.config {
        Some(path) => RunSettings::from_toml_path(path)
            .with_context(|| format!("loading run file {}", path.display()))?,
        None => RunSettings::default(),
    };
    let config = from_file
        .overridden_by(args.settings())
        .validate()
        .context("validating run configuration")?;

    if !args.separator.is_ascii() {
        bail!("separator must be a single ASCII character, got '{}'", args.separator);
    }
    let reader = CsvDirectoryReader::new(&config.input_dir).with_separator(args.separator as u8);
    let writer = XlsxWorkbookWriter::new();

    info!(
        "Building links workbook for scenario {} into {}",
        config.scenario_name,
        config.export_dir.display()
    );
    let outcome = create_links_outputs(&config, &reader, &writer)
        .with_context(|| format!("links run for scenario '{}'", config.scenario_name))?;

    match args.format {
        OutputFormat::Plain => print_outcome_table(&outcome),
        OutputFormat::Json => print_outcome_json(&outcome),
    }
}

fn print_outcome_table(outcome: &LinksOutcome) -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "Wrote {}", outcome.workbook_path.display())?;
    writeln!(writer, "YEAR\tROWS")?;
    for year in &outcome.rows_per_year {
        writeln!(writer, "{}\t{}", year.year, year.rows)?;
    }
    write_diagnostics(&mut writer, &outcome.diagnostics)?;
    writer.flush()?;
    Ok(())
}

fn print_outcome_json(outcome: &LinksOutcome) -> Result<()> {
    serde_json::to_writer_pretty(io::stdout(), outcome)
        .map_err(|err| anyhow::anyhow!("serializing links summary to JSON: {err}"))?;
    println!();
    Ok(())
}

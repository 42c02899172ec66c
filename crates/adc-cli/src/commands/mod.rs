pub mod completions;
pub mod links;
pub mod reference;

use std::io::Write;

use adc_core::Diagnostics;
use anyhow::Result;

/// Tab-aligned issue listing shared by the plain-text reports.
pub(crate) fn write_diagnostics<W: Write>(writer: &mut W, diag: &Diagnostics) -> Result<()> {
    writeln!(writer, "{}", diag.summary())?;
    if diag.is_empty() {
        return Ok(());
    }
    writeln!(writer, "SEVERITY\tSTAGE\tENTITY\tMESSAGE")?;
    for issue in diag.issues() {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            issue.severity.label(),
            issue.stage,
            issue.entity,
            issue.message
        )?;
    }
    Ok(())
}

//! # adc-links: NTC link-capacity resolution
//!
//! Turns the "Transfer Links", "NTCs Index" and "NTCs" tables into one
//! capacity profile per border and per study year, ready for the ANTARES
//! links workbook.
//!
//! Stages, in run order:
//!
//! 1. [`reducer`] - seasonal and overall medians of every hourly curve
//! 2. [`joiner`] - NTC/HVAC records joined with curve medians and endpoint codes
//! 3. [`filter`] - records of the year's study scenario and validity window
//! 4. [`resolver`] - one record per border out of multi-operator declarations
//! 5. [`formatter`] - canonical names, direct/indirect columns, export frames
//!
//! [`pipeline`] chains them: [`resolve_links`] in memory,
//! [`create_links_outputs`] from input directory to workbook.

pub mod filter;
pub mod formatter;
pub mod joiner;
pub mod pipeline;
pub mod reducer;
pub mod resolver;

pub use filter::{filter_year, StudyScenario};
pub use formatter::{antares_name, export_frame, format_export, parameters_frame, YearTable};
pub use pipeline::{
    create_links_outputs, links_sheets, resolve_links, LinksInputs, LinksOutcome,
    LinksResolution, YearRows,
};
pub use resolver::resolve_borders;

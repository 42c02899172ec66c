//! # adc-core: Domain model for cross-border capacity data collection
//!
//! Shared vocabulary of the workspace: the records that flow through the
//! link-capacity resolution pipeline, the exact column names of every input
//! and output table, the error taxonomy and the run configuration.
//!
//! ## Modules
//!
//! - [`types`] - Transfer records, curve medians, resolved borders, export rows
//! - [`columns`] - Frozen column-name contracts, validated against file headers
//! - [`config`] - [`RunConfiguration`] and its TOML-backed [`RunSettings`]
//! - [`diagnostics`] - Non-fatal data-quality issues collected during a run
//! - [`error`] - [`AdcError`] and the [`AdcResult`] alias
//!
//! ## Integration
//!
//! `adc-io` reads tables and reference workbooks into these types and writes
//! the export workbook; `adc-links` implements the resolution pipeline on top
//! of them.

pub mod columns;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod types;

pub use config::{HvdcLayout, RunConfiguration, RunSettings};
pub use diagnostics::{DiagnosticIssue, Diagnostics, Severity, Stage};
pub use error::{AdcError, AdcResult};
pub use types::{
    CurveMedianProfile, ExportRow, HourStamp, HourlyCapacitySeries, LinkDirection, LinkRecord,
    NtcIndexEntry, PeakPeriodMapping, PeriodHour, PeriodMonth, ResolutionRule,
    ResolvedBorderRecord, Season, SeasonalValues, TransferRecord,
};

//! Data-quality issues met during a links run.
//!
//! Incomplete reference data, unmapped calendar hours or borders dropped by a
//! join do not stop a run. Each one is logged when it happens and kept here,
//! tagged with the pipeline [`Stage`] that raised it and the border, node,
//! curve or year it is about.
//!
//! ```
//! use adc_core::diagnostics::{Diagnostics, Severity, Stage};
//!
//! let mut diag = Diagnostics::new();
//! diag.warn(Stage::Join, "market node missing from LINKS", "XX00");
//!
//! assert_eq!(diag.count(Severity::Warning), 1);
//! assert_eq!(diag.in_stage(Stage::Join).count(), 1);
//! ```

use std::fmt;

use serde::Serialize;
use tracing::{error, warn};

/// Pipeline stage an issue was raised in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Reference workbook loading and `reference check`
    Reference,
    /// Seasonal reduction of the hourly curves
    Timeseries,
    /// Curve and market-node lookups
    Join,
    /// Multi-operator resolution
    Resolution,
    /// Direct/indirect pairing and sheet layout
    Export,
}

impl Stage {
    pub fn label(self) -> &'static str {
        match self {
            Stage::Reference => "reference",
            Stage::Timeseries => "timeseries",
            Stage::Join => "join",
            Stage::Resolution => "resolution",
            Stage::Export => "export",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Data was skipped or left empty; the export is still usable
    Warning,
    /// Reference data is inconsistent enough to distrust any export
    Error,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    pub stage: Stage,
    pub message: String,
    pub entity: String,
}

impl fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}: {}",
            self.severity.label(),
            self.stage,
            self.entity,
            self.message
        )
    }
}

/// Issues of one run, in the order they were raised.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, stage: Stage, message: impl Into<String>, entity: impl Into<String>) {
        self.record(Severity::Warning, stage, message.into(), entity.into());
    }

    pub fn error(&mut self, stage: Stage, message: impl Into<String>, entity: impl Into<String>) {
        self.record(Severity::Error, stage, message.into(), entity.into());
    }

    fn record(&mut self, severity: Severity, stage: Stage, message: String, entity: String) {
        match severity {
            Severity::Warning => warn!(stage = %stage, entity = %entity, "{message}"),
            Severity::Error => error!(stage = %stage, entity = %entity, "{message}"),
        }
        self.issues.push(DiagnosticIssue {
            severity,
            stage,
            message,
            entity,
        });
    }

    pub fn issues(&self) -> &[DiagnosticIssue] {
        &self.issues
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    pub fn in_stage(&self, stage: Stage) -> impl Iterator<Item = &DiagnosticIssue> + '_ {
        self.issues.iter().filter(move |i| i.stage == stage)
    }

    /// `no issues`, `1 warning`, `3 warnings, 1 error`, ...
    pub fn summary(&self) -> String {
        let counted = |n: usize, word: &str| match n {
            1 => format!("1 {word}"),
            n => format!("{n} {word}s"),
        };
        match (self.count(Severity::Warning), self.count(Severity::Error)) {
            (0, 0) => "no issues".to_string(),
            (w, 0) => counted(w, "warning"),
            (0, e) => counted(e, "error"),
            (w, e) => format!("{}, {}", counted(w, "warning"), counted(e, "error")),
        }
    }
}

//! Run configuration.
//!
//! A run is described by [`RunSettings`] (plain, deserializable, possibly
//! incomplete) and validated into a [`RunConfiguration`] before anything is
//! read. Validation is eager: missing directories, a blank scenario name or a
//! missing reference workbook are reported at construction time.
//!
//! A TOML run file looks like:
//!
//! ```toml
//! input_dir = "data/links"
//! export_dir = "out"
//! scenario_name = "ERAA_2025"
//! reference_path = "data/MAIN_PARAMS.xlsx"
//! calendar_years = [2030, 2060]
//! overwrite = false
//! hvdc_layout = "split"
//! hurdle_cost = 0.5
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AdcError, AdcResult};

pub const DEFAULT_CALENDAR_YEARS: [i32; 2] = [2030, 2060];
pub const DEFAULT_HURDLE_COST: f64 = 0.5;

/// How the HVDC columns of the export are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HvdcLayout {
    /// `HVDC_Direct` and `HVDC_Indirect`
    #[default]
    Split,
    /// A single `HVDC` column
    Single,
}

/// Unvalidated run parameters, as read from a TOML file or assembled by the CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSettings {
    pub input_dir: Option<PathBuf>,
    pub export_dir: Option<PathBuf>,
    pub scenario_name: Option<String>,
    pub reference_path: Option<PathBuf>,
    #[serde(default)]
    pub calendar_years: Option<Vec<i32>>,
    #[serde(default)]
    pub overwrite: Option<bool>,
    #[serde(default)]
    pub hvdc_layout: Option<HvdcLayout>,
    #[serde(default)]
    pub hurdle_cost: Option<f64>,
}

impl RunSettings {
    /// Misspelled keys are rejected rather than left at their default.
    pub fn from_toml_str(text: &str) -> AdcResult<Self> {
        toml::from_str(text)
            .map_err(|err| AdcError::Configuration(format!("invalid run file: {err}")))
    }

    pub fn from_toml_path(path: &Path) -> AdcResult<Self> {
        let text = fs::read_to_string(path).map_err(|err| {
            AdcError::Configuration(format!("reading run file '{}': {err}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Fields set in `other` win over fields set in `self`.
    pub fn overridden_by(self, other: RunSettings) -> RunSettings {
        RunSettings {
            input_dir: other.input_dir.or(self.input_dir),
            export_dir: other.export_dir.or(self.export_dir),
            scenario_name: other.scenario_name.or(self.scenario_name),
            reference_path: other.reference_path.or(self.reference_path),
            calendar_years: other.calendar_years.or(self.calendar_years),
            overwrite: other.overwrite.or(self.overwrite),
            hvdc_layout: other.hvdc_layout.or(self.hvdc_layout),
            hurdle_cost: other.hurdle_cost.or(self.hurdle_cost),
        }
    }

    pub fn validate(self) -> AdcResult<RunConfiguration> {
        let input_dir = self
            .input_dir
            .ok_or_else(|| AdcError::Configuration("input directory is not set".into()))?;
        let export_dir = self
            .export_dir
            .ok_or_else(|| AdcError::Configuration("export directory is not set".into()))?;
        let reference_path = self
            .reference_path
            .ok_or_else(|| AdcError::Configuration("reference workbook is not set".into()))?;
        let mut config = RunConfiguration::new(
            input_dir,
            export_dir,
            self.scenario_name.unwrap_or_default(),
            reference_path,
            self.calendar_years
                .unwrap_or_else(|| DEFAULT_CALENDAR_YEARS.to_vec()),
        )?;
        config.overwrite = self.overwrite.unwrap_or(false);
        config.hvdc_layout = self.hvdc_layout.unwrap_or_default();
        if let Some(cost) = self.hurdle_cost {
            if !cost.is_finite() || cost < 0.0 {
                return Err(AdcError::Configuration(format!(
                    "hurdle cost must be a non-negative number, got {cost}"
                )));
            }
            config.hurdle_cost = cost;
        }
        Ok(config)
    }
}

/// Validated parameters of one links run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunConfiguration {
    pub input_dir: PathBuf,
    pub export_dir: PathBuf,
    pub scenario_name: String,
    pub reference_path: PathBuf,
    pub calendar_years: Vec<i32>,
    pub overwrite: bool,
    pub hvdc_layout: HvdcLayout,
    pub hurdle_cost: f64,
}

impl RunConfiguration {
    pub fn new(
        input_dir: impl Into<PathBuf>,
        export_dir: impl Into<PathBuf>,
        scenario_name: impl Into<String>,
        reference_path: impl Into<PathBuf>,
        calendar_years: Vec<i32>,
    ) -> AdcResult<Self> {
        let config = Self {
            input_dir: input_dir.into(),
            export_dir: export_dir.into(),
            scenario_name: scenario_name.into(),
            reference_path: reference_path.into(),
            calendar_years,
            overwrite: false,
            hvdc_layout: HvdcLayout::default(),
            hurdle_cost: DEFAULT_HURDLE_COST,
        };
        config.validate()?;
        Ok(config)
    }

    /// Same as [`Self::new`] with the default target years.
    pub fn with_default_years(
        input_dir: impl Into<PathBuf>,
        export_dir: impl Into<PathBuf>,
        scenario_name: impl Into<String>,
        reference_path: impl Into<PathBuf>,
    ) -> AdcResult<Self> {
        Self::new(
            input_dir,
            export_dir,
            scenario_name,
            reference_path,
            DEFAULT_CALENDAR_YEARS.to_vec(),
        )
    }

    fn validate(&self) -> AdcResult<()> {
        if !self.input_dir.is_dir() {
            return Err(AdcError::Configuration(format!(
                "Input directory does not exist: {}",
                self.input_dir.display()
            )));
        }
        if !self.export_dir.is_dir() {
            return Err(AdcError::Configuration(format!(
                "Export directory does not exist: {}",
                self.export_dir.display()
            )));
        }
        if self.scenario_name.trim().is_empty() {
            return Err(AdcError::Configuration(
                "Scenario name cannot be empty".into(),
            ));
        }
        if !self.reference_path.exists() {
            return Err(AdcError::Configuration(format!(
                "Data references file does not exist: {}",
                self.reference_path.display()
            )));
        }
        if self.calendar_years.is_empty() {
            return Err(AdcError::Configuration(
                "at least one calendar year is required".into(),
            ));
        }
        Ok(())
    }

    /// `links_{scenario_name}`, without extension.
    pub fn workbook_name(&self) -> String {
        format!("links_{}", self.scenario_name)
    }
}

//! Reference workbook: country codes, scenario calendar and peak periods.
//!
//! The workbook is read once per run into a [`ReferenceCatalog`] that every
//! pipeline stage borrows read-only.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use adc_core::columns::{
    reference, LINKS_CONTRACT, PAYS_CONTRACT, PEAK_PARAMS_CONTRACT, STUDY_SCENARIO_CONTRACT,
};
use adc_core::diagnostics::Stage;
use adc_core::{AdcError, AdcResult, Diagnostics, PeakPeriodMapping, PeriodHour, PeriodMonth};
use polars::prelude::*;
use tracing::{debug, info};

use crate::excel;
use crate::records::validate_headers;
use crate::values::{column, int_values, string_values};

/// Row of the PAYS sheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CountryEntry {
    pub name: Option<String>,
    pub code_pays: Option<String>,
    pub area: Option<String>,
    pub market_node: String,
    pub code_antares: String,
}

/// Row of the STUDY_SCENARIO sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioEntry {
    pub year: i32,
    pub scenario: String,
}

/// Row of the LINKS sheet: which ANTARES code a market node belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeCode {
    pub market_node: String,
    pub code_antares: String,
}

/// Read-only reference data for one run.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCatalog {
    countries: Vec<CountryEntry>,
    scenarios: Vec<ScenarioEntry>,
    links: Vec<NodeCode>,
    peak: PeakPeriodMapping,
    node_codes: HashMap<String, usize>,
}

impl ReferenceCatalog {
    pub fn new(
        countries: Vec<CountryEntry>,
        scenarios: Vec<ScenarioEntry>,
        links: Vec<NodeCode>,
        peak: PeakPeriodMapping,
    ) -> Self {
        let mut node_codes = HashMap::with_capacity(links.len());
        for (idx, link) in links.iter().enumerate() {
            // First declaration of a node wins; duplicates are reported by `check`.
            node_codes.entry(link.market_node.clone()).or_insert(idx);
        }
        Self {
            countries,
            scenarios,
            links,
            peak,
            node_codes,
        }
    }

    /// Load the PAYS, STUDY_SCENARIO, LINKS and PEAK_PARAMS sheets.
    pub fn from_workbook(path: &Path) -> AdcResult<Self> {
        if !path.is_file() {
            return Err(AdcError::Configuration(format!(
                "Data references file does not exist: {}",
                path.display()
            )));
        }
        let pays = excel::read_sheet(path, Some(reference::SHEET_PAYS))?;
        let scenarios = excel::read_sheet(path, Some(reference::SHEET_STUDY_SCENARIO))?;
        let links = excel::read_sheet(path, Some(reference::SHEET_LINKS))?;
        let peak = excel::read_sheet(path, Some(reference::SHEET_PEAK_PARAMS))?;
        let catalog = Self::from_frames(&pays, &scenarios, &links, &peak)?;
        info!(
            path = %path.display(),
            countries = catalog.countries.len(),
            scenarios = catalog.scenarios.len(),
            links = catalog.links.len(),
            hours = catalog.peak.hour_count(),
            months = catalog.peak.month_count(),
            "reference catalog loaded"
        );
        Ok(catalog)
    }

    /// Build a catalog from the four reference sheets already read as frames.
    pub fn from_frames(
        pays: &DataFrame,
        scenarios: &DataFrame,
        links: &DataFrame,
        peak: &DataFrame,
    ) -> AdcResult<Self> {
        Ok(Self::new(
            countries_from(pays)?,
            scenarios_from(scenarios)?,
            links_from(links)?,
            peak_from(peak)?,
        ))
    }

    pub fn countries(&self) -> &[CountryEntry] {
        &self.countries
    }

    pub fn scenarios(&self) -> &[ScenarioEntry] {
        &self.scenarios
    }

    pub fn links(&self) -> &[NodeCode] {
        &self.links
    }

    pub fn peak_mapping(&self) -> &PeakPeriodMapping {
        &self.peak
    }

    /// ANTARES code of a market node, from the LINKS sheet.
    pub fn code_for_market_node(&self, market_node: &str) -> Option<&str> {
        self.node_codes
            .get(market_node)
            .map(|idx| self.links[*idx].code_antares.as_str())
    }

    /// The scenario tag of `year`; exactly one STUDY_SCENARIO row must match.
    pub fn scenario_for_year(&self, year: i32) -> AdcResult<&str> {
        let mut matches = self.scenarios.iter().filter(|entry| entry.year == year);
        match (matches.next(), matches.next()) {
            (Some(entry), None) => Ok(entry.scenario.as_str()),
            (None, _) => Err(AdcError::DataIntegrity(format!(
                "no STUDY_SCENARIO row for year {year}"
            ))),
            (Some(_), Some(_)) => Err(AdcError::DataIntegrity(format!(
                "several STUDY_SCENARIO rows for year {year}"
            ))),
        }
    }

    /// Row counts per loaded sheet, in workbook order.
    pub fn sheet_counts(&self) -> Vec<(&'static str, usize)> {
        vec![
            (reference::SHEET_PAYS, self.countries.len()),
            (reference::SHEET_STUDY_SCENARIO, self.scenarios.len()),
            (reference::SHEET_LINKS, self.links.len()),
            (
                reference::SHEET_PEAK_PARAMS,
                self.peak.hour_count().max(self.peak.month_count()),
            ),
        ]
    }

    /// Consistency report over the whole catalog.
    ///
    /// `years` are the calendar years a run would target; each must have
    /// exactly one scenario row.
    pub fn check(&self, years: &[i32]) -> Diagnostics {
        let mut diag = Diagnostics::new();

        let mut seen = BTreeMap::new();
        for link in &self.links {
            *seen.entry(link.market_node.as_str()).or_insert(0usize) += 1;
        }
        for (node, count) in seen.iter().filter(|(_, count)| **count > 1) {
            diag.error(
                Stage::Reference,
                format!("market node declared {count} times in LINKS"),
                *node,
            );
        }

        let known_codes: BTreeSet<&str> = self
            .countries
            .iter()
            .map(|c| c.code_antares.as_str())
            .collect();
        let unknown_codes: BTreeSet<&str> = self
            .links
            .iter()
            .map(|l| l.code_antares.as_str())
            .filter(|code| !known_codes.contains(code))
            .collect();
        for code in unknown_codes {
            diag.warn(
                Stage::Reference,
                "LINKS code_antares missing from PAYS",
                code,
            );
        }

        for year in years {
            if let Err(err) = self.scenario_for_year(*year) {
                diag.error(Stage::Reference, err.to_string(), year.to_string());
            }
        }

        let first_hour = if self.peak.period_hour(0).is_some() { 0 } else { 1 };
        let unmapped_hours: Vec<String> = (first_hour..first_hour + 24)
            .filter(|hour| self.peak.period_hour(*hour).is_none())
            .map(|hour| hour.to_string())
            .collect();
        if !unmapped_hours.is_empty() {
            diag.warn(
                Stage::Reference,
                "hours without a peak period in PEAK_PARAMS",
                unmapped_hours.join(", "),
            );
        }
        let unmapped_months: Vec<String> = (1..=12)
            .filter(|month| self.peak.period_month(*month).is_none())
            .map(|month| month.to_string())
            .collect();
        if !unmapped_months.is_empty() {
            diag.warn(
                Stage::Reference,
                "months without a season in PEAK_PARAMS",
                unmapped_months.join(", "),
            );
        }

        debug!(issues = diag.issues().len(), "reference check done");
        diag
    }
}

fn countries_from(df: &DataFrame) -> AdcResult<Vec<CountryEntry>> {
    validate_headers(df, &PAYS_CONTRACT)?;
    let table = PAYS_CONTRACT.table;
    let optional = |name: &str| -> AdcResult<Vec<Option<String>>> {
        match df.column(name) {
            Ok(series) => string_values(series),
            Err(_) => Ok(vec![None; df.height()]),
        }
    };
    let names = optional(reference::NOM_PAYS)?;
    let codes = optional(reference::CODE_PAYS)?;
    let areas = optional(reference::AREAS)?;
    let nodes = string_values(column(df, table, reference::MARKET_NODE)?)?;
    let antares = string_values(column(df, table, reference::CODE_ANTARES)?)?;

    Ok((0..df.height())
        .filter_map(|row| {
            Some(CountryEntry {
                name: names[row].clone(),
                code_pays: codes[row].clone(),
                area: areas[row].clone(),
                market_node: nodes[row].clone()?,
                code_antares: antares[row].clone()?,
            })
        })
        .collect())
}

fn scenarios_from(df: &DataFrame) -> AdcResult<Vec<ScenarioEntry>> {
    validate_headers(df, &STUDY_SCENARIO_CONTRACT)?;
    let table = STUDY_SCENARIO_CONTRACT.table;
    let years = int_values(column(df, table, reference::YEAR)?)?;
    let tags = string_values(column(df, table, reference::STUDY_SCENARIO)?)?;
    years
        .into_iter()
        .zip(tags)
        .filter_map(|(year, tag)| Some((year?, tag?)))
        .map(|(year, scenario)| -> AdcResult<ScenarioEntry> {
            let year = i32::try_from(year).map_err(|_| {
                AdcError::Validation(format!("STUDY_SCENARIO holds an invalid year: {year}"))
            })?;
            Ok(ScenarioEntry { year, scenario })
        })
        .collect()
}

fn links_from(df: &DataFrame) -> AdcResult<Vec<NodeCode>> {
    validate_headers(df, &LINKS_CONTRACT)?;
    let table = LINKS_CONTRACT.table;
    let nodes = string_values(column(df, table, reference::MARKET_NODE)?)?;
    let codes = string_values(column(df, table, reference::CODE_ANTARES)?)?;
    Ok(nodes
        .into_iter()
        .zip(codes)
        .filter_map(|(node, code)| {
            Some(NodeCode {
                market_node: node?,
                code_antares: code?,
            })
        })
        .collect())
}

/// Hour and month halves of PEAK_PARAMS are read independently; each half
/// ends at its first blank row.
fn peak_from(df: &DataFrame) -> AdcResult<PeakPeriodMapping> {
    validate_headers(df, &PEAK_PARAMS_CONTRACT)?;
    let table = PEAK_PARAMS_CONTRACT.table;
    let hours = int_values(column(df, table, reference::HOUR)?)?;
    let hour_tags = string_values(column(df, table, reference::PERIOD_HOUR)?)?;
    let months = int_values(column(df, table, reference::MONTH)?)?;
    let month_tags = string_values(column(df, table, reference::PERIOD_MONTH)?)?;

    let mut mapping = PeakPeriodMapping::new();
    for (hour, tag) in hours.into_iter().zip(hour_tags) {
        let (Some(hour), Some(tag)) = (hour, tag) else {
            break;
        };
        let hour = calendar_value(hour, reference::HOUR)?;
        let period: PeriodHour = tag.parse()?;
        if let Some(previous) = mapping.insert_hour(hour, period) {
            if previous != period {
                return Err(AdcError::Validation(format!(
                    "PEAK_PARAMS maps hour {hour} to both {} and {}",
                    previous.label(),
                    period.label()
                )));
            }
        }
    }
    for (month, tag) in months.into_iter().zip(month_tags) {
        let (Some(month), Some(tag)) = (month, tag) else {
            break;
        };
        let month = calendar_value(month, reference::MONTH)?;
        let period: PeriodMonth = tag.parse()?;
        if let Some(previous) = mapping.insert_month(month, period) {
            if previous != period {
                return Err(AdcError::Validation(format!(
                    "PEAK_PARAMS maps month {month} to both {} and {}",
                    previous.label(),
                    period.label()
                )));
            }
        }
    }
    Ok(mapping)
}

fn calendar_value(value: i64, name: &str) -> AdcResult<u32> {
    u32::try_from(value)
        .map_err(|_| AdcError::Validation(format!("PEAK_PARAMS {name} out of range: {value}")))
}

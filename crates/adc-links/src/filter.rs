//! Per-year selection of joined records.

use std::str::FromStr;

use adc_core::{AdcError, AdcResult, LinkRecord};
use adc_io::ReferenceCatalog;
use tracing::debug;

/// Tag of records shared by both study scenarios.
pub const SHARED_SCENARIO: &str = "ERAA&TYNDP";

/// Study scenario a calendar year is run under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyScenario {
    Eraa,
    Tyndp,
}

impl StudyScenario {
    pub fn label(self) -> &'static str {
        match self {
            StudyScenario::Eraa => "ERAA",
            StudyScenario::Tyndp => "TYNDP",
        }
    }

    /// Whether a record tagged `tag` belongs to this scenario.
    pub fn accepts(self, tag: &str) -> bool {
        let tag = tag.trim();
        tag == self.label() || tag == SHARED_SCENARIO
    }
}

impl FromStr for StudyScenario {
    type Err = AdcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ERAA" => Ok(StudyScenario::Eraa),
            "TYNDP" => Ok(StudyScenario::Tyndp),
            other => Err(AdcError::Validation(format!(
                "unsupported study scenario '{other}'; expected ERAA or TYNDP"
            ))),
        }
    }
}

/// Records of `year`'s scenario whose validity window contains `year`.
///
/// An empty result is not an error.
pub fn filter_year(
    records: &[LinkRecord],
    catalog: &ReferenceCatalog,
    year: i32,
) -> AdcResult<Vec<LinkRecord>> {
    let scenario: StudyScenario = catalog.scenario_for_year(year)?.parse()?;
    let kept: Vec<LinkRecord> = records
        .iter()
        .filter(|link| scenario.accepts(&link.record.study_scenario))
        .filter(|link| link.record.is_valid_in(year))
        .cloned()
        .collect();
    debug!(
        year,
        scenario = scenario.label(),
        kept = kept.len(),
        "records selected for year"
    );
    Ok(kept)
}

//! Domain records flowing through the links pipeline.
//!
//! Everything here is created fresh for one run: raw records come out of the
//! input tables, derived records are produced by the pipeline stages and never
//! mutated once handed to the next stage.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AdcError;

/// Peak (`HP`, heures pleines) or off-peak (`HC`, heures creuses) hour tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PeriodHour {
    #[serde(rename = "HP")]
    Peak,
    #[serde(rename = "HC")]
    OffPeak,
}

impl PeriodHour {
    pub fn label(self) -> &'static str {
        match self {
            PeriodHour::Peak => "HP",
            PeriodHour::OffPeak => "HC",
        }
    }
}

impl FromStr for PeriodHour {
    type Err = AdcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HP" => Ok(PeriodHour::Peak),
            "HC" => Ok(PeriodHour::OffPeak),
            other => Err(AdcError::Validation(format!(
                "unknown hour period '{other}'; expected HP or HC"
            ))),
        }
    }
}

/// Winter or summer month tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodMonth {
    Winter,
    Summer,
}

impl PeriodMonth {
    pub fn label(self) -> &'static str {
        match self {
            PeriodMonth::Winter => "winter",
            PeriodMonth::Summer => "summer",
        }
    }
}

impl FromStr for PeriodMonth {
    type Err = AdcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "winter" => Ok(PeriodMonth::Winter),
            "summer" => Ok(PeriodMonth::Summer),
            other => Err(AdcError::Validation(format!(
                "unknown month period '{other}'; expected winter or summer"
            ))),
        }
    }
}

/// One of the four season x period combinations a curve is reduced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Season {
    WinterHp,
    WinterHc,
    SummerHp,
    SummerHc,
}

impl Season {
    /// Export order: winter before summer, peak before off-peak.
    pub const ALL: [Season; 4] = [
        Season::WinterHp,
        Season::WinterHc,
        Season::SummerHp,
        Season::SummerHc,
    ];

    pub fn new(month: PeriodMonth, hour: PeriodHour) -> Self {
        match (month, hour) {
            (PeriodMonth::Winter, PeriodHour::Peak) => Season::WinterHp,
            (PeriodMonth::Winter, PeriodHour::OffPeak) => Season::WinterHc,
            (PeriodMonth::Summer, PeriodHour::Peak) => Season::SummerHp,
            (PeriodMonth::Summer, PeriodHour::OffPeak) => Season::SummerHc,
        }
    }

    /// `WINTER_HP`, `SUMMER_HC`, ...
    pub fn label(self) -> String {
        let (month, hour) = self.parts();
        format!("{}_{}", month.label(), hour.label()).to_ascii_uppercase()
    }

    pub fn parts(self) -> (PeriodMonth, PeriodHour) {
        match self {
            Season::WinterHp => (PeriodMonth::Winter, PeriodHour::Peak),
            Season::WinterHc => (PeriodMonth::Winter, PeriodHour::OffPeak),
            Season::SummerHp => (PeriodMonth::Summer, PeriodHour::Peak),
            Season::SummerHc => (PeriodMonth::Summer, PeriodHour::OffPeak),
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Capacity values (MW) for the four seasons; `None` means no data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonalValues {
    pub winter_hp: Option<f64>,
    pub winter_hc: Option<f64>,
    pub summer_hp: Option<f64>,
    pub summer_hc: Option<f64>,
}

impl SeasonalValues {
    /// Same value in every season.
    pub fn uniform(value: Option<f64>) -> Self {
        Self {
            winter_hp: value,
            winter_hc: value,
            summer_hp: value,
            summer_hc: value,
        }
    }

    pub fn get(&self, season: Season) -> Option<f64> {
        match season {
            Season::WinterHp => self.winter_hp,
            Season::WinterHc => self.winter_hc,
            Season::SummerHp => self.summer_hp,
            Season::SummerHc => self.summer_hc,
        }
    }

    pub fn set(&mut self, season: Season, value: Option<f64>) {
        match season {
            Season::WinterHp => self.winter_hp = value,
            Season::WinterHc => self.winter_hc = value,
            Season::SummerHp => self.summer_hp = value,
            Season::SummerHc => self.summer_hc = value,
        }
    }

    pub fn is_empty(&self) -> bool {
        Season::ALL.iter().all(|s| self.get(*s).is_none())
    }
}

/// Hour -> HP/HC and month -> winter/summer lookup, loaded once per run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeakPeriodMapping {
    hours: BTreeMap<u32, PeriodHour>,
    months: BTreeMap<u32, PeriodMonth>,
}

impl PeakPeriodMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hour(mut self, hour: u32, period: PeriodHour) -> Self {
        self.hours.insert(hour, period);
        self
    }

    pub fn with_month(mut self, month: u32, period: PeriodMonth) -> Self {
        self.months.insert(month, period);
        self
    }

    /// Returns the previous tag when `hour` was already mapped.
    pub fn insert_hour(&mut self, hour: u32, period: PeriodHour) -> Option<PeriodHour> {
        self.hours.insert(hour, period)
    }

    /// Returns the previous tag when `month` was already mapped.
    pub fn insert_month(&mut self, month: u32, period: PeriodMonth) -> Option<PeriodMonth> {
        self.months.insert(month, period)
    }

    pub fn period_hour(&self, hour: u32) -> Option<PeriodHour> {
        self.hours.get(&hour).copied()
    }

    pub fn period_month(&self, month: u32) -> Option<PeriodMonth> {
        self.months.get(&month).copied()
    }

    /// Season of an hourly observation, if both its hour and month are mapped.
    pub fn season(&self, month: u32, hour: u32) -> Option<Season> {
        Some(Season::new(self.period_month(month)?, self.period_hour(hour)?))
    }

    pub fn hour_count(&self) -> usize {
        self.hours.len()
    }

    pub fn month_count(&self) -> usize {
        self.months.len()
    }
}

/// Calendar stamp of one row of the hourly table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HourStamp {
    pub month: u32,
    pub day: u32,
    pub hour: u32,
}

/// The "NTCs" table in its native wide shape: one value column per curve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HourlyCapacitySeries {
    curve_ids: Vec<String>,
    stamps: Vec<HourStamp>,
    values: Vec<Vec<Option<f64>>>,
}

impl HourlyCapacitySeries {
    pub fn new(curve_ids: Vec<String>) -> Self {
        let values = vec![Vec::new(); curve_ids.len()];
        Self {
            curve_ids,
            stamps: Vec::new(),
            values,
        }
    }

    /// Append one hourly row; `row` holds one value per curve, in curve order.
    pub fn push_row(&mut self, stamp: HourStamp, row: &[Option<f64>]) -> Result<(), AdcError> {
        if row.len() != self.curve_ids.len() {
            return Err(AdcError::Validation(format!(
                "hourly row has {} values but the series has {} curves",
                row.len(),
                self.curve_ids.len()
            )));
        }
        self.stamps.push(stamp);
        for (column, value) in self.values.iter_mut().zip(row) {
            column.push(*value);
        }
        Ok(())
    }

    pub fn curve_ids(&self) -> &[String] {
        &self.curve_ids
    }

    pub fn stamps(&self) -> &[HourStamp] {
        &self.stamps
    }

    /// Values of one curve, aligned with [`Self::stamps`].
    pub fn column(&self, index: usize) -> &[Option<f64>] {
        &self.values[index]
    }

    pub fn len(&self) -> usize {
        self.stamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stamps.is_empty()
    }

}

/// Seasonal and overall medians of one curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurveMedianProfile {
    pub curve_uid: String,
    pub seasonal: SeasonalValues,
    pub median: Option<f64>,
}

/// Row of the "NTCs Index" table: which zone-local id a curve is published under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NtcIndexEntry {
    pub curve_uid: String,
    pub zone: String,
    pub id: String,
}

/// Raw "Transfer Links" row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransferRecord {
    pub zone: String,
    pub market_zone_source: String,
    pub market_zone_destination: String,
    pub transfer_type: String,
    pub transfer_technology: String,
    pub study_scenario: String,
    pub year_valid_start: Option<i32>,
    pub year_valid_end: Option<i32>,
    pub ntc_limit_capacity_static: Option<f64>,
    pub ntc_curve_id: Option<String>,
}

impl TransferRecord {
    /// Only NTC declarations on HVAC links take part in link resolution.
    pub fn is_ntc_hvac(&self) -> bool {
        self.transfer_type == crate::columns::transfer_links::TYPE_NTC
            && self.transfer_technology == crate::columns::transfer_links::TECHNOLOGY_HVAC
    }

    /// `year_valid_start <= year <= year_valid_end`; a missing bound never matches.
    pub fn is_valid_in(&self, year: i32) -> bool {
        match (self.year_valid_start, self.year_valid_end) {
            (Some(start), Some(end)) => start <= year && year <= end,
            _ => false,
        }
    }
}

/// Transfer record joined with its curve medians and endpoint codes.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkRecord {
    pub record: TransferRecord,
    pub seasonal: SeasonalValues,
    pub median: Option<f64>,
    pub code_source: String,
    pub code_destination: String,
    /// `{code_source}-{code_destination}`, declared order.
    pub border: String,
}

/// Which precedence rule produced a resolved record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionRule {
    /// No curve for the border: smallest static limit, broadcast to every season.
    StaticMinimum,
    /// Some records carry a curve, some do not: the curve records win.
    CurvePreferred,
    /// Every record carries a curve: smallest overall median.
    MedianMinimum,
}

impl ResolutionRule {
    pub fn label(self) -> &'static str {
        match self {
            ResolutionRule::StaticMinimum => "rule 1 (static minimum)",
            ResolutionRule::CurvePreferred => "rule 2.1 (curve preferred)",
            ResolutionRule::MedianMinimum => "rule 2.2 (median minimum)",
        }
    }
}

/// The single authoritative record of one border for one year.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBorderRecord {
    pub zone: String,
    pub border: String,
    pub code_source: String,
    pub code_destination: String,
    pub ntc_curve_id: Option<String>,
    pub seasonal: SeasonalValues,
    pub median: Option<f64>,
    pub rule: ResolutionRule,
}

/// Flow direction of a declared border relative to its canonical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkDirection {
    Direct,
    Indirect,
}

/// Final row of a per-year export sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub year: i32,
    pub name: String,
    pub direct: SeasonalValues,
    pub indirect: SeasonalValues,
    pub flowbased_perimeter: bool,
    pub hvdc_direct: Option<f64>,
    pub hvdc_indirect: Option<f64>,
    pub specific_ts: bool,
    pub forced_outage_hvac: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_labels_parse_case_insensitively() {
        assert_eq!("hp".parse::<PeriodHour>().unwrap(), PeriodHour::Peak);
        assert_eq!(" HC ".parse::<PeriodHour>().unwrap(), PeriodHour::OffPeak);
        assert_eq!("Winter".parse::<PeriodMonth>().unwrap(), PeriodMonth::Winter);
        assert!("spring".parse::<PeriodMonth>().is_err());
    }

    #[test]
    fn season_labels_are_upper_case() {
        let labels: Vec<String> = Season::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(labels, ["WINTER_HP", "WINTER_HC", "SUMMER_HP", "SUMMER_HC"]);
    }

    #[test]
    fn mapping_needs_both_hour_and_month() {
        let mapping = PeakPeriodMapping::new()
            .with_hour(8, PeriodHour::Peak)
            .with_month(1, PeriodMonth::Winter);
        assert_eq!(mapping.season(1, 8), Some(Season::WinterHp));
        assert_eq!(mapping.season(1, 3), None);
        assert_eq!(mapping.season(7, 8), None);
    }

    #[test]
    fn hourly_series_rejects_ragged_rows() {
        let mut series = HourlyCapacitySeries::new(vec!["a".into(), "b".into()]);
        let stamp = HourStamp {
            month: 1,
            day: 1,
            hour: 1,
        };
        assert!(series.push_row(stamp, &[Some(1.0)]).is_err());
        series.push_row(stamp, &[Some(1.0), None]).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.column(0), [Some(1.0)]);
        assert_eq!(series.column(1), [None]);
    }

    #[test]
    fn validity_window_is_inclusive() {
        let record = TransferRecord {
            year_valid_start: Some(2025),
            year_valid_end: Some(2030),
            ..TransferRecord::default()
        };
        assert!(record.is_valid_in(2025));
        assert!(record.is_valid_in(2030));
        assert!(!record.is_valid_in(2031));
        let open = TransferRecord {
            year_valid_start: Some(2025),
            ..TransferRecord::default()
        };
        assert!(!open.is_valid_in(2026));
    }

    #[test]
    fn uniform_values_fill_every_season() {
        let values = SeasonalValues::uniform(Some(4300.0));
        assert!(Season::ALL.iter().all(|s| values.get(*s) == Some(4300.0)));
        assert!(SeasonalValues::default().is_empty());
    }
}

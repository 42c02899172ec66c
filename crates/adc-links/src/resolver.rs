//! Collapse multi-operator declarations into one record per border.
//!
//! Resolution runs in two steps for one year's records:
//!
//! 1. Declarations sharing the full identifying key (zone, type, scenario,
//!    technology, curve id, border, endpoint codes) are summed into one
//!    record. Sums skip nulls, but a column that is null in every
//!    declaration stays null.
//! 2. The records left for a border, possibly from several grid operators,
//!    are reduced to one:
//!    - no record has a curve: smallest static limit, used for every season
//!      ([`ResolutionRule::StaticMinimum`]);
//!    - some records have a curve: only those are kept, the smallest overall
//!      median wins among them ([`ResolutionRule::CurvePreferred`]);
//!    - every record has a curve: smallest overall median
//!      ([`ResolutionRule::MedianMinimum`]).
//!
//! Every minimum keeps the first of equal candidates, in input order.

use std::collections::HashMap;

use adc_core::diagnostics::Stage;
use adc_core::{
    Diagnostics, LinkRecord, ResolutionRule, ResolvedBorderRecord, Season, SeasonalValues,
};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct DeclarationKey {
    zone: String,
    transfer_type: String,
    study_scenario: String,
    transfer_technology: String,
    ntc_curve_id: Option<String>,
    border: String,
    code_source: String,
    code_destination: String,
}

impl DeclarationKey {
    fn of(link: &LinkRecord) -> Self {
        Self {
            zone: link.record.zone.clone(),
            transfer_type: link.record.transfer_type.clone(),
            study_scenario: link.record.study_scenario.clone(),
            transfer_technology: link.record.transfer_technology.clone(),
            ntc_curve_id: link.record.ntc_curve_id.clone(),
            border: link.border.clone(),
            code_source: link.code_source.clone(),
            code_destination: link.code_destination.clone(),
        }
    }
}

/// Null-aware sum: `None` only when both sides are `None`.
pub fn sum_present(left: Option<f64>, right: Option<f64>) -> Option<f64> {
    match (left, right) {
        (None, None) => None,
        (left, right) => Some(left.unwrap_or(0.0) + right.unwrap_or(0.0)),
    }
}

/// Sum declarations sharing the same identifying key, keeping first-seen order.
pub fn aggregate_declarations(records: Vec<LinkRecord>) -> Vec<LinkRecord> {
    let mut position: HashMap<DeclarationKey, usize> = HashMap::new();
    let mut merged: Vec<LinkRecord> = Vec::with_capacity(records.len());
    for link in records {
        let key = DeclarationKey::of(&link);
        match position.get(&key) {
            Some(idx) => {
                let target = &mut merged[*idx];
                for season in Season::ALL {
                    let sum = sum_present(target.seasonal.get(season), link.seasonal.get(season));
                    target.seasonal.set(season, sum);
                }
                target.median = sum_present(target.median, link.median);
                target.record.ntc_limit_capacity_static = sum_present(
                    target.record.ntc_limit_capacity_static,
                    link.record.ntc_limit_capacity_static,
                );
            }
            None => {
                position.insert(key, merged.len());
                merged.push(link);
            }
        }
    }
    merged
}

/// First candidate with the smallest non-null key.
fn first_minimum<'a, F>(candidates: &[&'a LinkRecord], key: F) -> Option<&'a LinkRecord>
where
    F: Fn(&LinkRecord) -> Option<f64>,
{
    let mut best: Option<(&LinkRecord, f64)> = None;
    for candidate in candidates {
        if let Some(value) = key(*candidate) {
            match best {
                Some((_, current)) if value >= current => {}
                _ => best = Some((*candidate, value)),
            }
        }
    }
    best.map(|(link, _)| link)
}

fn resolved(link: &LinkRecord, seasonal: SeasonalValues, rule: ResolutionRule) -> ResolvedBorderRecord {
    ResolvedBorderRecord {
        zone: link.record.zone.clone(),
        border: link.border.clone(),
        code_source: link.code_source.clone(),
        code_destination: link.code_destination.clone(),
        ntc_curve_id: link.record.ntc_curve_id.clone(),
        seasonal,
        median: link.median,
        rule,
    }
}

/// Smallest overall median; the first candidate when no median is known.
fn by_median<'a>(
    candidates: &[&'a LinkRecord],
    border: &str,
    year: i32,
    diag: &mut Diagnostics,
) -> Option<&'a LinkRecord> {
    first_minimum(candidates, |link| link.median).or_else(|| {
        diag.warn(
            Stage::Resolution,
            format!("no curve median known in {year}; keeping the first declaration"),
            border,
        );
        candidates.first().copied()
    })
}

fn resolve_border(
    border: &str,
    links: &[&LinkRecord],
    year: i32,
    diag: &mut Diagnostics,
) -> Option<ResolvedBorderRecord> {
    let with_curve: Vec<&LinkRecord> = links
        .iter()
        .copied()
        .filter(|link| link.record.ntc_curve_id.is_some())
        .collect();

    if with_curve.is_empty() {
        let Some(chosen) = first_minimum(links, |link| link.record.ntc_limit_capacity_static)
        else {
            diag.warn(
                Stage::Resolution,
                format!("no curve and no static capacity in {year}; border dropped"),
                border,
            );
            return None;
        };
        debug!(border, year, rule = ResolutionRule::StaticMinimum.label(), "border resolved");
        let seasonal = SeasonalValues::uniform(chosen.record.ntc_limit_capacity_static);
        return Some(resolved(chosen, seasonal, ResolutionRule::StaticMinimum));
    }

    let rule = if with_curve.len() < links.len() {
        ResolutionRule::CurvePreferred
    } else {
        ResolutionRule::MedianMinimum
    };
    let chosen = match with_curve.as_slice() {
        [only] => Some(*only),
        candidates => by_median(candidates, border, year, diag),
    }?;
    debug!(border, year, rule = rule.label(), "border resolved");
    Some(resolved(chosen, chosen.seasonal, rule))
}

/// One [`ResolvedBorderRecord`] per border, in first-seen border order.
pub fn resolve_borders(
    records: Vec<LinkRecord>,
    year: i32,
    diag: &mut Diagnostics,
) -> Vec<ResolvedBorderRecord> {
    let declared = records.len();
    let aggregated = aggregate_declarations(records);

    let mut borders: Vec<(&str, Vec<&LinkRecord>)> = Vec::new();
    let mut position: HashMap<&str, usize> = HashMap::new();
    for link in &aggregated {
        match position.get(link.border.as_str()) {
            Some(idx) => borders[*idx].1.push(link),
            None => {
                position.insert(link.border.as_str(), borders.len());
                borders.push((link.border.as_str(), vec![link]));
            }
        }
    }

    let mut out = Vec::with_capacity(borders.len());
    for (border, links) in &borders {
        if links.len() > 1 {
            debug!(border, year, declarations = links.len(), "multi-operator border");
        }
        if let Some(record) = resolve_border(border, links, year, diag) {
            out.push(record);
        }
    }

    info!(
        year,
        declared,
        aggregated = aggregated.len(),
        resolved = out.len(),
        "borders resolved"
    );
    out
}

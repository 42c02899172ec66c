//! Attach curve medians and ANTARES endpoint codes to transfer records.

use std::collections::{BTreeSet, HashMap};

use adc_core::diagnostics::Stage;
use adc_core::{
    CurveMedianProfile, Diagnostics, LinkRecord, NtcIndexEntry, SeasonalValues, TransferRecord,
};
use adc_io::ReferenceCatalog;
use tracing::{debug, info};

/// Join NTC/HVAC transfer records with their curve medians and endpoint codes.
///
/// A record's curve is found through the NTCs Index: (`ZONE`,
/// `NTC_CURVE_ID`) names an index row (`ZONE`, `ID`) whose `CURVE_UID` is a
/// column of the hourly table. Records without a curve keep empty seasonal
/// values. Records whose market nodes have no code in the LINKS reference
/// are dropped and reported.
pub fn join_transfer_records(
    records: &[TransferRecord],
    index: &[NtcIndexEntry],
    profiles: &[CurveMedianProfile],
    catalog: &ReferenceCatalog,
    diag: &mut Diagnostics,
) -> Vec<LinkRecord> {
    let mut uid_by_id: HashMap<(&str, &str), &str> = HashMap::with_capacity(index.len());
    for entry in index {
        uid_by_id
            .entry((entry.zone.as_str(), entry.id.as_str()))
            .or_insert(entry.curve_uid.as_str());
    }
    let profile_by_uid: HashMap<&str, &CurveMedianProfile> = profiles
        .iter()
        .map(|profile| (profile.curve_uid.as_str(), profile))
        .collect();

    let mut not_indexed = BTreeSet::new();
    let mut no_series = BTreeSet::new();
    let mut unknown_nodes = BTreeSet::new();
    let mut skipped = 0usize;
    let mut joined = Vec::new();

    for record in records {
        if !record.is_ntc_hvac() {
            skipped += 1;
            continue;
        }

        let mut seasonal = SeasonalValues::default();
        let mut median = None;
        if let Some(curve_id) = &record.ntc_curve_id {
            match uid_by_id.get(&(record.zone.as_str(), curve_id.as_str())) {
                None => {
                    not_indexed.insert(format!("{}/{}", record.zone, curve_id));
                }
                Some(uid) => match profile_by_uid.get(uid) {
                    None => {
                        no_series.insert(uid.to_string());
                    }
                    Some(profile) => {
                        seasonal = profile.seasonal;
                        median = profile.median;
                    }
                },
            }
        }

        let source = catalog.code_for_market_node(&record.market_zone_source);
        let destination = catalog.code_for_market_node(&record.market_zone_destination);
        let (Some(code_source), Some(code_destination)) = (source, destination) else {
            if source.is_none() {
                unknown_nodes.insert(record.market_zone_source.clone());
            }
            if destination.is_none() {
                unknown_nodes.insert(record.market_zone_destination.clone());
            }
            continue;
        };

        joined.push(LinkRecord {
            record: record.clone(),
            seasonal,
            median,
            code_source: code_source.to_string(),
            code_destination: code_destination.to_string(),
            border: format!("{code_source}-{code_destination}"),
        });
    }

    for entity in &not_indexed {
        diag.warn(
            Stage::Join,
            "curve id is not listed in the NTCs Index",
            entity,
        );
    }
    for entity in &no_series {
        diag.warn(
            Stage::Join,
            "curve uid has no column in the NTCs time series",
            entity,
        );
    }
    for node in &unknown_nodes {
        diag.warn(
            Stage::Join,
            "market node missing from LINKS; its records are dropped",
            node,
        );
    }

    debug!(skipped, "non NTC/HVAC records left out");
    info!(
        records = records.len(),
        joined = joined.len(),
        "transfer records joined"
    );
    joined
}

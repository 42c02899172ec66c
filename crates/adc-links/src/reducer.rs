//! Seasonal medians of the hourly NTC curves.
//!
//! Every hourly row is tagged with a [`Season`] through the peak-period
//! mapping; each curve is then reduced to one median per season plus one
//! overall median. Curves are reduced independently of each other.

use std::collections::BTreeSet;

use adc_core::diagnostics::Stage;
use adc_core::{
    CurveMedianProfile, Diagnostics, HourlyCapacitySeries, PeakPeriodMapping, Season,
    SeasonalValues,
};
use tracing::{debug, info};

/// How many unmapped (month, hour) pairs are quoted in the diagnostic.
const UNMAPPED_EXAMPLES: usize = 5;

/// Median of the values, ignoring `None`; mean of the two middle values for
/// an even count.
pub fn median<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut values: Vec<f64> = values.into_iter().flatten().collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Reduce every curve of `series` to its [`CurveMedianProfile`].
///
/// Rows whose month or hour has no period in `mapping` count toward the
/// overall median only; they are reported once in `diag`.
pub fn reduce_curves(
    series: &HourlyCapacitySeries,
    mapping: &PeakPeriodMapping,
    diag: &mut Diagnostics,
) -> Vec<CurveMedianProfile> {
    let seasons: Vec<Option<Season>> = series
        .stamps()
        .iter()
        .map(|stamp| mapping.season(stamp.month, stamp.hour))
        .collect();

    let unmapped: BTreeSet<(u32, u32)> = series
        .stamps()
        .iter()
        .zip(&seasons)
        .filter(|(_, season)| season.is_none())
        .map(|(stamp, _)| (stamp.month, stamp.hour))
        .collect();
    if !unmapped.is_empty() {
        let examples: Vec<String> = unmapped
            .iter()
            .take(UNMAPPED_EXAMPLES)
            .map(|(month, hour)| format!("month {month} hour {hour}"))
            .collect();
        diag.warn(
            Stage::Timeseries,
            format!(
                "{} (month, hour) pair(s) have no peak period and are left out of the seasonal medians",
                unmapped.len()
            ),
            examples.join(", "),
        );
    }

    for season in Season::ALL {
        if !seasons.contains(&Some(season)) {
            debug!(%season, "no hourly observation falls in season");
        }
    }

    let profiles: Vec<CurveMedianProfile> = series
        .curve_ids()
        .iter()
        .enumerate()
        .map(|(idx, curve_uid)| {
            let values = series.column(idx);
            let mut seasonal = SeasonalValues::default();
            for season in Season::ALL {
                let in_season = values
                    .iter()
                    .zip(&seasons)
                    .filter(|(_, tag)| **tag == Some(season))
                    .map(|(value, _)| *value);
                seasonal.set(season, median(in_season));
            }
            CurveMedianProfile {
                curve_uid: curve_uid.clone(),
                seasonal,
                median: median(values.iter().copied()),
            }
        })
        .collect();

    info!(
        curves = profiles.len(),
        hours = series.len(),
        "curve medians computed"
    );
    profiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use adc_core::{HourStamp, PeriodHour, PeriodMonth};

    fn mapping() -> PeakPeriodMapping {
        PeakPeriodMapping::new()
            .with_hour(1, PeriodHour::OffPeak)
            .with_hour(2, PeriodHour::Peak)
            .with_month(1, PeriodMonth::Winter)
            .with_month(7, PeriodMonth::Summer)
    }

    fn push(series: &mut HourlyCapacitySeries, month: u32, hour: u32, row: &[Option<f64>]) {
        let stamp = HourStamp {
            month,
            day: 1,
            hour,
        };
        series.push_row(stamp, row).unwrap();
    }

    #[test]
    fn median_skips_nulls_and_averages_even_counts() {
        assert_eq!(median([Some(3.0), None, Some(1.0), Some(2.0)]), Some(2.0));
        assert_eq!(median([Some(4.0), Some(1.0), Some(3.0), Some(2.0)]), Some(2.5));
        assert_eq!(median([None, None]), None);
        assert_eq!(median(Vec::<Option<f64>>::new()), None);
    }

    #[test]
    fn seasonal_medians_use_matching_hours_only() {
        let mut series = HourlyCapacitySeries::new(vec!["a".into()]);
        push(&mut series, 1, 2, &[Some(100.0)]);
        push(&mut series, 1, 2, &[Some(300.0)]);
        push(&mut series, 1, 1, &[Some(50.0)]);
        push(&mut series, 7, 1, &[Some(10.0)]);

        let mut diag = Diagnostics::new();
        let profiles = reduce_curves(&series, &mapping(), &mut diag);
        let profile = &profiles[0];
        assert_eq!(profile.seasonal.winter_hp, Some(200.0));
        assert_eq!(profile.seasonal.winter_hc, Some(50.0));
        assert_eq!(profile.seasonal.summer_hc, Some(10.0));
        assert_eq!(profile.seasonal.summer_hp, None);
        assert_eq!(profile.median, Some(75.0));
        assert!(diag.is_empty());
    }

    #[test]
    fn curves_are_independent() {
        let mut first = HourlyCapacitySeries::new(vec!["a".into(), "b".into()]);
        push(&mut first, 1, 2, &[Some(100.0), Some(1.0)]);
        push(&mut first, 7, 1, &[Some(200.0), Some(2.0)]);
        let mut second = HourlyCapacitySeries::new(vec!["a".into(), "b".into()]);
        push(&mut second, 1, 2, &[Some(100.0), Some(999.0)]);
        push(&mut second, 7, 1, &[Some(200.0), None]);

        let mut diag = Diagnostics::new();
        let a_first = reduce_curves(&first, &mapping(), &mut diag).remove(0);
        let a_second = reduce_curves(&second, &mapping(), &mut diag).remove(0);
        assert_eq!(a_first, a_second);
    }

    #[test]
    fn unmapped_hours_are_reported_but_count_overall() {
        let mut series = HourlyCapacitySeries::new(vec!["a".into()]);
        push(&mut series, 1, 2, &[Some(100.0)]);
        push(&mut series, 3, 2, &[Some(300.0)]);

        let mut diag = Diagnostics::new();
        let profiles = reduce_curves(&series, &mapping(), &mut diag);
        assert_eq!(profiles[0].seasonal.winter_hp, Some(100.0));
        assert_eq!(profiles[0].median, Some(200.0));
        assert_eq!(diag.in_stage(Stage::Timeseries).count(), 1);
        assert_eq!(diag.issues()[0].entity, "month 3 hour 2");
    }
}

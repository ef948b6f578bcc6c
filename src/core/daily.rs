//! Daily reductions over hourly series and raw minute blocks.
//!
//! Two averaging modes live here on purpose: the cross-day profile and
//! per-day averages reduce an already-hourly series (a mean of hourly
//! means), while [`daily_flat_means`] averages every subject×minute
//! reading in a full day block directly. The two differ arithmetically
//! whenever hours have unequal valid-sample counts, and different
//! charts need different ones.

use crate::core::hourly::HourlyAggregate;
use crate::core::selection::AggregationMode;
use crate::core::stats::valid_mean;
use crate::core::{HOURS_PER_DAY, MINUTES_PER_DAY};
use crate::dataset::types::ObservationRow;
use serde::Serialize;

/// One day reduced to a scalar.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct DailyAggregate {
    /// 1-based day number.
    pub day: u32,
    pub value: f64,
}

/// One hour-of-day slot in a 24-hour profile.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HourPoint {
    pub hour: u32,
    pub value: f64,
}

/// Cross-day 24-hour profile of an hourly series.
///
/// Only full 24-record days participate; a partial trailing day is
/// skipped entirely rather than approximated. Each slot is the
/// NaN-filtered mean of that hour-of-day across the retained days, or
/// zero when no day contributed. Always 24 points.
pub fn day_profile(hourly: &[HourlyAggregate], mode: AggregationMode<'_>) -> Vec<HourPoint> {
    let days: Vec<&[HourlyAggregate]> = hourly
        .chunks(HOURS_PER_DAY)
        .filter(|chunk| chunk.len() == HOURS_PER_DAY)
        .collect();

    (0..HOURS_PER_DAY)
        .map(|hour| {
            let values = days.iter().map(|day| day[hour].value(mode));
            HourPoint {
                hour: hour as u32,
                value: valid_mean(values).unwrap_or(0.0),
            }
        })
        .collect()
}

/// Reduce an hourly series to one record per full 24-hour block.
///
/// Each day's value is the NaN-filtered mean of its 24 resolved hourly
/// values. Days with fewer than 24 hourly records are skipped, so 25
/// hourly records produce exactly one daily record.
pub fn daily_averages(hourly: &[HourlyAggregate], mode: AggregationMode<'_>) -> Vec<DailyAggregate> {
    hourly
        .chunks(HOURS_PER_DAY)
        .filter(|chunk| chunk.len() == HOURS_PER_DAY)
        .enumerate()
        .map(|(day, chunk)| DailyAggregate {
            day: day as u32 + 1,
            value: valid_mean(chunk.iter().map(|hour| hour.value(mode))).unwrap_or(0.0),
        })
        .collect()
}

/// Per-day flat means over raw minute rows, for multi-day trend lines.
///
/// Each full 1440-row block is reduced to the mean over all of its
/// subject×minute readings, NaN-filtered. This is a mean over the whole
/// block, not a mean of hourly means.
pub fn daily_flat_means(rows: &[ObservationRow], subjects: &[&str]) -> Vec<DailyAggregate> {
    let days = rows.len() / MINUTES_PER_DAY;
    let mut daily = Vec::with_capacity(days);

    for day in 0..days {
        let start = day * MINUTES_PER_DAY;
        let block = &rows[start..start + MINUTES_PER_DAY];

        let readings = block
            .iter()
            .flat_map(|row| subjects.iter().filter_map(|id| row.get(*id)).copied());
        daily.push(DailyAggregate {
            day: day as u32 + 1,
            value: valid_mean(readings).unwrap_or(0.0),
        });
    }

    daily
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hourly::hourly_averages;
    use crate::dataset::types::ObservationRow;

    fn constant_rows(n: usize, pairs: &[(&str, f64)]) -> Vec<ObservationRow> {
        (0..n)
            .map(|_| pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect())
            .collect()
    }

    fn hourly_of(values: &[f64]) -> Vec<HourlyAggregate> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| HourlyAggregate {
                hour_of_day: (i % HOURS_PER_DAY) as u32,
                per_subject: [("f1".to_string(), v)].into_iter().collect(),
                mean: v,
            })
            .collect()
    }

    #[test]
    fn test_partial_trailing_day_is_dropped() {
        // 25 hourly records: one full day plus one extra hour.
        let hourly = hourly_of(&vec![2.0; 25]);
        let daily = daily_averages(&hourly, AggregationMode::CrossSubjectAverage);

        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].day, 1);
        assert_eq!(daily[0].value, 2.0);
    }

    #[test]
    fn test_day_profile_averages_across_days() {
        // Two full days; hour 0 reads 1.0 on day one and 3.0 on day two.
        let mut values = vec![0.0; 48];
        values[0] = 1.0;
        values[24] = 3.0;

        let profile = day_profile(&hourly_of(&values), AggregationMode::CrossSubjectAverage);
        assert_eq!(profile.len(), 24);
        assert_eq!(profile[0].hour, 0);
        assert_eq!(profile[0].value, 2.0);
        assert_eq!(profile[5].value, 0.0);
    }

    #[test]
    fn test_day_profile_without_a_full_day() {
        let profile = day_profile(&hourly_of(&vec![7.0; 10]), AggregationMode::CrossSubjectAverage);
        assert_eq!(profile.len(), 24);
        assert!(profile.iter().all(|point| point.value == 0.0));
    }

    #[test]
    fn test_day_profile_per_subject_mode() {
        let hourly = hourly_of(&vec![4.0; 24]);
        let profile = day_profile(&hourly, AggregationMode::PerSubject("f1"));
        assert_eq!(profile[0].value, 4.0);

        // Unknown subject resolves to zero at every hour.
        let missing = day_profile(&hourly, AggregationMode::PerSubject("f9"));
        assert!(missing.iter().all(|point| point.value == 0.0));
    }

    #[test]
    fn test_flat_means_cover_whole_blocks() {
        let mut rows = constant_rows(MINUTES_PER_DAY * 2 + 100, &[("f1", 1.0), ("f2", 3.0)]);
        // Second day is all NaN for f2.
        for row in rows.iter_mut().skip(MINUTES_PER_DAY).take(MINUTES_PER_DAY) {
            row.insert("f2".to_string(), f64::NAN);
        }

        let daily = daily_flat_means(&rows, &["f1", "f2"]);
        // The 100 trailing rows do not make a third day.
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].day, 1);
        assert_eq!(daily[0].value, 2.0);
        assert_eq!(daily[1].value, 1.0);
    }

    #[test]
    fn test_flat_mean_differs_from_mean_of_hourly_means() {
        // One subject contributes a single extreme minute; the other a
        // full day of zeros. The flat mean weights by sample count, the
        // hourly path does not.
        let mut rows = constant_rows(MINUTES_PER_DAY, &[("f1", f64::NAN), ("f2", 0.0)]);
        rows[0].insert("f1".to_string(), 100.0);

        let flat = daily_flat_means(&rows, &["f1", "f2"]);
        assert!((flat[0].value - 100.0 / 1441.0).abs() < 1e-9);

        let hourly = hourly_averages(&rows, &["f1", "f2"]);
        let of_means = daily_averages(&hourly, AggregationMode::CrossSubjectAverage);
        // Hour 0 mean = (100 + 0) / 2, the other 23 hours are 0.
        assert!((of_means[0].value - 50.0 / 24.0).abs() < 1e-9);
    }
}

//! Hourly reduction of per-minute observation slices.
//!
//! The table is partitioned into contiguous 60-row windows; trailing
//! rows that do not fill a complete hour are dropped.

use crate::core::selection::AggregationMode;
use crate::core::stats::valid_mean;
use crate::core::{HOURS_PER_DAY, MINUTES_PER_HOUR};
use crate::dataset::types::ObservationRow;
use serde::Serialize;
use std::collections::BTreeMap;

/// One hour of aggregated readings.
#[derive(Debug, Clone, Serialize)]
pub struct HourlyAggregate {
    /// Hour of day, 0-23; multi-day inputs wrap at day boundaries.
    pub hour_of_day: u32,
    /// NaN-filtered mean per subject. A subject with no valid reading
    /// in the hour is omitted, never recorded as zero.
    pub per_subject: BTreeMap<String, f64>,
    /// Unweighted mean of the per-subject means, so subjects with fewer
    /// valid minutes are not penalized. Zero when no subject had data.
    pub mean: f64,
}

impl HourlyAggregate {
    /// Value of this hour under an aggregation mode. A subject missing
    /// from the hour resolves to zero, matching what the charts plot.
    pub fn value(&self, mode: AggregationMode<'_>) -> f64 {
        match mode {
            AggregationMode::CrossSubjectAverage => self.mean,
            AggregationMode::PerSubject(id) => self.per_subject.get(id).copied().unwrap_or(0.0),
        }
    }
}

/// Reduce a per-minute slice into one record per complete hour.
///
/// Returns an empty sequence when the slice holds less than one hour of
/// data; callers must treat that as "no data" rather than dividing by
/// the record count.
pub fn hourly_averages(rows: &[ObservationRow], subjects: &[&str]) -> Vec<HourlyAggregate> {
    let hours = rows.len() / MINUTES_PER_HOUR;
    let mut hourly = Vec::with_capacity(hours);

    for hour in 0..hours {
        let start = hour * MINUTES_PER_HOUR;
        let window = &rows[start..start + MINUTES_PER_HOUR];

        let mut per_subject = BTreeMap::new();
        let mut sum = 0.0;
        let mut count = 0usize;

        for &id in subjects {
            let readings = window.iter().filter_map(|row| row.get(id)).copied();
            if let Some(avg) = valid_mean(readings) {
                per_subject.insert(id.to_string(), avg);
                sum += avg;
                count += 1;
            }
        }

        let mean = if count > 0 { sum / count as f64 } else { 0.0 };
        hourly.push(HourlyAggregate {
            hour_of_day: (hour % HOURS_PER_DAY) as u32,
            per_subject,
            mean,
        });
    }

    hourly
}

//! Day × hour binning of activity readings for the heatmap view.

use crate::core::selection::AggregationMode;
use crate::core::stats::valid_mean;
use crate::core::{HOURS_PER_DAY, MINUTES_PER_DAY, MINUTES_PER_HOUR};
use crate::dataset::types::ObservationRow;
use serde::Serialize;

/// One heatmap cell.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HeatmapCell {
    /// 0-based day row.
    pub day: u32,
    /// Hour of day, 0-23.
    pub hour: u32,
    pub value: f64,
}

/// Bin a table into a day × hour grid of aggregated values.
///
/// The requested day count is clamped to the number of full days in the
/// table. A cell whose 60-row window would run past the end of the
/// table is skipped, so ragged trailing data produces a grid with fewer
/// cells rather than padded rows.
///
/// In cross-subject mode the cell value is the flat mean over every
/// valid subject×minute reading in the window, which weights subjects
/// by their valid-sample counts; this intentionally differs from the
/// hourly aggregator's unweighted mean of per-subject means.
pub fn heatmap_grid(
    rows: &[ObservationRow],
    subjects: &[&str],
    days_requested: usize,
    mode: AggregationMode<'_>,
) -> Vec<HeatmapCell> {
    let days = days_requested.min(rows.len() / MINUTES_PER_DAY);
    let mut cells = Vec::with_capacity(days * HOURS_PER_DAY);

    for day in 0..days {
        for hour in 0..HOURS_PER_DAY {
            let start = day * MINUTES_PER_DAY + hour * MINUTES_PER_HOUR;
            let end = start + MINUTES_PER_HOUR;
            if end > rows.len() {
                continue;
            }
            let window = &rows[start..end];

            let value = match mode {
                AggregationMode::CrossSubjectAverage => {
                    let readings = window
                        .iter()
                        .flat_map(|row| subjects.iter().filter_map(|id| row.get(*id)).copied());
                    valid_mean(readings).unwrap_or(0.0)
                }
                AggregationMode::PerSubject(id) => {
                    let readings = window.iter().filter_map(|row| row.get(id)).copied();
                    valid_mean(readings).unwrap_or(0.0)
                }
            };

            cells.push(HeatmapCell {
                day: day as u32,
                hour: hour as u32,
                value,
            });
        }
    }

    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::types::ObservationRow;

    fn constant_rows(n: usize, pairs: &[(&str, f64)]) -> Vec<ObservationRow> {
        (0..n)
            .map(|_| pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect())
            .collect()
    }

    #[test]
    fn test_days_are_clamped_to_available_data() {
        let rows = constant_rows(10 * MINUTES_PER_DAY, &[("f1", 1.0)]);
        let cells = heatmap_grid(&rows, &["f1"], 14, AggregationMode::CrossSubjectAverage);

        assert_eq!(cells.len(), 10 * HOURS_PER_DAY);
        assert_eq!(cells.iter().map(|c| c.day).max(), Some(9));
        assert_eq!(cells.iter().map(|c| c.hour).max(), Some(23));
    }

    #[test]
    fn test_exactly_full_table_keeps_last_hour() {
        let rows = constant_rows(MINUTES_PER_DAY, &[("f1", 2.0)]);
        let cells = heatmap_grid(&rows, &["f1"], 1, AggregationMode::CrossSubjectAverage);

        assert_eq!(cells.len(), HOURS_PER_DAY);
        let last = cells.last().expect("cells");
        assert_eq!((last.day, last.hour), (0, 23));
        assert_eq!(last.value, 2.0);
    }

    #[test]
    fn test_flat_mean_weights_by_sample_count() {
        // f1 contributes one valid minute at 100.0, f2 sixty at 0.0:
        // the flat cell mean counts 61 readings.
        let mut rows = constant_rows(MINUTES_PER_DAY, &[("f1", f64::NAN), ("f2", 0.0)]);
        rows[0].insert("f1".to_string(), 100.0);

        let cells = heatmap_grid(&rows, &["f1", "f2"], 1, AggregationMode::CrossSubjectAverage);
        assert!((cells[0].value - 100.0 / 61.0).abs() < 1e-9);
    }

    #[test]
    fn test_per_subject_mode() {
        let rows = constant_rows(MINUTES_PER_DAY, &[("f1", 5.0), ("f2", 50.0)]);
        let cells = heatmap_grid(&rows, &["f1", "f2"], 1, AggregationMode::PerSubject("f1"));
        assert!(cells.iter().all(|cell| cell.value == 5.0));
    }

    #[test]
    fn test_all_nan_cell_is_zero() {
        let rows = constant_rows(MINUTES_PER_DAY, &[("f1", f64::NAN)]);
        let cells = heatmap_grid(&rows, &["f1"], 1, AggregationMode::CrossSubjectAverage);
        assert_eq!(cells.len(), HOURS_PER_DAY);
        assert!(cells.iter().all(|cell| cell.value == 0.0));
    }
}

//! Chart-ready series assembled for the rendering layer.
//!
//! These builders produce the exact payloads the dashboard charts
//! consume: a combined per-minute line series, a stride-sampled scatter
//! cloud with its regression line, and the per-subject correlation
//! summary. All outputs are ephemeral values serialized to the renderer.

use crate::core::selection::{subjects_for, AggregationMode};
use crate::core::stats::{linear_fit, pearson, valid_mean, LinearFit};
use crate::core::windowing::WindowSlices;
use crate::core::{HOURS_PER_DAY, MINUTES_PER_DAY, MINUTES_PER_HOUR};
use crate::dataset::store::DatasetStore;
use crate::dataset::types::{Sex, Variable};
use serde::Serialize;

/// Point budget for the scatter view before stride sampling kicks in.
pub const DEFAULT_SCATTER_POINTS: usize = 300;

/// One minute of the combined activity/temperature line series.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MinutePoint {
    pub minute: u32,
    pub activity: f64,
    pub temperature: f64,
}

/// Combined per-minute series for the time-series chart.
///
/// In cross-subject mode each variable is the flat mean of the valid
/// readings at that minute (zero when none are valid); in per-subject
/// mode the subject's own readings with NaN rendered as zero. The two
/// variables are filtered independently, so a gap in one does not drop
/// the minute from the other.
pub fn minute_series(
    slices: &WindowSlices<'_>,
    subjects: &[&str],
    mode: AggregationMode<'_>,
) -> Vec<MinutePoint> {
    (0..slices.len())
        .map(|minute| {
            let act_row = &slices.activity[minute];
            let temp_row = &slices.temperature[minute];

            let (activity, temperature) = match mode {
                AggregationMode::CrossSubjectAverage => {
                    let act = valid_mean(
                        subjects.iter().filter_map(|id| act_row.get(*id)).copied(),
                    );
                    let temp = valid_mean(
                        subjects.iter().filter_map(|id| temp_row.get(*id)).copied(),
                    );
                    (act.unwrap_or(0.0), temp.unwrap_or(0.0))
                }
                AggregationMode::PerSubject(id) => {
                    let act = act_row.get(id).copied().unwrap_or(f64::NAN);
                    let temp = temp_row.get(id).copied().unwrap_or(f64::NAN);
                    (
                        if act.is_nan() { 0.0 } else { act },
                        if temp.is_nan() { 0.0 } else { temp },
                    )
                }
            };

            MinutePoint {
                minute: minute as u32,
                activity,
                temperature,
            }
        })
        .collect()
}

/// One sampled point of the temperature-vs-activity scatter.
#[derive(Debug, Clone, Serialize)]
pub struct ScatterPoint {
    pub subject: String,
    pub minute: u32,
    /// Hour of day, 0-23.
    pub hour: u32,
    /// 1-based day number.
    pub day: u32,
    pub activity: f64,
    pub temperature: f64,
}

/// Scatter cloud plus the statistics drawn over it.
#[derive(Debug, Clone, Serialize)]
pub struct ScatterSeries {
    pub points: Vec<ScatterPoint>,
    /// Pearson r over the sampled points; zero when too few points.
    pub r: f64,
    /// Regression line (temperature as x), absent for degenerate data.
    pub trend: Option<LinearFit>,
}

/// Build the scatter series for one sex window.
///
/// Minutes are stride-sampled down to roughly `max_points` per subject
/// stream, and a point is emitted only when both readings at that
/// minute are valid.
pub fn scatter_series(
    slices: &WindowSlices<'_>,
    subjects: &[&str],
    mode: AggregationMode<'_>,
    max_points: usize,
) -> ScatterSeries {
    let mut points = Vec::new();

    if !slices.is_empty() && max_points > 0 {
        let stride = (slices.len() / max_points).max(1);
        let selected: Vec<&str> = match mode {
            AggregationMode::PerSubject(id) => vec![id],
            AggregationMode::CrossSubjectAverage => subjects.to_vec(),
        };

        for minute in (0..slices.len()).step_by(stride) {
            for &id in &selected {
                let activity = slices.activity[minute].get(id).copied().unwrap_or(f64::NAN);
                let temperature = slices.temperature[minute]
                    .get(id)
                    .copied()
                    .unwrap_or(f64::NAN);
                if activity.is_nan() || temperature.is_nan() {
                    continue;
                }
                points.push(ScatterPoint {
                    subject: id.to_string(),
                    minute: minute as u32,
                    hour: ((minute / MINUTES_PER_HOUR) % HOURS_PER_DAY) as u32,
                    day: (minute / MINUTES_PER_DAY) as u32 + 1,
                    activity,
                    temperature,
                });
            }
        }
    }

    let pairs: Vec<(f64, f64)> = points
        .iter()
        .map(|point| (point.temperature, point.activity))
        .collect();
    let temps: Vec<f64> = pairs.iter().map(|(t, _)| *t).collect();
    let acts: Vec<f64> = pairs.iter().map(|(_, a)| *a).collect();

    ScatterSeries {
        r: pearson(&temps, &acts),
        trend: linear_fit(&pairs),
        points,
    }
}

/// Correlation of one subject's temperature and activity series.
#[derive(Debug, Clone, Serialize)]
pub struct SubjectCorrelation {
    pub subject: String,
    pub r: f64,
}

/// Per-subject correlations for both sexes, with per-sex means.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationSummary {
    pub female: Vec<SubjectCorrelation>,
    pub male: Vec<SubjectCorrelation>,
    pub female_mean: f64,
    pub male_mean: f64,
}

fn sex_correlations(store: &DatasetStore, sex: Sex) -> Vec<SubjectCorrelation> {
    let activity = store.table(sex, Variable::Activity);
    let temperature = store.table(sex, Variable::Temperature);

    subjects_for(sex)
        .iter()
        .map(|&id| SubjectCorrelation {
            subject: id.to_string(),
            r: pearson(&activity.series(id), &temperature.series(id)),
        })
        .collect()
}

/// Correlate activity against temperature for every subject, over the
/// full (unwindowed) tables. Subjects with too little data contribute
/// r = 0 and still count toward the per-sex mean.
pub fn correlation_summary(store: &DatasetStore) -> CorrelationSummary {
    let female = sex_correlations(store, Sex::Female);
    let male = sex_correlations(store, Sex::Male);

    let mean = |entries: &[SubjectCorrelation]| {
        if entries.is_empty() {
            0.0
        } else {
            entries.iter().map(|entry| entry.r).sum::<f64>() / entries.len() as f64
        }
    };

    CorrelationSummary {
        female_mean: mean(&female),
        male_mean: mean(&male),
        female,
        male,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::selection::Period;
    use crate::core::windowing::select_window;
    use crate::dataset::types::{ObservationRow, ObservationTable};

    fn constant_rows(n: usize, pairs: &[(&str, f64)]) -> Vec<ObservationRow> {
        (0..n)
            .map(|_| pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect())
            .collect()
    }

    fn store_with(act: Vec<ObservationRow>, temp: Vec<ObservationRow>) -> DatasetStore {
        DatasetStore::new(
            ObservationTable::new(act),
            ObservationTable::new(temp),
            ObservationTable::default(),
            ObservationTable::default(),
        )
    }

    #[test]
    fn test_minute_series_average_mode() {
        let store = store_with(
            constant_rows(10, &[("f1", 2.0), ("f2", 4.0)]),
            constant_rows(10, &[("f1", 36.0), ("f2", 38.0)]),
        );
        let window = select_window(&store, Sex::Female, Period::OneDay);

        let series = minute_series(&window, &["f1", "f2"], AggregationMode::CrossSubjectAverage);
        assert_eq!(series.len(), 10);
        assert_eq!(series[0].minute, 0);
        assert_eq!(series[0].activity, 3.0);
        assert_eq!(series[0].temperature, 37.0);
    }

    #[test]
    fn test_minute_series_renders_gaps_as_zero() {
        let mut act = constant_rows(5, &[("f1", 1.0)]);
        act[2].insert("f1".to_string(), f64::NAN);
        let store = store_with(act, constant_rows(5, &[("f1", 36.0)]));
        let window = select_window(&store, Sex::Female, Period::OneDay);

        let series = minute_series(&window, &["f1"], AggregationMode::PerSubject("f1"));
        assert_eq!(series[1].activity, 1.0);
        assert_eq!(series[2].activity, 0.0);
        assert_eq!(series[2].temperature, 36.0);
    }

    #[test]
    fn test_scatter_respects_point_budget() {
        let n = 3000;
        let act: Vec<ObservationRow> = (0..n)
            .map(|i| [("f1".to_string(), i as f64)].into_iter().collect())
            .collect();
        let temp: Vec<ObservationRow> = (0..n)
            .map(|i| [("f1".to_string(), 35.0 + (i as f64) * 0.001)].into_iter().collect())
            .collect();
        let store = store_with(act, temp);
        let window = select_window(&store, Sex::Female, Period::SevenDays);

        let scatter = scatter_series(
            &window,
            &["f1"],
            AggregationMode::PerSubject("f1"),
            DEFAULT_SCATTER_POINTS,
        );
        // Stride of 10 over 3000 minutes.
        assert_eq!(scatter.points.len(), 300);
        assert!((scatter.r - 1.0).abs() < 1e-9);
        let trend = scatter.trend.expect("trend");
        assert!((trend.slope - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn test_scatter_skips_half_valid_minutes() {
        let act = constant_rows(20, &[("f1", 1.0)]);
        let mut temp = constant_rows(20, &[("f1", 36.0)]);
        temp[3].insert("f1".to_string(), f64::NAN);
        let store = store_with(act, temp);
        let window = select_window(&store, Sex::Female, Period::OneDay);

        let scatter = scatter_series(&window, &["f1"], AggregationMode::PerSubject("f1"), 300);
        assert_eq!(scatter.points.len(), 19);
        // Constant series: no meaningful correlation or trend.
        assert_eq!(scatter.r, 0.0);
        assert!(scatter.trend.is_none());
    }

    #[test]
    fn test_scatter_labels_time() {
        let n = MINUTES_PER_DAY + MINUTES_PER_HOUR;
        let store = store_with(
            constant_rows(n, &[("f1", 1.0)]),
            constant_rows(n, &[("f1", 36.0)]),
        );
        let window = select_window(&store, Sex::Female, Period::SevenDays);

        let scatter = scatter_series(&window, &["f1"], AggregationMode::PerSubject("f1"), 10_000);
        let last = scatter.points.last().expect("points");
        assert_eq!(last.day, 2);
        assert_eq!(last.hour, 0);
    }

    #[test]
    fn test_correlation_summary_covers_both_rosters() {
        // Positively correlated pair for f1; everything else missing.
        let n = 50;
        let act: Vec<ObservationRow> = (0..n)
            .map(|i| [("f1".to_string(), i as f64)].into_iter().collect())
            .collect();
        let temp: Vec<ObservationRow> = (0..n)
            .map(|i| [("f1".to_string(), 30.0 + i as f64)].into_iter().collect())
            .collect();
        let store = DatasetStore::new(
            ObservationTable::new(act),
            ObservationTable::new(temp),
            ObservationTable::default(),
            ObservationTable::default(),
        );

        let summary = correlation_summary(&store);
        assert_eq!(summary.female.len(), 13);
        assert_eq!(summary.male.len(), 13);
        assert!((summary.female[0].r - 1.0).abs() < 1e-9);
        // The other twelve females have no data and contribute zero.
        assert!((summary.female_mean - 1.0 / 13.0).abs() < 1e-9);
        assert_eq!(summary.male_mean, 0.0);
    }
}

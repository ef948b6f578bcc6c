//! Aggregation core for the circadian dashboard.
//!
//! This module contains:
//! - Selection state and the fixed subject rosters
//! - Time-window selection over the dataset store
//! - Hourly and daily aggregation
//! - Correlation statistics and regression
//! - Heatmap binning and chart-ready series assembly

pub mod daily;
pub mod heatmap;
pub mod hourly;
pub mod selection;
pub mod series;
pub mod stats;
pub mod windowing;

/// Rows per hour in the observation tables.
pub const MINUTES_PER_HOUR: usize = 60;

/// Hours per day.
pub const HOURS_PER_DAY: usize = 24;

/// Rows per day in the observation tables.
pub const MINUTES_PER_DAY: usize = MINUTES_PER_HOUR * HOURS_PER_DAY;

// Re-export commonly used types
pub use daily::{daily_averages, daily_flat_means, day_profile, DailyAggregate, HourPoint};
pub use heatmap::{heatmap_grid, HeatmapCell};
pub use hourly::{hourly_averages, HourlyAggregate};
pub use selection::{
    subjects_for, AggregationMode, Period, Selection, SubjectSelection, FEMALE_SUBJECTS,
    MALE_SUBJECTS,
};
pub use series::{
    correlation_summary, minute_series, scatter_series, CorrelationSummary, MinutePoint,
    ScatterPoint, ScatterSeries, SubjectCorrelation, DEFAULT_SCATTER_POINTS,
};
pub use stats::{linear_fit, pearson, valid_mean, LinearFit};
pub use windowing::{select_window, WindowSlices};

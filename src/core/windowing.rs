//! Time-window selection over the dataset store.
//!
//! A window is the first N minutes of the activity and temperature
//! tables for one sex, bounded so both slices stay equal-length and
//! in-range even when the tables disagree about how much data exists.

use crate::core::selection::Period;
use crate::dataset::store::DatasetStore;
use crate::dataset::types::{ObservationRow, Sex, Variable};

/// Equal-length activity and temperature slices for one request.
#[derive(Debug, Clone, Copy)]
pub struct WindowSlices<'a> {
    pub activity: &'a [ObservationRow],
    pub temperature: &'a [ObservationRow],
    requested_minutes: usize,
}

impl WindowSlices<'_> {
    /// Minutes covered by both slices.
    pub fn len(&self) -> usize {
        self.activity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activity.is_empty()
    }

    /// True when the tables held less data than the requested period.
    /// Callers surface this as an insufficient-data notice; it is never
    /// an error.
    pub fn is_truncated(&self) -> bool {
        self.len() < self.requested_minutes
    }
}

/// Resolve a (sex, period) pair to bounded slices of the two tables.
///
/// The requested minute count is clamped against both table lengths and
/// the smaller bound is used for both slices, so they are always
/// row-for-row aligned. An empty or absent table yields two empty
/// slices; callers treat that as "no data" rather than synthesizing
/// defaults.
pub fn select_window(store: &DatasetStore, sex: Sex, period: Period) -> WindowSlices<'_> {
    let activity = store.table(sex, Variable::Activity);
    let temperature = store.table(sex, Variable::Temperature);

    let requested = period.minutes();
    let bound = requested.min(activity.len()).min(temperature.len());

    WindowSlices {
        activity: &activity.rows()[..bound],
        temperature: &temperature.rows()[..bound],
        requested_minutes: requested,
    }
}

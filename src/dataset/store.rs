//! The four-table dataset store.
//!
//! The store is the only entity in the crate with process lifetime. It
//! is populated once by [`DatasetStore::load`] and read-only afterwards;
//! every aggregation is a pure function over its tables.

use crate::dataset::loader::{self, DataLoadError};
use crate::dataset::types::{ObservationTable, Sex, Variable};
use std::path::PathBuf;

/// Paths of the four dataset sources.
#[derive(Debug, Clone)]
pub struct DatasetSources {
    pub female_activity: PathBuf,
    pub female_temperature: PathBuf,
    pub male_activity: PathBuf,
    pub male_temperature: PathBuf,
}

/// Parsed observation tables for both sexes and both variables.
#[derive(Debug, Clone, Default)]
pub struct DatasetStore {
    female_activity: ObservationTable,
    female_temperature: ObservationTable,
    male_activity: ObservationTable,
    male_temperature: ObservationTable,
}

impl DatasetStore {
    /// Build a store from already-parsed tables.
    pub fn new(
        female_activity: ObservationTable,
        female_temperature: ObservationTable,
        male_activity: ObservationTable,
        male_temperature: ObservationTable,
    ) -> Self {
        Self {
            female_activity,
            female_temperature,
            male_activity,
            male_temperature,
        }
    }

    /// Load all four sources, joining before returning. All-or-nothing:
    /// if any source fails, the whole load fails.
    pub fn load(sources: &DatasetSources) -> Result<Self, DataLoadError> {
        let (female_activity, female_temperature, male_activity, male_temperature) =
            std::thread::scope(|scope| {
                let fa = scope.spawn(|| loader::load_table(&sources.female_activity));
                let ft = scope.spawn(|| loader::load_table(&sources.female_temperature));
                let ma = scope.spawn(|| loader::load_table(&sources.male_activity));
                let mt = scope.spawn(|| loader::load_table(&sources.male_temperature));
                (
                    fa.join().expect("loader thread panicked"),
                    ft.join().expect("loader thread panicked"),
                    ma.join().expect("loader thread panicked"),
                    mt.join().expect("loader thread panicked"),
                )
            });

        Ok(Self::new(
            female_activity?,
            female_temperature?,
            male_activity?,
            male_temperature?,
        ))
    }

    /// Table for a (sex, variable) pair.
    pub fn table(&self, sex: Sex, variable: Variable) -> &ObservationTable {
        match (sex, variable) {
            (Sex::Female, Variable::Activity) => &self.female_activity,
            (Sex::Female, Variable::Temperature) => &self.female_temperature,
            (Sex::Male, Variable::Activity) => &self.male_activity,
            (Sex::Male, Variable::Temperature) => &self.male_temperature,
        }
    }

    /// Row-wise union of female and male activity for the all-sexes
    /// heatmap. Female rows set the length; male columns are merged in
    /// where a male row exists at the same minute.
    pub fn merged_activity(&self) -> ObservationTable {
        let male_rows = self.male_activity.rows();
        let rows = self
            .female_activity
            .rows()
            .iter()
            .enumerate()
            .map(|(minute, row)| {
                let mut combined = row.clone();
                if let Some(male_row) = male_rows.get(minute) {
                    for (id, value) in male_row {
                        combined.insert(id.clone(), *value);
                    }
                }
                combined
            })
            .collect();
        ObservationTable::new(rows)
    }
}

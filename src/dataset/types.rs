//! Observation tables for the circadian datasets.
//!
//! A table holds one row per elapsed minute; each row maps subject ids
//! to readings. A reading of NaN marks a missing or unparseable value,
//! and every aggregator filters NaN explicitly.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Biological sex of a tracked subject group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    /// Subject id prefix for this sex ("f" or "m").
    pub fn prefix(self) -> &'static str {
        match self {
            Sex::Female => "f",
            Sex::Male => "m",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::Female => write!(f, "female"),
            Sex::Male => write!(f, "male"),
        }
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "female" | "f" => Ok(Sex::Female),
            "male" | "m" => Ok(Sex::Male),
            other => Err(format!("unknown sex: {other}")),
        }
    }
}

/// Sex filter as selected in the dashboard controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SexSelection {
    Female,
    Male,
    All,
}

impl SexSelection {
    /// Concrete sexes covered by this selection.
    pub fn sexes(self) -> &'static [Sex] {
        match self {
            SexSelection::Female => &[Sex::Female],
            SexSelection::Male => &[Sex::Male],
            SexSelection::All => &[Sex::Female, Sex::Male],
        }
    }
}

impl fmt::Display for SexSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SexSelection::Female => write!(f, "female"),
            SexSelection::Male => write!(f, "male"),
            SexSelection::All => write!(f, "all"),
        }
    }
}

impl FromStr for SexSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "female" | "f" => Ok(SexSelection::Female),
            "male" | "m" => Ok(SexSelection::Male),
            "all" => Ok(SexSelection::All),
            other => Err(format!("unknown sex selection: {other}")),
        }
    }
}

/// Measured variable in a dataset table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variable {
    Activity,
    Temperature,
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variable::Activity => write!(f, "activity"),
            Variable::Temperature => write!(f, "temperature"),
        }
    }
}

impl FromStr for Variable {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "activity" | "act" => Ok(Variable::Activity),
            "temperature" | "temp" => Ok(Variable::Temperature),
            other => Err(format!("unknown variable: {other}")),
        }
    }
}

/// One minute of readings, keyed by subject id.
pub type ObservationRow = HashMap<String, f64>;

/// An ordered sequence of per-minute observation rows.
///
/// The row index is the minute offset from the start of the dataset:
/// zero-based, contiguous, no gaps.
#[derive(Debug, Clone, Default)]
pub struct ObservationTable {
    rows: Vec<ObservationRow>,
}

impl ObservationTable {
    pub fn new(rows: Vec<ObservationRow>) -> Self {
        Self { rows }
    }

    /// Number of minutes covered by the table.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[ObservationRow] {
        &self.rows
    }

    /// Reading for a subject at a minute; NaN when the column is absent.
    pub fn value(&self, minute: usize, subject: &str) -> f64 {
        self.rows
            .get(minute)
            .and_then(|row| row.get(subject))
            .copied()
            .unwrap_or(f64::NAN)
    }

    /// A subject's full per-minute series, NaN where the column is absent.
    pub fn series(&self, subject: &str) -> Vec<f64> {
        self.rows
            .iter()
            .map(|row| row.get(subject).copied().unwrap_or(f64::NAN))
            .collect()
    }
}

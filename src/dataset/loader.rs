//! CSV parsing for observation tables.
//!
//! Each source file carries a header row of subject ids and one data row
//! per elapsed minute. Every field is parsed as a decimal number; empty
//! or unparseable fields become NaN rather than failing the load. Only a
//! structurally broken source (unreadable file, non-tabular content)
//! raises an error.

use crate::dataset::types::{ObservationRow, ObservationTable};
use std::fmt;
use std::path::{Path, PathBuf};

/// Errors raised while loading a dataset source. Fatal for the whole
/// session: there is no partial-dataset mode.
#[derive(Debug)]
pub enum DataLoadError {
    /// The source file could not be read.
    Io { path: PathBuf, message: String },
    /// The source was readable but not tabular.
    Malformed { path: PathBuf, message: String },
}

impl fmt::Display for DataLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataLoadError::Io { path, message } => {
                write!(f, "cannot read {}: {message}", path.display())
            }
            DataLoadError::Malformed { path, message } => {
                write!(f, "malformed table {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for DataLoadError {}

impl DataLoadError {
    fn from_csv(path: &Path, err: csv::Error) -> Self {
        if err.is_io_error() {
            DataLoadError::Io {
                path: path.to_path_buf(),
                message: err.to_string(),
            }
        } else {
            DataLoadError::Malformed {
                path: path.to_path_buf(),
                message: err.to_string(),
            }
        }
    }
}

/// Parse one tabular source into an observation table.
pub fn load_table(path: &Path) -> Result<ObservationTable, DataLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DataLoadError::from_csv(path, e))?;

    let headers = reader
        .headers()
        .map_err(|e| DataLoadError::from_csv(path, e))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| DataLoadError::from_csv(path, e))?;
        let mut row = ObservationRow::with_capacity(headers.len());
        for (name, field) in headers.iter().zip(record.iter()) {
            let value = field.parse::<f64>().unwrap_or(f64::NAN);
            row.insert(name.to_string(), value);
        }
        rows.push(row);
    }

    Ok(ObservationTable::new(rows))
}

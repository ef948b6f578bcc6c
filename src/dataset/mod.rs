//! Dataset loading and storage.
//!
//! This module parses the four tabular sources (female/male ×
//! activity/temperature) into observation tables and holds them for the
//! lifetime of the process.

pub mod loader;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use loader::{load_table, DataLoadError};
pub use store::{DatasetSources, DatasetStore};
pub use types::{ObservationRow, ObservationTable, Sex, SexSelection, Variable};

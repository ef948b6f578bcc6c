//! Circadia - aggregation core for rodent circadian dashboards.
//!
//! This library turns four tabular datasets of per-minute rodent
//! observations (female/male × activity/temperature, one column per
//! subject) into the hourly and daily aggregates, filtered slices,
//! heatmap grids, and correlation statistics a dashboard renders.
//!
//! The rendering layer stays external: it owns the selection controls
//! and the drawing, and consumes the chart-ready payloads produced
//! here, either through the CLI exporter or the optional HTTP API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Circadia                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐        │
//! │  │   Dataset   │──▶│   Window    │──▶│ Aggregators │        │
//! │  │    Store    │   │  Selector   │   │ (hour/day)  │        │
//! │  └─────────────┘   └─────────────┘   └─────────────┘        │
//! │         │                 │                  │              │
//! │         ▼                 ▼                  ▼              │
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐        │
//! │  │ Correlator  │   │   Heatmap   │   │   Series    │        │
//! │  │  (Pearson)  │   │   Binner    │   │  Builders   │        │
//! │  └─────────────┘   └─────────────┘   └─────────────┘        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use circadia::config::Config;
//! use circadia::core::{self, AggregationMode, Period};
//! use circadia::dataset::{DatasetStore, Sex};
//!
//! let config = Config::load().unwrap_or_default();
//! let store = DatasetStore::load(&config.sources()).expect("datasets");
//!
//! let window = core::select_window(&store, Sex::Female, Period::SevenDays);
//! let hourly = core::hourly_averages(
//!     window.activity,
//!     core::subjects_for(Sex::Female),
//! );
//! let profile = core::day_profile(&hourly, AggregationMode::CrossSubjectAverage);
//! ```

pub mod config;
pub mod core;
pub mod dataset;

#[cfg(feature = "server")]
pub mod server;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError};
pub use core::{
    correlation_summary, daily_averages, daily_flat_means, day_profile, heatmap_grid,
    hourly_averages, minute_series, pearson, scatter_series, select_window, subjects_for,
    AggregationMode, CorrelationSummary, DailyAggregate, HeatmapCell, HourlyAggregate, Period,
    Selection, SubjectSelection, WindowSlices,
};
pub use dataset::{DataLoadError, DatasetSources, DatasetStore, Sex, SexSelection, Variable};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

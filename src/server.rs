//! HTTP API serving chart-ready aggregates to the browser dashboard.
//!
//! This module provides an HTTP server that:
//! - Loads the four dataset sources once at startup (all-or-nothing)
//! - Recomputes aggregates per request from the query's selection
//! - Serves JSON payloads the dashboard charts render directly
//!
//! # Architecture
//!
//! ```text
//! Browser dashboard ──→ GET /api/* ──→ circadia ──→ JSON series
//!                                          │
//!                                   [Dataset Store]
//! ```

use crate::core::selection::{subjects_for, Period, Selection, SubjectSelection};
use crate::core::windowing::select_window;
use crate::core::{
    correlation_summary, daily_flat_means, day_profile, heatmap_grid, hourly_averages,
    minute_series, scatter_series, CorrelationSummary, DailyAggregate, HeatmapCell,
    HourlyAggregate, MinutePoint, ScatterSeries, DEFAULT_SCATTER_POINTS,
};
use crate::dataset::store::{DatasetSources, DatasetStore};
use crate::dataset::types::{Sex, SexSelection, Variable};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind to (0 for random)
    pub port: u16,
    /// Paths of the four dataset sources
    pub sources: DatasetSources,
}

impl ServerConfig {
    /// Create a new server configuration
    pub fn new(port: u16, sources: DatasetSources) -> Self {
        Self { port, sources }
    }
}

/// Shared server state: the loaded dataset store, read-only after
/// startup.
pub struct ServerState {
    store: DatasetStore,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: String, code: &str) -> HandlerError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error,
            code: code.to_string(),
        }),
    )
}

/// Selection parameters common to the chart endpoints.
#[derive(Debug, Default, Deserialize)]
struct SelectionQuery {
    sex: Option<String>,
    period: Option<String>,
    subject: Option<String>,
    variable: Option<String>,
}

impl SelectionQuery {
    fn selection(&self) -> Result<Selection, HandlerError> {
        let sex = self
            .sex
            .as_deref()
            .unwrap_or("female")
            .parse::<SexSelection>()
            .map_err(|e| bad_request(e, "INVALID_SEX"))?;

        let period = self
            .period
            .as_deref()
            .unwrap_or("24h")
            .parse::<Period>()
            .map_err(|e| bad_request(e, "INVALID_PERIOD"))?;

        let subject = self
            .subject
            .as_deref()
            .unwrap_or("average")
            .parse::<SubjectSelection>()
            .map_err(|e| bad_request(e, "INVALID_SUBJECT"))?;

        if !subject.is_valid_for(sex) {
            return Err(bad_request(
                format!("subject {subject} is not in the {sex} roster"),
                "INVALID_SUBJECT",
            ));
        }

        Ok(Selection {
            sex,
            period,
            subject,
        })
    }

    fn variable(&self) -> Result<Variable, HandlerError> {
        self.variable
            .as_deref()
            .unwrap_or("activity")
            .parse::<Variable>()
            .map_err(|e| bad_request(e, "INVALID_VARIABLE"))
    }
}

/// Roster query: a concrete sex plus the previously selected subject.
#[derive(Debug, Default, Deserialize)]
struct RosterQuery {
    sex: Option<String>,
    subject: Option<String>,
}

/// Roster payload for rebuilding the subject control.
#[derive(Serialize)]
pub struct RosterResponse {
    pub sex: Sex,
    pub subjects: Vec<String>,
    /// The prior subject selection carried over to the new sex: same
    /// numeric suffix when the roster has it, otherwise "average".
    pub subject: String,
}

/// Per-sex block of the combined minute series.
#[derive(Serialize)]
pub struct SeriesBlock {
    pub sex: Sex,
    /// True when the tables held less data than the requested period.
    pub truncated: bool,
    pub points: Vec<MinutePoint>,
}

/// Per-sex block of hourly aggregates for one variable.
#[derive(Serialize)]
pub struct HourlyBlock {
    pub sex: Sex,
    pub variable: Variable,
    pub truncated: bool,
    pub hours: Vec<HourlyAggregate>,
}

/// Per-sex block of daily reductions for one variable.
#[derive(Serialize)]
pub struct DailyBlock {
    pub sex: Sex,
    pub variable: Variable,
    /// 24-hour cross-day profile.
    pub profile: Vec<crate::core::HourPoint>,
    /// Per-day flat means for the multi-day trend line.
    pub trend: Vec<DailyAggregate>,
}

/// Per-sex block of the scatter series.
#[derive(Serialize)]
pub struct ScatterBlock {
    pub sex: Sex,
    pub scatter: ScatterSeries,
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /api/roster
///
/// Roster for one sex plus the remapped subject selection, used by the
/// dashboard to rebuild its subject control when the sex filter flips.
async fn roster(Query(query): Query<RosterQuery>) -> Result<Json<RosterResponse>, HandlerError> {
    let sex = query
        .sex
        .as_deref()
        .unwrap_or("female")
        .parse::<Sex>()
        .map_err(|e| bad_request(e, "INVALID_SEX"))?;

    let subject = query
        .subject
        .as_deref()
        .unwrap_or("average")
        .parse::<SubjectSelection>()
        .map_err(|e| bad_request(e, "INVALID_SUBJECT"))?;

    Ok(Json(RosterResponse {
        sex,
        subjects: subjects_for(sex).iter().map(|id| id.to_string()).collect(),
        subject: subject.remap(sex).to_string(),
    }))
}

/// GET /api/series
async fn series(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<SelectionQuery>,
) -> Result<Json<Vec<SeriesBlock>>, HandlerError> {
    let selection = query.selection()?;

    let blocks = selection
        .sexes()
        .into_iter()
        .map(|sex| {
            let window = select_window(&state.store, sex, selection.period);
            SeriesBlock {
                sex,
                truncated: window.is_truncated(),
                points: minute_series(&window, subjects_for(sex), selection.subject.mode()),
            }
        })
        .collect();

    Ok(Json(blocks))
}

/// GET /api/scatter
async fn scatter(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<SelectionQuery>,
) -> Result<Json<Vec<ScatterBlock>>, HandlerError> {
    let selection = query.selection()?;

    let blocks = selection
        .sexes()
        .into_iter()
        .map(|sex| {
            let window = select_window(&state.store, sex, selection.period);
            ScatterBlock {
                sex,
                scatter: scatter_series(
                    &window,
                    subjects_for(sex),
                    selection.subject.mode(),
                    DEFAULT_SCATTER_POINTS,
                ),
            }
        })
        .collect();

    Ok(Json(blocks))
}

/// GET /api/hourly
async fn hourly(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<SelectionQuery>,
) -> Result<Json<Vec<HourlyBlock>>, HandlerError> {
    let selection = query.selection()?;
    let variable = query.variable()?;

    let blocks = selection
        .sexes()
        .into_iter()
        .map(|sex| {
            let window = select_window(&state.store, sex, selection.period);
            let rows = match variable {
                Variable::Activity => window.activity,
                Variable::Temperature => window.temperature,
            };
            HourlyBlock {
                sex,
                variable,
                truncated: window.is_truncated(),
                hours: hourly_averages(rows, subjects_for(sex)),
            }
        })
        .collect();

    Ok(Json(blocks))
}

/// GET /api/daily
async fn daily(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<SelectionQuery>,
) -> Result<Json<Vec<DailyBlock>>, HandlerError> {
    let selection = query.selection()?;
    let variable = query.variable()?;

    let blocks = selection
        .sexes()
        .into_iter()
        .map(|sex| {
            let window = select_window(&state.store, sex, selection.period);
            let rows = match variable {
                Variable::Activity => window.activity,
                Variable::Temperature => window.temperature,
            };
            let subjects = subjects_for(sex);
            let hours = hourly_averages(rows, subjects);
            DailyBlock {
                sex,
                variable,
                profile: day_profile(&hours, selection.subject.mode()),
                trend: daily_flat_means(rows, subjects),
            }
        })
        .collect();

    Ok(Json(blocks))
}

/// GET /api/heatmap
async fn heatmap(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<SelectionQuery>,
) -> Result<Json<Vec<HeatmapCell>>, HandlerError> {
    let selection = query.selection()?;
    let days = selection.period.days();
    let mode = selection.subject.mode();

    let cells = match selection.sexes().as_slice() {
        [sex] => heatmap_grid(
            state.store.table(*sex, Variable::Activity).rows(),
            subjects_for(*sex),
            days,
            mode,
        ),
        // All sexes: merge the two activity tables row-wise and bin
        // over the combined roster.
        _ => {
            let merged = state.store.merged_activity();
            let subjects: Vec<&str> = subjects_for(Sex::Female)
                .iter()
                .chain(subjects_for(Sex::Male))
                .copied()
                .collect();
            heatmap_grid(merged.rows(), &subjects, days, mode)
        }
    };

    Ok(Json(cells))
}

/// GET /api/summary
async fn summary(State(state): State<Arc<ServerState>>) -> Json<CorrelationSummary> {
    Json(correlation_summary(&state.store))
}

/// Run the HTTP server
pub async fn run(
    config: ServerConfig,
) -> anyhow::Result<(SocketAddr, tokio::sync::oneshot::Sender<()>)> {
    let store = DatasetStore::load(&config.sources)?;
    tracing::info!(
        "Loaded datasets: female activity {} rows, male activity {} rows",
        store.table(Sex::Female, Variable::Activity).len(),
        store.table(Sex::Male, Variable::Activity).len()
    );

    let state = Arc::new(ServerState { store });

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/roster", get(roster))
        .route("/api/series", get(series))
        .route("/api/scatter", get(scatter))
        .route("/api/hourly", get(hourly))
        .route("/api/daily", get(daily))
        .route("/api/heatmap", get(heatmap))
        .route("/api/summary", get(summary))
        .layer(
            // The dashboard is static files served from anywhere.
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!("Dashboard API listening on http://{}", actual_addr);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("Server shutdown signal received");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((actual_addr, shutdown_tx))
}

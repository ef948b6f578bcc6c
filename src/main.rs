//! Circadia CLI
//!
//! Computes chart-ready aggregates from the circadian datasets and
//! prints or exports them for the dashboard renderer.

use chrono::Utc;
use circadia::{
    config::Config,
    core::{
        correlation_summary, daily_flat_means, day_profile, heatmap_grid, hourly_averages,
        minute_series, scatter_series, select_window, subjects_for, Period, Selection,
        SubjectSelection, DEFAULT_SCATTER_POINTS,
    },
    dataset::{DatasetStore, Sex, SexSelection, Variable},
    VERSION,
};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "circadia")]
#[command(author = "Circadia Lab")]
#[command(version = VERSION)]
#[command(about = "Aggregation core for rodent circadian dashboards", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SelectionArgs {
    /// Sex filter (female, male, or all)
    #[arg(long, default_value = "female")]
    sex: String,

    /// Time period (24h, 7d, or 14d)
    #[arg(long, default_value = "24h")]
    period: String,

    /// Subject id (e.g. f3) or "average"
    #[arg(long, default_value = "average")]
    subject: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the temperature/activity correlation summary
    Summary,

    /// Print hourly aggregates for a selection
    Hourly {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Variable to aggregate (activity or temperature)
        #[arg(long, default_value = "activity")]
        variable: String,
    },

    /// Print the 24-hour profile and per-day trend for a selection
    Daily {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Variable to aggregate (activity or temperature)
        #[arg(long, default_value = "activity")]
        variable: String,
    },

    /// Print the day-by-hour activity heatmap grid
    Heatmap {
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Print the combined minute series and scatter data
    Series {
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Export every chart payload for a selection
    Export {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Output directory for the export
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Export format (json or jsonl)
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Serve the dashboard API over HTTP
    #[cfg(feature = "server")]
    Serve {
        /// Port to bind to
        #[arg(long, default_value_t = 8787)]
        port: u16,
    },

    /// Show configuration
    Config,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Summary => cmd_summary(),
        Commands::Hourly {
            selection,
            variable,
        } => cmd_hourly(&selection, &variable),
        Commands::Daily {
            selection,
            variable,
        } => cmd_daily(&selection, &variable),
        Commands::Heatmap { selection } => cmd_heatmap(&selection),
        Commands::Series { selection } => cmd_series(&selection),
        Commands::Export {
            selection,
            output,
            format,
        } => cmd_export(&selection, output, &format),
        #[cfg(feature = "server")]
        Commands::Serve { port } => cmd_serve(port),
        Commands::Config => cmd_config(),
    }
}

fn parse_selection(args: &SelectionArgs) -> Selection {
    let result = (|| -> Result<Selection, String> {
        let sex = args.sex.parse::<SexSelection>()?;
        let period = args.period.parse::<Period>()?;
        let subject = args.subject.parse::<SubjectSelection>()?;
        if !subject.is_valid_for(sex) {
            return Err(format!("subject {subject} is not in the {sex} roster"));
        }
        Ok(Selection {
            sex,
            period,
            subject,
        })
    })();

    match result {
        Ok(selection) => selection,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn parse_variable(token: &str) -> Variable {
    match token.parse::<Variable>() {
        Ok(variable) => variable,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn load_store(config: &Config) -> DatasetStore {
    match DatasetStore::load(&config.sources()) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error loading datasets: {e}");
            eprintln!("Data directory: {:?}", config.data_dir);
            eprintln!("Run 'circadia config' to inspect the configured paths.");
            std::process::exit(1);
        }
    }
}

fn warn_if_truncated(window: &circadia::WindowSlices<'_>, sex: Sex, period: Period) {
    if window.is_truncated() {
        eprintln!(
            "Warning: only {} minutes of {sex} data available for period {period}",
            window.len()
        );
    }
}

fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn cmd_summary() {
    let config = Config::load().unwrap_or_default();
    let store = load_store(&config);
    let summary = correlation_summary(&store);

    println!("Temperature-Activity Correlation");
    println!("================================");
    println!();

    println!("Female subjects:");
    for entry in &summary.female {
        println!("  {:<4} r = {:+.3}", entry.subject, entry.r);
    }
    println!();
    println!("Male subjects:");
    for entry in &summary.male {
        println!("  {:<4} r = {:+.3}", entry.subject, entry.r);
    }
    println!();
    println!("Female mean r: {:+.3}", summary.female_mean);
    println!("Male mean r:   {:+.3}", summary.male_mean);
    println!();

    let strength = if summary.female_mean > 0.5 && summary.male_mean > 0.5 {
        "strong"
    } else {
        "moderate"
    };
    let stronger = if summary.female_mean > summary.male_mean {
        "females"
    } else {
        "males"
    };
    println!(
        "Body temperature shows a {strength} positive correlation with \
         activity; the relationship is stronger in {stronger}."
    );
}

fn cmd_hourly(args: &SelectionArgs, variable: &str) {
    let selection = parse_selection(args);
    let variable = parse_variable(variable);
    let config = Config::load().unwrap_or_default();
    let store = load_store(&config);

    let blocks: Vec<serde_json::Value> = selection
        .sexes()
        .into_iter()
        .map(|sex| {
            let window = select_window(&store, sex, selection.period);
            warn_if_truncated(&window, sex, selection.period);
            let rows = match variable {
                Variable::Activity => window.activity,
                Variable::Temperature => window.temperature,
            };
            json!({
                "sex": sex,
                "variable": variable,
                "hours": hourly_averages(rows, subjects_for(sex)),
            })
        })
        .collect();

    print_json(&json!(blocks));
}

fn cmd_daily(args: &SelectionArgs, variable: &str) {
    let selection = parse_selection(args);
    let variable = parse_variable(variable);
    let config = Config::load().unwrap_or_default();
    let store = load_store(&config);

    let blocks: Vec<serde_json::Value> = selection
        .sexes()
        .into_iter()
        .map(|sex| {
            let window = select_window(&store, sex, selection.period);
            warn_if_truncated(&window, sex, selection.period);
            let rows = match variable {
                Variable::Activity => window.activity,
                Variable::Temperature => window.temperature,
            };
            let subjects = subjects_for(sex);
            let hours = hourly_averages(rows, subjects);
            json!({
                "sex": sex,
                "variable": variable,
                "profile": day_profile(&hours, selection.subject.mode()),
                "trend": daily_flat_means(rows, subjects),
            })
        })
        .collect();

    print_json(&json!(blocks));
}

fn cmd_heatmap(args: &SelectionArgs) {
    let selection = parse_selection(args);
    let config = Config::load().unwrap_or_default();
    let store = load_store(&config);

    let days = selection.period.days();
    let mode = selection.subject.mode();

    let cells = match selection.sexes().as_slice() {
        [sex] => heatmap_grid(
            store.table(*sex, Variable::Activity).rows(),
            subjects_for(*sex),
            days,
            mode,
        ),
        _ => {
            let merged = store.merged_activity();
            let subjects: Vec<&str> = subjects_for(Sex::Female)
                .iter()
                .chain(subjects_for(Sex::Male))
                .copied()
                .collect();
            heatmap_grid(merged.rows(), &subjects, days, mode)
        }
    };

    print_json(&json!(cells));
}

fn cmd_series(args: &SelectionArgs) {
    let selection = parse_selection(args);
    let config = Config::load().unwrap_or_default();
    let store = load_store(&config);

    let blocks: Vec<serde_json::Value> = selection
        .sexes()
        .into_iter()
        .map(|sex| {
            let window = select_window(&store, sex, selection.period);
            warn_if_truncated(&window, sex, selection.period);
            let subjects = subjects_for(sex);
            json!({
                "sex": sex,
                "points": minute_series(&window, subjects, selection.subject.mode()),
                "scatter": scatter_series(
                    &window,
                    subjects,
                    selection.subject.mode(),
                    DEFAULT_SCATTER_POINTS,
                ),
            })
        })
        .collect();

    print_json(&json!(blocks));
}

fn cmd_export(args: &SelectionArgs, output: Option<PathBuf>, format: &str) {
    let selection = parse_selection(args);
    let config = Config::load().unwrap_or_default();
    let store = load_store(&config);

    let export_dir = match output {
        Some(dir) => {
            if let Err(e) = std::fs::create_dir_all(&dir) {
                eprintln!("Error creating export directory: {e}");
                std::process::exit(1);
            }
            dir
        }
        None => {
            if let Err(e) = config.ensure_directories() {
                eprintln!("Error creating export directory: {e}");
                std::process::exit(1);
            }
            config.export_path.clone()
        }
    };

    let mut sections: Vec<(&str, serde_json::Value)> = Vec::new();

    for sex in selection.sexes() {
        let window = select_window(&store, sex, selection.period);
        warn_if_truncated(&window, sex, selection.period);
        let subjects = subjects_for(sex);
        let mode = selection.subject.mode();
        let hours_act = hourly_averages(window.activity, subjects);
        let hours_temp = hourly_averages(window.temperature, subjects);

        sections.push((
            "series",
            json!({
                "sex": sex,
                "points": minute_series(&window, subjects, mode),
            }),
        ));
        sections.push((
            "scatter",
            json!({
                "sex": sex,
                "scatter": scatter_series(&window, subjects, mode, DEFAULT_SCATTER_POINTS),
            }),
        ));
        sections.push((
            "daily_activity",
            json!({
                "sex": sex,
                "profile": day_profile(&hours_act, mode),
                "trend": daily_flat_means(window.activity, subjects),
            }),
        ));
        sections.push((
            "daily_temperature",
            json!({
                "sex": sex,
                "profile": day_profile(&hours_temp, mode),
                "trend": daily_flat_means(window.temperature, subjects),
            }),
        ));
        sections.push((
            "heatmap",
            json!({
                "sex": sex,
                "cells": heatmap_grid(
                    store.table(sex, Variable::Activity).rows(),
                    subjects,
                    selection.period.days(),
                    mode,
                ),
            }),
        ));
    }

    sections.push(("summary", json!(correlation_summary(&store))));

    let stamp = Utc::now().format("%Y%m%d_%H%M%S");
    let output_path = export_dir.join(format!(
        "circadia_{stamp}.{}",
        if format == "jsonl" { "jsonl" } else { "json" }
    ));

    let result = if format == "jsonl" {
        // One chart payload per line
        let lines: Vec<String> = sections
            .iter()
            .filter_map(|(chart, data)| {
                serde_json::to_string(&json!({ "chart": chart, "data": data })).ok()
            })
            .collect();
        std::fs::write(&output_path, lines.join("\n"))
    } else {
        let bundle = json!({
            "generated_at": Utc::now().to_rfc3339(),
            "selection": {
                "sex": selection.sex,
                "period": selection.period.to_string(),
                "subject": selection.subject.to_string(),
            },
            "charts": sections
                .iter()
                .map(|(chart, data)| json!({ "chart": chart, "data": data }))
                .collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&bundle) {
            Ok(json) => std::fs::write(&output_path, json),
            Err(e) => {
                eprintln!("Error serializing export: {e}");
                return;
            }
        }
    };

    match result {
        Ok(_) => println!("Exported {} chart payloads to {output_path:?}", sections.len()),
        Err(e) => eprintln!("Error writing export: {e}"),
    }
}

#[cfg(feature = "server")]
fn cmd_serve(port: u16) {
    use circadia::server::{run, ServerConfig};
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::load().unwrap_or_default();
    let server_config = ServerConfig::new(port, config.sources());

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Error starting runtime: {e}");
            std::process::exit(1);
        }
    };

    runtime.block_on(async move {
        match run(server_config).await {
            Ok((addr, shutdown_tx)) => {
                println!("Serving dashboard API on http://{addr}");
                println!("Press Ctrl+C to stop");
                let _ = tokio::signal::ctrl_c().await;
                println!();
                println!("Stopping server...");
                let _ = shutdown_tx.send(());
            }
            Err(e) => {
                eprintln!("Error starting server: {e}");
                std::process::exit(1);
            }
        }
    });
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

//! Cropwatch - a terminal client for the crop-monitoring dashboard.
//!
//! Logs in against the backend, keeps the session tokens between runs, and
//! prints plots, alerts and sensor readings.

mod app;
mod commands;
mod render;

use std::io;
use std::path::Path;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cropwatch_core::models::SeverityFilter;
use cropwatch_core::Config;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;

/// Log file name prefix inside the data directory
const LOG_FILE_PREFIX: &str = "cropwatch.log";

#[derive(Debug, Parser)]
#[command(name = "cropwatch", version, about = "Crop-monitoring dashboard in your terminal")]
struct Cli {
    /// API base URL, e.g. https://farm.example.com/api
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and store the session tokens
    Login {
        /// Defaults to the last username used
        username: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show whether a session is stored
    Status,
    /// Plots, recent alerts and alert counts
    Dashboard,
    /// List alerts, optionally narrowed to one severity
    Alerts {
        #[arg(long, short, default_value = "all")]
        severity: SeverityFilter,
    },
    /// List plots
    Plots,
    /// Latest sensor values and active alerts for a plot
    Plot { id: i64 },
    /// Sensor readings for a plot
    Readings {
        plot_id: i64,
        #[arg(long)]
        sensor_type: Option<String>,
        /// Defaults to 100
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Run alert analysis on one plot, or on all plots
    Analyze {
        #[arg(long)]
        plot: Option<i64>,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir.filter(|dir| std::fs::create_dir_all(dir).is_ok()) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let _log_guard = init_tracing(Config::data_dir().ok().as_deref());
    let config = app::load_config(cli.api_url.as_deref());
    info!(api = %config.api_base_url, "cropwatch starting");

    let mut app = App::new(config)?;
    app.run(cli.command).await
}

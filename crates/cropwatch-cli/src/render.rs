//! Plain-text rendering for command output. Every function returns the text
//! so the commands only decide where it goes.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use cropwatch_core::auth::{Session, SessionStatus};
use cropwatch_core::dashboard::Dashboard;
use cropwatch_core::models::{
    Alert, AlertSummary, AnalysisReport, BatchAnalysisReport, Plot, SensorReading, SensorSummary,
    Severity,
};
use cropwatch_core::utils::{format_age, format_reading, humanize_key, truncate_string};

const NAME_WIDTH: usize = 24;
const MESSAGE_WIDTH: usize = 60;

/// Recommendations listed under each alert
const RECOMMENDATIONS_SHOWN: usize = 2;

pub fn session_status(session: &Session, last_username: Option<&str>) -> String {
    match session.status() {
        SessionStatus::Authenticated => {
            let who = session
                .user
                .as_ref()
                .map(|u| u.display_name())
                .or_else(|| last_username.map(str::to_string));
            match who {
                Some(name) => format!("Logged in as {}", name),
                None => "Logged in".to_string(),
            }
        }
        SessionStatus::Authenticating => "Logging in...".to_string(),
        SessionStatus::Error => format!(
            "Not logged in ({})",
            session.error.as_deref().unwrap_or("login failed")
        ),
        SessionStatus::Anonymous => "Not logged in".to_string(),
    }
}

pub fn plots(plots: &[Plot]) -> String {
    if plots.is_empty() {
        return "No plots yet.\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5}  {:<w$}  {:<14}  {:<10}  {:>8}",
        "ID",
        "NAME",
        "CROP",
        "STATUS",
        "SIZE",
        w = NAME_WIDTH
    );
    for plot in plots {
        let _ = writeln!(
            out,
            "{:>5}  {:<w$}  {:<14}  {:<10}  {:>8}",
            plot.id,
            truncate_string(&plot.name, NAME_WIDTH),
            truncate_string(&plot.crop_type, 14),
            plot.status.to_string(),
            format!("{:.2}", plot.size),
            w = NAME_WIDTH
        );
    }
    out
}

pub fn alerts(alerts: &[Alert], now: DateTime<Utc>) -> String {
    if alerts.is_empty() {
        return "No alerts.\n".to_string();
    }
    let mut out = String::new();
    for alert in alerts {
        let _ = writeln!(
            out,
            "[{:<8}] plot {:<4} {:<10} {}",
            alert.severity.as_str().to_uppercase(),
            alert.plot,
            format_age(alert.timestamp, now),
            truncate_string(&alert.message, MESSAGE_WIDTH)
        );
        for recommendation in alert.recommendations.iter().take(RECOMMENDATIONS_SHOWN) {
            let _ = writeln!(
                out,
                "           - {}",
                truncate_string(recommendation, MESSAGE_WIDTH)
            );
        }
    }
    out
}

pub fn alert_summary(summary: &AlertSummary) -> String {
    let counts = Severity::ALL
        .iter()
        .map(|s| format!("{} {}", summary.count_for(*s), s.as_str()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} alerts: {}\n", summary.total_alerts, counts)
}

pub fn dashboard(dashboard: &Dashboard, now: DateTime<Utc>) -> String {
    if dashboard.is_empty() {
        return "Nothing to show yet.\n".to_string();
    }
    let mut out = String::new();
    if let Some(summary) = &dashboard.summary {
        out.push_str(&alert_summary(summary));
        out.push('\n');
    }
    let _ = writeln!(out, "Plots ({})", dashboard.plots.len());
    out.push_str(&plots(&dashboard.plots));
    out.push_str("\nRecent alerts\n");
    out.push_str(&alerts(&dashboard.recent_alerts, now));
    out
}

pub fn sensor_summary(summary: &SensorSummary, now: DateTime<Utc>) -> String {
    if summary.is_empty() {
        return "No sensor data.\n".to_string();
    }
    let mut out = String::new();
    for (sensor, latest) in summary {
        let value = match latest {
            Some(v) => format!(
                "{} ({})",
                format_reading(v.value, &v.unit),
                format_age(v.timestamp, now)
            ),
            None => "no data".to_string(),
        };
        let _ = writeln!(out, "{:<18} {}", humanize_key(sensor), value);
    }
    out
}

pub fn plot_detail(
    plot: &Plot,
    summary: Option<&SensorSummary>,
    active_alerts: &[Alert],
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} (#{})", plot.name, plot.id);
    let _ = writeln!(
        out,
        "{} | {} | {:.2} | {}",
        plot.crop_type, plot.location, plot.size, plot.status
    );
    if !plot.description.is_empty() {
        let _ = writeln!(out, "{}", plot.description);
    }

    out.push_str("\nLatest readings\n");
    match summary {
        Some(summary) => out.push_str(&sensor_summary(summary, now)),
        None => out.push_str("Unavailable.\n"),
    }

    out.push_str("\nActive alerts\n");
    out.push_str(&alerts(active_alerts, now));
    out
}

pub fn readings(readings: &[SensorReading], now: DateTime<Utc>) -> String {
    if readings.is_empty() {
        return "No readings.\n".to_string();
    }
    let mut out = String::new();
    for reading in readings {
        let _ = writeln!(
            out,
            "{:<18} {:>14}  {}",
            humanize_key(&reading.sensor_type),
            format_reading(reading.value, &reading.unit),
            format_age(reading.timestamp, now)
        );
    }
    out
}

pub fn analysis(plot_id: i64, report: &AnalysisReport, now: DateTime<Utc>) -> String {
    let mut out = format!(
        "Plot {}: {} new alert(s)\n",
        plot_id, report.alerts_generated
    );
    if !report.alerts.is_empty() {
        out.push_str(&alerts(&report.alerts, now));
    }
    out
}

pub fn batch_analysis(report: &BatchAnalysisReport) -> String {
    format!(
        "Analyzed {} plot(s): {} new alert(s)\n",
        report.plots_analyzed, report.total_alerts_generated
    )
}

//! Data loaders behind the dashboard and alert list views.
//!
//! Loaders never fail: a fetch error is logged and the affected section is
//! rendered as "no data". Session errors are still visible to the front end
//! through the navigator hook installed on the `ApiClient`.

use tracing::warn;

use crate::api::{ApiClient, ApiError};
use crate::models::{Alert, AlertSummary, Plot, SeverityFilter};

/// Recent alerts shown on the dashboard.
pub const DASHBOARD_RECENT_ALERTS: usize = 5;

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    pub plots: Vec<Plot>,
    pub recent_alerts: Vec<Alert>,
    pub summary: Option<AlertSummary>,
}

impl Dashboard {
    pub fn is_empty(&self) -> bool {
        self.plots.is_empty() && self.recent_alerts.is_empty() && self.summary.is_none()
    }
}

fn or_no_data<T>(what: &str, result: Result<T, ApiError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(section = what, error = %e, "Failed to load data");
            None
        }
    }
}

/// Fetch plots, recent alerts and the alert summary concurrently.
pub async fn load_dashboard(api: &ApiClient) -> Dashboard {
    let (plots, recent, summary) = futures::join!(
        api.fetch_plots(),
        api.fetch_recent_alerts(),
        api.fetch_alert_summary(),
    );

    let mut recent_alerts = or_no_data("recent alerts", recent).unwrap_or_default();
    recent_alerts.truncate(DASHBOARD_RECENT_ALERTS);

    Dashboard {
        plots: or_no_data("plots", plots).unwrap_or_default(),
        recent_alerts,
        summary: or_no_data("alert summary", summary),
    }
}

/// All alerts matching `filter`.
pub async fn load_alerts(api: &ApiClient, filter: SeverityFilter) -> Vec<Alert> {
    or_no_data("alerts", api.fetch_alerts().await)
        .map(|alerts| filter.apply(alerts))
        .unwrap_or_default()
}

use crate::models::sensor::DEFAULT_READINGS_LIMIT;
use crate::models::{
    Alert, AlertSummary, AnalysisReport, BatchAnalysisReport, NewPlot, Plot, PlotUpdate,
    SensorReading, SensorSummary,
};

use super::{ApiClient, ApiError, ApiRequest};

impl ApiClient {
    // ===== Plots =====

    pub async fn fetch_plots(&self) -> Result<Vec<Plot>, ApiError> {
        self.fetch(ApiRequest::get("plots/")).await
    }

    pub async fn fetch_plot(&self, id: i64) -> Result<Plot, ApiError> {
        self.fetch(ApiRequest::get(format!("plots/{}/", id))).await
    }

    /// Latest value per sensor type for a plot
    pub async fn fetch_sensor_summary(&self, plot_id: i64) -> Result<SensorSummary, ApiError> {
        self.fetch(ApiRequest::get(format!("plots/{}/sensor_data_summary/", plot_id)))
            .await
    }

    /// Unresolved alerts for a plot, newest first
    pub async fn fetch_plot_active_alerts(&self, plot_id: i64) -> Result<Vec<Alert>, ApiError> {
        self.fetch(ApiRequest::get(format!("plots/{}/active_alerts/", plot_id)))
            .await
    }

    pub async fn create_plot(&self, plot: &NewPlot) -> Result<Plot, ApiError> {
        self.fetch(ApiRequest::post("plots/").json(plot)?).await
    }

    pub async fn update_plot(&self, id: i64, update: &PlotUpdate) -> Result<Plot, ApiError> {
        self.fetch(ApiRequest::patch(format!("plots/{}/", id)).json(update)?)
            .await
    }

    pub async fn delete_plot(&self, id: i64) -> Result<(), ApiError> {
        self.execute(&ApiRequest::delete(format!("plots/{}/", id)))
            .await
            .map(|_| ())
    }

    // ===== Alerts =====

    pub async fn fetch_alerts(&self) -> Result<Vec<Alert>, ApiError> {
        self.fetch(ApiRequest::get("alerts/")).await
    }

    /// Alerts raised in the last 24 hours
    pub async fn fetch_recent_alerts(&self) -> Result<Vec<Alert>, ApiError> {
        self.fetch(ApiRequest::get("alerts/recent/")).await
    }

    pub async fn fetch_critical_alerts(&self) -> Result<Vec<Alert>, ApiError> {
        self.fetch(ApiRequest::get("alerts/critical/")).await
    }

    pub async fn fetch_alerts_by_plot(&self, plot_id: i64) -> Result<Vec<Alert>, ApiError> {
        self.fetch(ApiRequest::get("alerts/by_plot/").query("plot_id", plot_id))
            .await
    }

    pub async fn fetch_alert_summary(&self) -> Result<AlertSummary, ApiError> {
        self.fetch(ApiRequest::get("alerts/summary/")).await
    }

    // ===== Analysis =====

    /// Run server-side analysis on a plot's latest readings
    pub async fn analyze_plot(&self, plot_id: i64) -> Result<AnalysisReport, ApiError> {
        let body = serde_json::json!({ "plot_id": plot_id });
        self.fetch(ApiRequest::post("analysis/analyze_latest/").json(&body)?)
            .await
    }

    pub async fn batch_analyze(&self) -> Result<BatchAnalysisReport, ApiError> {
        self.fetch(ApiRequest::post("analysis/batch_analyze/")).await
    }

    // ===== Sensor Readings =====

    /// Readings for a plot, optionally narrowed to one sensor type.
    /// `limit` defaults to 100.
    pub async fn fetch_readings(
        &self,
        plot_id: i64,
        sensor_type: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<SensorReading>, ApiError> {
        let mut request = ApiRequest::get("sensor-readings/").query("plot_id", plot_id);
        if let Some(sensor_type) = sensor_type {
            request = request.query("sensor_type", sensor_type);
        }
        request = request.query("limit", limit.unwrap_or(DEFAULT_READINGS_LIMIT));
        self.fetch(request).await
    }

    pub async fn fetch_latest_readings(&self, plot_id: i64) -> Result<Vec<SensorReading>, ApiError> {
        self.fetch(ApiRequest::get("sensor-readings/latest/").query("plot_id", plot_id))
            .await
    }
}

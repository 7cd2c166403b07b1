use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlotStatus {
    #[default]
    Active,
    Inactive,
    Archived,
}

impl std::fmt::Display for PlotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlotStatus::Active => write!(f, "Active"),
            PlotStatus::Inactive => write!(f, "Inactive"),
            PlotStatus::Archived => write!(f, "Archived"),
        }
    }
}

/// A field plot owned by the current user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plot {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub crop_type: String,
    /// Hectares
    #[serde(default)]
    pub size: f64,
    #[serde(default)]
    pub status: PlotStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for `POST plots/`.
#[derive(Debug, Clone, Serialize)]
pub struct NewPlot {
    pub name: String,
    pub location: String,
    pub crop_type: String,
    pub size: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PlotStatus>,
}

/// Payload for `PATCH plots/{id}/`. Only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlotUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PlotStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_from_backend_json() {
        let json = r#"{
            "id": 3,
            "name": "North Field",
            "description": "",
            "location": "Valley Rd",
            "crop_type": "corn",
            "size": 2.5,
            "status": "archived",
            "created_at": "2024-05-01T08:30:00Z",
            "updated_at": "2024-05-02T08:30:00Z",
            "user": 1
        }"#;
        let plot: Plot = serde_json::from_str(json).unwrap();
        assert_eq!(plot.name, "North Field");
        assert_eq!(plot.status, PlotStatus::Archived);
        assert!(plot.created_at.is_some());
    }

    #[test]
    fn test_plot_update_sends_only_set_fields() {
        let update = PlotUpdate {
            status: Some(PlotStatus::Inactive),
            ..PlotUpdate::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"status": "inactive"}));
    }
}

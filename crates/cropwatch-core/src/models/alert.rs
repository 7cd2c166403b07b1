use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Alert severity, ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Most urgent first, the order alerts are presented in.
    pub const ALL: [Severity; 4] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "Low"),
            Severity::Medium => write!(f, "Medium"),
            Severity::High => write!(f, "High"),
            Severity::Critical => write!(f, "Critical"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown severity '{0}' (expected all, critical, high, medium or low)")]
pub struct ParseSeverityError(pub String);

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}

/// Which alerts the alert list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeverityFilter {
    #[default]
    All,
    Only(Severity),
}

impl SeverityFilter {
    pub fn matches(&self, alert: &Alert) -> bool {
        match self {
            SeverityFilter::All => true,
            SeverityFilter::Only(severity) => alert.severity == *severity,
        }
    }

    pub fn apply(&self, alerts: Vec<Alert>) -> Vec<Alert> {
        alerts.into_iter().filter(|a| self.matches(a)).collect()
    }
}

impl FromStr for SeverityFilter {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(SeverityFilter::All)
        } else {
            s.parse().map(SeverityFilter::Only)
        }
    }
}

impl std::fmt::Display for SeverityFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeverityFilter::All => write!(f, "All"),
            SeverityFilter::Only(severity) => write!(f, "{}", severity),
        }
    }
}

/// A threshold alert raised for one plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    /// Plot id
    pub plot: i64,
    pub alert_type: String,
    pub severity: Severity,
    pub message: String,
    #[serde(default)]
    pub current_value: f64,
    #[serde(default)]
    pub threshold_value: f64,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub is_resolved: bool,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    pub timestamp: DateTime<Utc>,
}

/// Counts returned by `alerts/summary/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertSummary {
    pub total_alerts: u64,
    #[serde(default)]
    pub critical: u64,
    #[serde(default)]
    pub high: u64,
    #[serde(default)]
    pub medium: u64,
    #[serde(default)]
    pub low: u64,
    #[serde(default)]
    pub by_type: BTreeMap<String, u64>,
}

impl AlertSummary {
    pub fn count_for(&self, severity: Severity) -> u64 {
        match severity {
            Severity::Low => self.low,
            Severity::Medium => self.medium,
            Severity::High => self.high,
            Severity::Critical => self.critical,
        }
    }
}

/// Result of `analysis/analyze_latest/` for a single plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub alerts_generated: u64,
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

/// Result of `analysis/batch_analyze/` across all plots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchAnalysisReport {
    pub total_alerts_generated: u64,
    pub plots_analyzed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(id: i64, severity: Severity) -> Alert {
        Alert {
            id,
            plot: 1,
            alert_type: "soil_moisture".to_string(),
            severity,
            message: format!("alert {}", id),
            current_value: 12.0,
            threshold_value: 20.0,
            recommendations: vec![],
            is_resolved: false,
            resolved_at: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
    }

    #[test]
    fn test_severity_filter_from_str() {
        assert_eq!("all".parse::<SeverityFilter>(), Ok(SeverityFilter::All));
        assert_eq!("ALL".parse::<SeverityFilter>(), Ok(SeverityFilter::All));
        assert_eq!(
            "critical".parse::<SeverityFilter>(),
            Ok(SeverityFilter::Only(Severity::Critical))
        );
        assert_eq!(
            " High ".parse::<SeverityFilter>(),
            Ok(SeverityFilter::Only(Severity::High))
        );
        assert!("urgent".parse::<SeverityFilter>().is_err());
    }

    #[test]
    fn test_severity_filter_apply() {
        let alerts = vec![
            alert(1, Severity::Low),
            alert(2, Severity::Critical),
            alert(3, Severity::Critical),
            alert(4, Severity::Medium),
        ];

        assert_eq!(SeverityFilter::All.apply(alerts.clone()).len(), 4);

        let critical = SeverityFilter::Only(Severity::Critical).apply(alerts.clone());
        assert_eq!(critical.iter().map(|a| a.id).collect::<Vec<_>>(), vec![2, 3]);

        assert!(SeverityFilter::Only(Severity::High).apply(alerts).is_empty());
    }

    #[test]
    fn test_alert_from_backend_json() {
        let json = r#"{
            "id": 11,
            "plot": 3,
            "alert_type": "temperature",
            "severity": "high",
            "message": "Temperature above threshold",
            "current_value": 38.5,
            "threshold_value": 35.0,
            "recommendations": ["Increase irrigation", "Install shade nets"],
            "is_resolved": false,
            "resolved_at": null,
            "timestamp": "2024-07-01T14:05:00.123456Z"
        }"#;
        let parsed: Alert = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.severity, Severity::High);
        assert_eq!(parsed.recommendations.len(), 2);
        assert!(parsed.resolved_at.is_none());
    }

    #[test]
    fn test_summary_count_for() {
        let json = r#"{
            "total_alerts": 9, "critical": 1, "high": 2, "medium": 3, "low": 3,
            "by_type": {"temperature": 4, "humidity": 5}
        }"#;
        let summary: AlertSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.count_for(Severity::Critical), 1);
        assert_eq!(summary.count_for(Severity::Low), 3);
        assert_eq!(summary.by_type.get("humidity"), Some(&5));
    }
}

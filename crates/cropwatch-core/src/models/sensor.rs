use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default number of readings requested from `sensor-readings/`.
pub const DEFAULT_READINGS_LIMIT: u32 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub id: i64,
    /// Plot id
    pub plot: i64,
    pub sensor_type: String,
    pub value: f64,
    #[serde(default)]
    pub unit: String,
    pub timestamp: DateTime<Utc>,
}

/// Latest value for one sensor type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestValue {
    pub value: f64,
    #[serde(default)]
    pub unit: String,
    pub timestamp: DateTime<Utc>,
}

/// Latest value per sensor type for a plot; `None` when the plot has no
/// reading of that type yet.
pub type SensorSummary = BTreeMap<String, Option<LatestValue>>;

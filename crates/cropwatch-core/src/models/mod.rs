//! Data models for crop-monitoring entities.
//!
//! This module contains the data structures returned by the backend:
//!
//! - `UserInfo`, `LoginResponse`: Identity returned by the login exchange
//! - `Plot`, `NewPlot`, `PlotUpdate`: Field plots and their write payloads
//! - `Alert`, `Severity`, `SeverityFilter`, `AlertSummary`: Sensor alerts
//! - `SensorReading`, `SensorSummary`: Raw readings and latest values
//! - `AnalysisReport`, `BatchAnalysisReport`: Results of server-side analysis

pub mod alert;
pub mod plot;
pub mod sensor;
pub mod user;

pub use alert::{AnalysisReport, Alert, AlertSummary, BatchAnalysisReport, Severity, SeverityFilter};
pub use plot::{NewPlot, Plot, PlotStatus, PlotUpdate};
pub use sensor::{LatestValue, SensorReading, SensorSummary};
pub use user::{LoginResponse, UserInfo};

//! Core library for cropwatch, a client for a crop-monitoring dashboard API.
//!
//! - `auth`: session state, login/logout/restore, token storage backends
//! - `api`: the authenticated request pipeline and typed resource calls
//! - `dashboard`: data loaders for the dashboard and alert list views
//! - `models`: plots, alerts, sensor readings, user info
//! - `config`: persisted application configuration

pub mod api;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod utils;

pub use api::{ApiClient, ApiError, Navigator, LOGIN_ROUTE};
pub use auth::{SessionStore, TokenStore};
pub use config::Config;

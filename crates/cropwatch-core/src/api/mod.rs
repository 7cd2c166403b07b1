//! REST API client module for the crop-monitoring backend.
//!
//! This module provides the `ApiClient`, which wraps every request in the
//! token pipeline (attach token, refresh once on 401, retry), and the typed
//! resource calls for plots, alerts, sensor readings and analysis.
//!
//! The API uses `Authorization: Token <access>` authentication obtained
//! through the `auth/login/` endpoint.

pub mod client;
pub mod error;
mod resources;

pub use client::{ApiClient, ApiRequest, Navigator, LOGIN_ROUTE};
pub use error::ApiError;

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use cropwatch_core::auth::MemoryTokenStore;
use cropwatch_core::{ApiClient, Config, Navigator};
use serde_json::{json, Value};

/// Navigator that remembers every route it was sent to.
#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes.lock().unwrap().push(route.to_string());
    }
}

pub fn config_for(base_url: &str) -> Config {
    Config {
        api_base_url: base_url.to_string(),
        ..Config::default()
    }
}

/// Client against `base_url` with the given stored tokens and a recording navigator.
pub fn client_with_tokens(
    base_url: &str,
    access: Option<&str>,
    refresh: Option<&str>,
) -> (ApiClient, Arc<MemoryTokenStore>, Arc<RecordingNavigator>) {
    let tokens = Arc::new(MemoryTokenStore::with_tokens(access, refresh));
    let navigator = Arc::new(RecordingNavigator::default());
    let api = ApiClient::new(&config_for(base_url), tokens.clone())
        .unwrap()
        .with_navigator(navigator.clone());
    (api, tokens, navigator)
}

pub fn plot_json(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": "",
        "location": "Valley Rd",
        "crop_type": "corn",
        "size": 1.5,
        "status": "active",
        "created_at": "2024-05-01T08:30:00Z",
        "updated_at": "2024-05-01T08:30:00Z"
    })
}

pub fn alert_json(id: i64, severity: &str) -> Value {
    json!({
        "id": id,
        "plot": 1,
        "alert_type": "soil_moisture",
        "severity": severity,
        "message": format!("Soil moisture low ({})", id),
        "current_value": 12.5,
        "threshold_value": 20.0,
        "recommendations": ["Irrigate within 24 hours"],
        "is_resolved": false,
        "resolved_at": null,
        "timestamp": "2024-07-01T14:05:00Z"
    })
}

pub fn user_json(id: i64, username: &str) -> Value {
    json!({
        "id": id,
        "username": username,
        "email": format!("{}@farm.test", username),
        "role": "farmer",
        "first_name": "",
        "last_name": ""
    })
}

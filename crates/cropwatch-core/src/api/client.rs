//! Authenticated request pipeline for the crop-monitoring REST API.
//!
//! Every request made through `ApiClient::execute` reads the persisted access
//! token and attaches it as `Authorization: Token <access>`. A 401 on the
//! first attempt triggers exactly one refresh exchange; when that succeeds the
//! original request is sent again with the new token. If the refresh fails or
//! the resent request is rejected as well, the stored tokens are cleared and
//! the configured `Navigator` is sent to `/login`.

use std::sync::Arc;

use reqwest::{header, Client, Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::auth::{TokenKey, TokenStore};
use crate::config::Config;
use crate::models::LoginResponse;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Credential exchange endpoint, relative to the API base URL
const LOGIN_PATH: &str = "auth/login/";

/// Refresh exchange endpoint, relative to the API base URL
const REFRESH_PATH: &str = "auth/refresh/";

/// Scheme used in the Authorization header
const AUTH_SCHEME: &str = "Token";

/// Route the front end is sent to when the session cannot be renewed.
pub const LOGIN_ROUTE: &str = "/login";

/// Front-end hook for the forced redirect after the session could not be
/// renewed.
///
/// By the time `navigate` runs the stored tokens are already gone, but a
/// `SessionStore` sharing them still holds its in-memory copy. Front ends
/// should call `SessionStore::logout` from here (or right after the failing
/// request returns) so the session reads as anonymous.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Retry state carried alongside a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    First,
    Retried,
}

/// A request description that can be sent more than once.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidResponse(format!("Unserializable request body: {}", e)))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh: &'a str,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
    /// Present when the backend rotates refresh tokens
    #[serde(default)]
    refresh: Option<String>,
}

/// API client for the crop-monitoring backend.
/// Clone is cheap - reqwest::Client and the token store are shared.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    login_field: String,
    tokens: Arc<dyn TokenStore>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl ApiClient {
    /// Create a new API client reading and writing tokens through `tokens`.
    pub fn new(config: &Config, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            login_field: config.login_identifier_field.clone(),
            tokens,
            navigator: None,
        })
    }

    /// Install the handler notified when the session cannot be renewed.
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorization_value(token: &str) -> String {
        format!("{} {}", AUTH_SCHEME, token)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Pull a readable message out of a DRF-style error body.
    fn backend_message(body: &str) -> Option<String> {
        let value: serde_json::Value = serde_json::from_str(body).ok()?;
        if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
            return Some(detail.to_string());
        }
        value
            .get("non_field_errors")
            .and_then(|errors| errors.get(0))
            .and_then(|first| first.as_str())
            .map(String::from)
    }

    // ===== Credential Exchange =====

    /// Exchange credentials for tokens. Sent without an Authorization header
    /// and outside the refresh pipeline.
    pub async fn login_exchange(
        &self,
        identifier: &str,
        password: &str,
    ) -> Result<LoginResponse, ApiError> {
        let mut body = serde_json::Map::new();
        body.insert(self.login_field.clone(), identifier.into());
        body.insert("password".to_string(), password.into());

        let response = self
            .client
            .post(self.url(LOGIN_PATH))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            let text = response.text().await.unwrap_or_default();
            let message = Self::backend_message(&text).unwrap_or_else(|| "Login failed".to_string());
            warn!(%status, "Login rejected");
            return Err(ApiError::Credentials(message));
        }

        let response = Self::check_response(response).await?;
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Malformed login response: {}", e)))
    }

    /// Mint a new access token from the stored refresh token and persist it.
    pub async fn refresh_access_token(&self) -> Result<String, ApiError> {
        let refresh = self
            .tokens
            .refresh_token()?
            .ok_or_else(|| ApiError::RefreshExpired("no refresh token stored".to_string()))?;

        let response = self
            .client
            .post(self.url(REFRESH_PATH))
            .json(&RefreshRequest { refresh: &refresh })
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let text = response.text().await?;
        let renewed: RefreshResponse = serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Malformed refresh response: {}", e)))?;

        self.tokens.set(TokenKey::Access, &renewed.access)?;
        if let Some(ref rotated) = renewed.refresh {
            self.tokens.set(TokenKey::Refresh, rotated)?;
        }
        info!("Access token refreshed");
        Ok(renewed.access)
    }

    /// Clear the stored tokens and send the front end to the login route.
    fn end_session(&self) {
        if let Err(e) = self.tokens.clear() {
            warn!(error = %e, "Failed to clear stored tokens");
        }
        if let Some(ref navigator) = self.navigator {
            navigator.navigate(LOGIN_ROUTE);
        }
    }

    /// Refresh after a 401, or tear the session down if that is impossible.
    async fn recover_session(&self) -> Result<(), ApiError> {
        match self.refresh_access_token().await {
            Ok(_) => Ok(()),
            Err(e) => {
                warn!(error = %e, "Token refresh failed, clearing stored session");
                self.end_session();
                let reason = match e {
                    ApiError::RefreshExpired(reason) => reason,
                    other => other.to_string(),
                };
                Err(ApiError::RefreshExpired(reason))
            }
        }
    }

    // ===== Request Pipeline =====

    async fn send_once(&self, request: &ApiRequest) -> Result<Response, ApiError> {
        let mut builder = self
            .client
            .request(request.method.clone(), self.url(&request.path));

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }
        if let Some(token) = self.tokens.access_token()? {
            builder = builder.header(header::AUTHORIZATION, Self::authorization_value(&token));
        }

        debug!(method = %request.method, path = %request.path, "Sending request");
        Ok(builder.send().await?)
    }

    /// Send a request through the pipeline and return the successful response.
    pub async fn execute(&self, request: &ApiRequest) -> Result<Response, ApiError> {
        let mut attempt = Attempt::First;

        loop {
            let response = self.send_once(request).await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response);
            }

            if status == StatusCode::UNAUTHORIZED {
                match attempt {
                    Attempt::First => {
                        attempt = Attempt::Retried;
                        warn!(path = %request.path, "Access token rejected, attempting refresh");
                        self.recover_session().await?;
                        continue;
                    }
                    Attempt::Retried => {
                        // Never refresh twice for one request
                        warn!(path = %request.path, "Refreshed token rejected, clearing stored session");
                        self.end_session();
                        return Err(ApiError::Unauthorized);
                    }
                }
            }

            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }
    }

    /// Send a request and decode its JSON body.
    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let response = self.execute(&request).await?;
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!(
                "Failed to parse {} {}: {}",
                request.method, request.path, e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;

    fn client(base: &str) -> ApiClient {
        let config = Config {
            api_base_url: base.to_string(),
            ..Config::default()
        };
        ApiClient::new(&config, Arc::new(MemoryTokenStore::new())).unwrap()
    }

    #[test]
    fn test_url_joining() {
        let api = client("http://localhost:8000/api/");
        assert_eq!(api.url("plots/"), "http://localhost:8000/api/plots/");
        assert_eq!(api.url("/alerts/recent/"), "http://localhost:8000/api/alerts/recent/");
    }

    #[test]
    fn test_authorization_value_uses_token_scheme() {
        assert_eq!(ApiClient::authorization_value("abc123"), "Token abc123");
    }

    #[test]
    fn test_backend_message() {
        assert_eq!(
            ApiClient::backend_message(r#"{"detail": "Token is invalid or expired"}"#).as_deref(),
            Some("Token is invalid or expired")
        );
        assert_eq!(
            ApiClient::backend_message(r#"{"non_field_errors": ["Invalid credentials"]}"#).as_deref(),
            Some("Invalid credentials")
        );
        assert!(ApiClient::backend_message("<html>").is_none());
        assert!(ApiClient::backend_message(r#"{"username": ["required"]}"#).is_none());
    }

    #[test]
    fn test_request_builder() {
        let request = ApiRequest::get("sensor-readings/")
            .query("plot_id", 4)
            .query("limit", 100);
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.path(), "sensor-readings/");
        assert_eq!(
            request.query,
            vec![
                ("plot_id".to_string(), "4".to_string()),
                ("limit".to_string(), "100".to_string())
            ]
        );
    }
}

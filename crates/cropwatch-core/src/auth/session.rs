use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{LoginResponse, UserInfo};

use super::tokens::{StoreError, TokenKey, TokenStore};

/// Where the session is in the login lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Anonymous,
    Authenticating,
    Authenticated,
    Error,
}

/// Transitions applied to a `Session`.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction {
    LoginStart,
    LoginSuccess {
        token: String,
        refresh: Option<String>,
        user: UserInfo,
    },
    LoginError(String),
    Logout,
    RestoreToken {
        token: String,
        refresh: Option<String>,
    },
}

/// In-memory view of the current user and tokens.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<UserInfo>,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Session {
    /// Authenticated exactly when an access token is held.
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn status(&self) -> SessionStatus {
        if self.loading {
            SessionStatus::Authenticating
        } else if self.is_authenticated() {
            SessionStatus::Authenticated
        } else if self.error.is_some() {
            SessionStatus::Error
        } else {
            SessionStatus::Anonymous
        }
    }

    /// Apply a transition. Pure: persistence is the store's job.
    pub fn apply(&mut self, action: SessionAction) {
        match action {
            SessionAction::LoginStart => {
                self.loading = true;
                self.error = None;
            }
            SessionAction::LoginSuccess {
                token,
                refresh,
                user,
            } => {
                self.user = Some(user);
                self.access_token = Some(token);
                self.refresh_token = refresh;
                self.loading = false;
                self.error = None;
            }
            SessionAction::LoginError(message) => {
                self.error = Some(message);
                self.loading = false;
            }
            SessionAction::Logout => {
                self.user = None;
                self.access_token = None;
                self.refresh_token = None;
                self.loading = false;
            }
            SessionAction::RestoreToken { token, refresh } => {
                self.access_token = Some(token);
                self.refresh_token = refresh;
            }
        }
    }
}

/// Owns the session and keeps it consistent with the persisted tokens.
///
/// Share it as `Arc<SessionStore>`; every method takes `&self`. The session
/// lock is never held across an await, and each completed login persists
/// and updates memory under one lock so overlapping logins cannot leave the
/// two disagreeing.
pub struct SessionStore {
    session: Mutex<Session>,
    tokens: Arc<dyn TokenStore>,
    api: ApiClient,
}

impl SessionStore {
    /// Create an empty (anonymous) store. Call `restore` to pick up a
    /// previous session.
    pub fn new(api: ApiClient, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            session: Mutex::new(Session::default()),
            tokens,
            api,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        // A panic mid-transition leaves plain data behind; keep using it.
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn dispatch(&self, action: SessionAction) {
        self.lock().apply(action);
    }

    /// Copy of the current session for rendering.
    pub fn snapshot(&self) -> Session {
        self.lock().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.lock().is_authenticated()
    }

    pub fn status(&self) -> SessionStatus {
        self.lock().status()
    }

    /// Restore a previous session from storage without contacting the
    /// backend. Returns whether an access token was found. An expired token
    /// is discovered on the first request that gets a 401.
    pub fn restore(&self) -> Result<bool, StoreError> {
        let Some(token) = self.tokens.access_token()? else {
            debug!("No stored access token");
            return Ok(false);
        };
        let refresh = self.tokens.refresh_token()?;
        debug!(has_refresh = refresh.is_some(), "Restoring stored session");
        self.dispatch(SessionAction::RestoreToken { token, refresh });
        Ok(true)
    }

    /// Exchange credentials for tokens and record the result.
    ///
    /// Failures are recorded on the session and also returned so the caller
    /// decides how to present them.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<LoginResponse, ApiError> {
        self.dispatch(SessionAction::LoginStart);

        let response = match self.api.login_exchange(identifier, password).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Login failed");
                self.dispatch(SessionAction::LoginError(e.to_string()));
                return Err(e);
            }
        };

        let mut session = self.lock();
        if let Err(e) = self.persist(&response) {
            warn!(error = %e, "Failed to persist login tokens");
            session.apply(SessionAction::LoginError(e.to_string()));
            return Err(e.into());
        }
        session.apply(SessionAction::LoginSuccess {
            token: response.token.clone(),
            refresh: response.refresh.clone(),
            user: response.user.clone(),
        });
        info!(user_id = response.user.id, "Logged in");

        Ok(response)
    }

    fn persist(&self, response: &LoginResponse) -> Result<(), StoreError> {
        self.tokens.set(TokenKey::Access, &response.token)?;
        match response.refresh {
            Some(ref refresh) => self.tokens.set(TokenKey::Refresh, refresh),
            None => self.tokens.remove(TokenKey::Refresh),
        }
    }

    /// Forget the session locally. There is no server-side invalidation.
    ///
    /// Memory is always cleared; a storage failure is reported afterwards.
    pub fn logout(&self) -> Result<(), StoreError> {
        let mut session = self.lock();
        session.apply(SessionAction::Logout);
        info!("Logged out");
        self.tokens.clear()
    }
}

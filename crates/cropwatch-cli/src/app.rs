//! Application root: owns the config, the API client and the session store,
//! and hands them to the individual commands.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use cropwatch_core::auth::SessionStore;
use cropwatch_core::{ApiClient, ApiError, Config, Navigator, LOGIN_ROUTE};
use tracing::{debug, warn};

use crate::Command;

/// Load the config, then apply `CROPWATCH_API_URL` and the `--api-url` flag.
pub fn load_config(api_url: Option<&str>) -> Config {
    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };
    config.apply_env();
    if let Some(url) = api_url {
        config.api_base_url = url.to_string();
    }
    config
}

/// Receives the forced redirect when the session could not be renewed.
#[derive(Default)]
pub struct TerminalNavigator {
    redirected: AtomicBool,
}

impl TerminalNavigator {
    pub fn redirected(&self) -> bool {
        self.redirected.load(Ordering::SeqCst)
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: &str) {
        debug!(route, "Redirect requested");
        // Several concurrent requests may each fail to refresh; tell the user once.
        if route == LOGIN_ROUTE && !self.redirected.swap(true, Ordering::SeqCst) {
            eprintln!("Your session has expired. Run `cropwatch login` to sign in again.");
        }
    }
}

pub struct App {
    pub config: Config,
    pub api: ApiClient,
    pub session: Arc<SessionStore>,
    pub navigator: Arc<TerminalNavigator>,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let tokens = config.token_store()?;
        let navigator = Arc::new(TerminalNavigator::default());

        let api = ApiClient::new(&config, tokens.clone())
            .context("Failed to create HTTP client")?
            .with_navigator(navigator.clone());
        let session = Arc::new(SessionStore::new(api.clone(), tokens));

        match session.restore() {
            Ok(restored) => debug!(restored, "Session restore finished"),
            Err(e) => warn!(error = %e, "Failed to read stored tokens"),
        }

        Ok(Self {
            config,
            api,
            session,
            navigator,
        })
    }

    pub async fn run(&mut self, command: Command) -> Result<()> {
        let result = match command {
            Command::Login { username } => self.login(username).await,
            Command::Logout => self.logout(),
            Command::Status => self.status(),
            Command::Dashboard => self.dashboard().await,
            Command::Alerts { severity } => self.alerts(severity).await,
            Command::Plots => self.plots().await,
            Command::Plot { id } => self.plot(id).await,
            Command::Readings {
                plot_id,
                sensor_type,
                limit,
            } => self.readings(plot_id, sensor_type.as_deref(), limit).await,
            Command::Analyze { plot } => self.analyze(plot).await,
        };

        // Storage is already cleared by the pipeline; bring memory in line.
        let session_ended = result
            .as_ref()
            .err()
            .and_then(|e| e.downcast_ref::<ApiError>())
            .is_some_and(ApiError::requires_login);
        if self.navigator.redirected() || session_ended {
            if let Err(e) = self.session.logout() {
                warn!(error = %e, "Failed to clear session after redirect");
            }
            if result.is_ok() {
                bail!("Session expired");
            }
        }
        result
    }

    /// Fail early when there is no stored session to use.
    pub fn require_session(&self) -> Result<()> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            bail!("Not logged in. Run `cropwatch login` first.")
        }
    }
}

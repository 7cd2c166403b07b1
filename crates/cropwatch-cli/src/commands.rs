//! Subcommand handlers.

use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};
use chrono::Utc;
use cropwatch_core::dashboard::{load_alerts, load_dashboard};
use cropwatch_core::models::SeverityFilter;
use tracing::warn;

use crate::app::App;
use crate::render;

/// Read the password from here instead of prompting, for scripted use.
const PASSWORD_ENV: &str = "CROPWATCH_PASSWORD";

fn prompt_line(label: &str) -> Result<String> {
    eprint!("{}", label);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read from stdin")?;
    Ok(line.trim().to_string())
}

fn read_password() -> Result<String> {
    match std::env::var(PASSWORD_ENV) {
        Ok(password) if !password.is_empty() => Ok(password),
        _ => rpassword::prompt_password("Password: ").context("Failed to read password"),
    }
}

impl App {
    pub async fn login(&mut self, username: Option<String>) -> Result<()> {
        let username = match username.or_else(|| self.config.last_username.clone()) {
            Some(name) => name,
            None => prompt_line("Username: ")?,
        };
        if username.is_empty() {
            bail!("Username is required");
        }
        let password = read_password()?;

        let response = self
            .session
            .login(&username, &password)
            .await
            .map_err(anyhow::Error::new)?;

        self.config.last_username = Some(username);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }

        println!("Logged in as {}", response.user.display_name());
        Ok(())
    }

    pub fn logout(&mut self) -> Result<()> {
        self.session
            .logout()
            .context("Session cleared, but the stored tokens could not be removed")?;
        println!("Logged out");
        Ok(())
    }

    pub fn status(&self) -> Result<()> {
        let session = self.session.snapshot();
        println!(
            "{}",
            render::session_status(&session, self.config.last_username.as_deref())
        );
        println!("API: {}", self.api.base_url());
        Ok(())
    }

    pub async fn dashboard(&self) -> Result<()> {
        self.require_session()?;
        let dashboard = load_dashboard(&self.api).await;
        print!("{}", render::dashboard(&dashboard, Utc::now()));
        Ok(())
    }

    pub async fn alerts(&self, filter: SeverityFilter) -> Result<()> {
        self.require_session()?;
        let alerts = load_alerts(&self.api, filter).await;
        print!("{}", render::alerts(&alerts, Utc::now()));
        Ok(())
    }

    pub async fn plots(&self) -> Result<()> {
        self.require_session()?;
        let plots = self.api.fetch_plots().await?;
        print!("{}", render::plots(&plots));
        Ok(())
    }

    pub async fn plot(&self, id: i64) -> Result<()> {
        self.require_session()?;
        let plot = self.api.fetch_plot(id).await?;

        let (summary, active) = futures::join!(
            self.api.fetch_sensor_summary(id),
            self.api.fetch_plot_active_alerts(id)
        );
        let summary = summary
            .map_err(|e| warn!(plot = id, error = %e, "Sensor summary unavailable"))
            .ok();
        let active = active.unwrap_or_else(|e| {
            warn!(plot = id, error = %e, "Active alerts unavailable");
            Vec::new()
        });

        print!(
            "{}",
            render::plot_detail(&plot, summary.as_ref(), &active, Utc::now())
        );
        Ok(())
    }

    pub async fn readings(
        &self,
        plot_id: i64,
        sensor_type: Option<&str>,
        limit: Option<u32>,
    ) -> Result<()> {
        self.require_session()?;
        let readings = self.api.fetch_readings(plot_id, sensor_type, limit).await?;
        print!("{}", render::readings(&readings, Utc::now()));
        Ok(())
    }

    pub async fn analyze(&self, plot: Option<i64>) -> Result<()> {
        self.require_session()?;
        let output = match plot {
            Some(id) => {
                let report = self.api.analyze_plot(id).await?;
                render::analysis(id, &report, Utc::now())
            }
            None => {
                let report = self.api.batch_analyze().await?;
                render::batch_analysis(&report)
            }
        };
        print!("{}", output);
        Ok(())
    }
}

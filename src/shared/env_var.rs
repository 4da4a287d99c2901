//! Centralized reader for the environment variables mention-audit uses.
//!
//! Names are private constants here; the rest of the crate reads values
//! through `EnvVars`. Values may come from a `.env` file loaded at startup.

use super::config::ConfigError;
use crate::infra::bitbucket::Credentials;

const BITBUCKET_USERNAME: &str = "BITBUCKET_USERNAME";
const BITBUCKET_APP_PASSWORD: &str = "BITBUCKET_APP_PASSWORD";
const BITBUCKET_WORKSPACES: &str = "BITBUCKET_WORKSPACES";
const SLACK_TOKEN: &str = "SLACK_TOKEN";
const SLACK_CHANNEL: &str = "SLACK_CHANNEL";
const WHEN_TO_RUN: &str = "WHEN_TO_RUN";

/// Snapshot of the relevant environment variables at load time.
#[derive(Default)]
pub struct EnvVars {
    pub bitbucket_username: Option<String>,
    pub bitbucket_app_password: Option<String>,

    /// Comma-separated workspace ids; overrides `bitbucket.workspaces`.
    pub bitbucket_workspaces: Option<Vec<String>>,

    pub slack_token: Option<String>,

    /// Overrides `slack.channel`.
    pub slack_channel: Option<String>,

    /// "HH:MM"; overrides `schedule.at`.
    pub when_to_run: Option<String>,
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

impl EnvVars {
    /// Read all variables from the current process.
    pub fn load() -> Self {
        Self {
            bitbucket_username: non_empty_var(BITBUCKET_USERNAME),
            bitbucket_app_password: non_empty_var(BITBUCKET_APP_PASSWORD),
            bitbucket_workspaces: non_empty_var(BITBUCKET_WORKSPACES).map(|v| split_list(&v)),
            slack_token: non_empty_var(SLACK_TOKEN),
            slack_channel: non_empty_var(SLACK_CHANNEL),
            when_to_run: non_empty_var(WHEN_TO_RUN),
        }
    }

    pub fn bitbucket_credentials(&self) -> Result<Credentials, ConfigError> {
        let username = self
            .bitbucket_username
            .as_deref()
            .ok_or(ConfigError::MissingEnv(BITBUCKET_USERNAME))?;
        let app_password = self
            .bitbucket_app_password
            .as_deref()
            .ok_or(ConfigError::MissingEnv(BITBUCKET_APP_PASSWORD))?;
        Ok(Credentials::new(username, app_password))
    }

    pub fn require_slack_token(&self) -> Result<&str, ConfigError> {
        self.slack_token
            .as_deref()
            .ok_or(ConfigError::MissingEnv(SLACK_TOKEN))
    }

    /// Name of the variable that supplies the Slack channel.
    pub fn slack_channel_name() -> &'static str {
        SLACK_CHANNEL
    }
}

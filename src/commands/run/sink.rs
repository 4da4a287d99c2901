//! Where a finished report goes.

use anyhow::Context;
use async_trait::async_trait;

use crate::infra::slack::SlackClient;
use crate::shared::config::Config;
use crate::shared::env_var::EnvVars;

#[async_trait]
pub trait ReportSink: Send + Sync {
    fn name(&self) -> &'static str;

    async fn deliver(&self, report: &str) -> anyhow::Result<()>;
}

/// Prints the report to stdout (`run --dry-run`).
pub struct StdoutSink;

#[async_trait]
impl ReportSink for StdoutSink {
    fn name(&self) -> &'static str {
        "stdout"
    }

    async fn deliver(&self, report: &str) -> anyhow::Result<()> {
        print!("{report}");
        Ok(())
    }
}

/// Posts the report to a Slack channel.
pub struct SlackSink {
    client: SlackClient,
    channel: String,
}

impl SlackSink {
    pub fn new(client: SlackClient, channel: impl Into<String>) -> Self {
        Self {
            client,
            channel: channel.into(),
        }
    }

    pub fn from_config(config: &Config, env: &EnvVars) -> anyhow::Result<Self> {
        let token = env.require_slack_token()?;
        let channel = config.slack.channel.clone().with_context(|| {
            format!(
                "No Slack channel configured: set slack.channel or {}",
                EnvVars::slack_channel_name()
            )
        })?;
        let client = SlackClient::new(&config.slack.base_url, token)?;
        Ok(Self::new(client, channel))
    }

    pub async fn auth_test(&self) -> anyhow::Result<()> {
        self.client
            .auth_test()
            .await
            .context("Could not authenticate with Slack")
    }
}

#[async_trait]
impl ReportSink for SlackSink {
    fn name(&self) -> &'static str {
        "slack"
    }

    async fn deliver(&self, report: &str) -> anyhow::Result<()> {
        self.client
            .post_message(&self.channel, report)
            .await
            .with_context(|| format!("Failed to post report to {}", self.channel))
    }
}

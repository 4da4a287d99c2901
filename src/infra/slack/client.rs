use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use super::error::{Result, SlackError};

pub const DEFAULT_BASE_URL: &str = "https://slack.com/api";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Common envelope of every Slack Web API response.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Minimal Slack Web API client authenticated with a bot token.
pub struct SlackClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl SlackClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Checks that the token is valid.
    pub async fn auth_test(&self) -> Result<()> {
        match self.call("auth.test", json!({})).await {
            Err(SlackError::Api { error, .. }) => Err(SlackError::AuthFailed(error)),
            other => other,
        }
    }

    pub async fn post_message(&self, channel: &str, text: &str) -> Result<()> {
        self.call(
            "chat.postMessage",
            json!({
                "channel": channel,
                "text": text,
            }),
        )
        .await
    }

    async fn call(&self, method: &str, body: serde_json::Value) -> Result<()> {
        let response = self
            .client
            .post(format!("{}/{method}", self.base_url))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SlackError::Status {
                method: method.to_string(),
                status: status.as_u16(),
            });
        }

        let api: ApiResponse = response.json().await?;
        if api.ok {
            tracing::debug!(method, "slack call succeeded");
            Ok(())
        } else {
            Err(SlackError::Api {
                method: method.to_string(),
                error: api.error.unwrap_or_else(|| "unknown_error".to_string()),
            })
        }
    }
}

//! Slack Web API error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlackError {
    #[error("Slack authentication failed: {0}")]
    AuthFailed(String),

    #[error("Slack API {method} failed: {error}")]
    Api { method: String, error: String },

    #[error("Slack API {method} returned HTTP {status}")]
    Status { method: String, status: u16 },

    #[error("Slack request failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, SlackError>;

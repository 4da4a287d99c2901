//! Bitbucket API error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BitbucketError {
    #[error("Bitbucket user not authorized to access resource: {path}")]
    Unauthorized { path: String },

    #[error("Bitbucket API error on {path} (HTTP {status}){}", format_body(.body))]
    Api {
        status: u16,
        path: String,
        body: String,
    },

    #[error("Bitbucket request failed: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, BitbucketError>;

/// Bitbucket error bodies look like `{"type": "error", "error": {"message": "..."}}`.
/// Falls back to the raw body when it is not JSON.
fn format_body(body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string());

    if message.is_empty() {
        String::new()
    } else {
        format!(": {message}")
    }
}

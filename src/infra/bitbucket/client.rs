//! Bitbucket Cloud REST client using reqwest.

use std::fmt;
use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::error::{BitbucketError, Result};
use super::models::Page;

pub const DEFAULT_BASE_URL: &str = "https://api.bitbucket.org";
pub const DEFAULT_PAGE_LENGTH: u32 = 50;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Username and app password for HTTP basic auth.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub app_password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, app_password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            app_password: app_password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("app_password", &"<redacted>")
            .finish()
    }
}

pub struct BitbucketClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    page_length: u32,
}

impl BitbucketClient {
    pub fn new(
        base_url: impl Into<String>,
        credentials: Credentials,
        page_length: u32,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            page_length: page_length.max(1),
        })
    }

    /// Collects every item of a paginated collection.
    ///
    /// Follows each page's `next` link until it is absent, or until
    /// `max_pages` pages have been read.
    pub(super) async fn get_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        max_pages: Option<usize>,
    ) -> Result<Vec<T>> {
        let mut params: Vec<(&str, String)> = query.to_vec();
        params.push(("pagelen", self.page_length.to_string()));

        let first_url = format!("{}{path}", self.base_url);
        let mut page: Page<T> = self.get_json(&first_url, path, &params).await?;
        let mut items = Vec::new();
        let mut pages_read = 1;

        loop {
            items.extend(page.values);

            let Some(next) = page.next else {
                break;
            };
            if max_pages.is_some_and(|max| pages_read >= max) {
                tracing::debug!(path, pages_read, "page limit reached");
                break;
            }

            // `next` already carries every query parameter.
            page = self.get_json(&next, path, &[]).await?;
            pages_read += 1;
        }

        tracing::debug!(path, pages_read, items = items.len(), "fetched collection");
        Ok(items)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .client
            .get(url)
            .query(query)
            .basic_auth(
                &self.credentials.username,
                Some(&self.credentials.app_password),
            )
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(BitbucketError::Unauthorized {
                path: path.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BitbucketError::Api {
                status: status.as_u16(),
                path: path.to_string(),
                body,
            });
        }

        Ok(response.json().await?)
    }
}

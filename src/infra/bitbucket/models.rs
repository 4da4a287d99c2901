//! Serde models for the subset of the Bitbucket Cloud 2.0 API we read.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One page of a paginated Bitbucket collection.
#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub values: Vec<T>,
    /// Absolute URL of the next page; absent on the last page.
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct User {
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WorkspaceMembership {
    pub workspace: Workspace,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Workspace {
    pub uuid: String,
    #[serde(default)]
    pub slug: String,
}

impl Workspace {
    /// Path segment used to address this workspace (slug, falling back to uuid).
    pub fn identifier(&self) -> &str {
        if self.slug.is_empty() {
            &self.uuid
        } else {
            &self.slug
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub uuid: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub full_name: String,
}

impl Repository {
    pub fn identifier(&self) -> &str {
        if self.slug.is_empty() {
            &self.uuid
        } else {
            &self.slug
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    pub author: Option<User>,
    pub links: PullRequestLinks,
    #[serde(default)]
    pub updated_on: Option<DateTime<Utc>>,
}

impl PullRequest {
    /// Web URL of the pull request, used as the location of its comments.
    pub fn web_url(&self) -> &str {
        &self.links.html.href
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestLinks {
    pub html: Link,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Link {
    pub href: String,
}

/// A pull request comment as returned by `/pullrequests/{id}/comments`.
#[derive(Debug, Clone, Deserialize)]
pub struct CommentRecord {
    pub id: i64,
    #[serde(default)]
    pub parent: Option<ParentRef>,
    /// Absent for comments whose author account was removed.
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub content: Option<CommentContent>,
    #[serde(default)]
    pub deleted: bool,
}

impl CommentRecord {
    pub fn parent_id(&self) -> Option<i64> {
        self.parent.as_ref().map(|p| p.id)
    }

    pub fn html(&self) -> &str {
        self.content
            .as_ref()
            .and_then(|c| c.html.as_deref())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParentRef {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentContent {
    #[serde(default)]
    pub html: Option<String>,
}

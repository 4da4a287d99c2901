//! Read-only access to workspaces, repositories, pull requests and comments.

use chrono::{DateTime, SecondsFormat, Utc};

use super::client::BitbucketClient;
use super::error::Result;
use super::models::{CommentRecord, PullRequest, Repository, Workspace, WorkspaceMembership};

/// Filters applied when listing a repository's pull requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequestQuery {
    /// `OPEN`, `MERGED`, `DECLINED` or `SUPERSEDED`; Bitbucket defaults to `OPEN`.
    pub state: Option<String>,
    /// Only pull requests updated at or after this instant.
    pub updated_since: Option<DateTime<Utc>>,
    pub max_pages: Option<usize>,
}

impl PullRequestQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("sort", "-updated_on".to_string())];
        if let Some(state) = &self.state {
            params.push(("state", state.clone()));
        }
        if let Some(since) = self.updated_since {
            params.push((
                "q",
                format!(
                    "updated_on >= {}",
                    since.to_rfc3339_opts(SecondsFormat::Secs, false)
                ),
            ));
        }
        params
    }
}

/// Where pull requests and their comments come from.
#[async_trait::async_trait]
pub trait PullRequestSource: Send + Sync {
    /// Workspaces the authenticated user has access to.
    async fn workspaces(&self) -> Result<Vec<Workspace>>;

    async fn repositories(&self, workspace: &str) -> Result<Vec<Repository>>;

    async fn pull_requests(
        &self,
        workspace: &str,
        repository: &str,
        query: &PullRequestQuery,
    ) -> Result<Vec<PullRequest>>;

    async fn pull_request_comments(
        &self,
        workspace: &str,
        repository: &str,
        pull_request_id: i64,
    ) -> Result<Vec<CommentRecord>>;
}

impl BitbucketClient {
    /// Verifies the credentials by reading the first page of workspaces.
    pub async fn auth_test(&self) -> Result<()> {
        self.get_all::<WorkspaceMembership>("/2.0/user/permissions/workspaces", &[], Some(1))
            .await
            .map(|_| ())
    }
}

#[async_trait::async_trait]
impl PullRequestSource for BitbucketClient {
    async fn workspaces(&self) -> Result<Vec<Workspace>> {
        let memberships: Vec<WorkspaceMembership> = self
            .get_all("/2.0/user/permissions/workspaces", &[], None)
            .await?;
        Ok(memberships.into_iter().map(|m| m.workspace).collect())
    }

    async fn repositories(&self, workspace: &str) -> Result<Vec<Repository>> {
        self.get_all(&format!("/2.0/repositories/{workspace}"), &[], None)
            .await
    }

    async fn pull_requests(
        &self,
        workspace: &str,
        repository: &str,
        query: &PullRequestQuery,
    ) -> Result<Vec<PullRequest>> {
        self.get_all(
            &format!("/2.0/repositories/{workspace}/{repository}/pullrequests"),
            &query.params(),
            query.max_pages,
        )
        .await
    }

    async fn pull_request_comments(
        &self,
        workspace: &str,
        repository: &str,
        pull_request_id: i64,
    ) -> Result<Vec<CommentRecord>> {
        self.get_all(
            &format!(
                "/2.0/repositories/{workspace}/{repository}/pullrequests/{pull_request_id}/comments"
            ),
            &[],
            None,
        )
        .await
    }
}

//! wiremock-based Bitbucket mock server for testing.
//!
//! ```ignore
//! let mock = BitbucketMockServer::start().await;
//! mock.workspaces(&["acme"], 50).await;
//! mock.repositories("acme", &["api"]).await;
//!
//! let ctx = mock.repo("acme", "api");
//! ctx.pull_requests(&[(1, "u-1", "Ada")], 50).await;
//! ctx.comments(1, vec![json!({"id": 1})]).await;
//!
//! mock.status("/2.0/repositories/acme", 500).await;
//! let client = mock.client();
//! ```

use serde_json::{Value, json};
use wiremock::matchers::{basic_auth, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::client::{BitbucketClient, Credentials, DEFAULT_PAGE_LENGTH};

pub const MOCK_USERNAME: &str = "tester";
pub const MOCK_APP_PASSWORD: &str = "app-password";

pub struct BitbucketMockServer {
    server: MockServer,
}

impl BitbucketMockServer {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn client(&self) -> BitbucketClient {
        BitbucketClient::new(
            self.uri(),
            Credentials::new(MOCK_USERNAME, MOCK_APP_PASSWORD),
            DEFAULT_PAGE_LENGTH,
        )
        .unwrap()
    }

    pub fn repo<'a>(&'a self, workspace: &'a str, repository: &'a str) -> RepoContext<'a> {
        RepoContext {
            mock: self,
            workspace,
            repository,
        }
    }

    /// Serves `/2.0/user/permissions/workspaces`, `per_page` workspaces per page.
    pub async fn workspaces(&self, slugs: &[&str], per_page: usize) {
        let values = slugs
            .iter()
            .map(|slug| {
                json!({
                    "permission": "member",
                    "workspace": {"uuid": format!("{{{slug}-uuid}}"), "slug": slug}
                })
            })
            .collect();
        self.paginated("/2.0/user/permissions/workspaces", values, per_page)
            .await;
    }

    pub async fn repositories(&self, workspace: &str, slugs: &[&str]) {
        let values = slugs
            .iter()
            .map(|slug| {
                json!({
                    "uuid": format!("{{{slug}-uuid}}"),
                    "slug": slug,
                    "full_name": format!("{workspace}/{slug}")
                })
            })
            .collect();
        self.paginated(
            &format!("/2.0/repositories/{workspace}"),
            values,
            DEFAULT_PAGE_LENGTH as usize,
        )
        .await;
    }

    /// Responds to any GET on `api_path` with `status`.
    pub async fn status(&self, api_path: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(api_path))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "type": "error",
                "error": {"message": format!("status {status}")}
            })))
            .mount(&self.server)
            .await;
    }

    /// Mounts one mock per page; later pages are reached through `next`.
    async fn paginated(&self, api_path: &str, values: Vec<Value>, per_page: usize) {
        let per_page = per_page.max(1);
        let size = values.len();
        let pages: Vec<Vec<Value>> = values.chunks(per_page).map(<[Value]>::to_vec).collect();
        let total = pages.len().max(1);

        for page in 1..=total {
            let next = (page < total)
                .then(|| format!("{}{api_path}?page={}&pagelen={per_page}", self.uri(), page + 1));
            let body = json!({
                "values": pages.get(page - 1).cloned().unwrap_or_default(),
                "size": size,
                "page": page,
                "pagelen": per_page,
                "next": next,
            });

            let mock = Mock::given(method("GET"))
                .and(path(api_path))
                .and(basic_auth(MOCK_USERNAME, MOCK_APP_PASSWORD));
            let mock = if page == 1 {
                mock.and(query_param_is_missing("page"))
            } else {
                mock.and(query_param("page", page.to_string()))
            };
            mock.respond_with(ResponseTemplate::new(200).set_body_json(body))
                .mount(&self.server)
                .await;
        }
    }
}

/// Repository-scoped mock context.
pub struct RepoContext<'a> {
    mock: &'a BitbucketMockServer,
    workspace: &'a str,
    repository: &'a str,
}

impl RepoContext<'_> {
    fn base_path(&self) -> String {
        format!("/2.0/repositories/{}/{}", self.workspace, self.repository)
    }

    /// Serves the pull request list; each entry is `(id, author_id, author_name)`.
    pub async fn pull_requests(&self, pull_requests: &[(i64, &str, &str)], per_page: usize) {
        let values = pull_requests
            .iter()
            .map(|(id, author_id, author_name)| {
                json!({
                    "id": id,
                    "title": format!("PR #{id}"),
                    "state": "OPEN",
                    "author": {"account_id": author_id, "display_name": author_name},
                    "links": {"html": {"href": format!(
                        "https://bitbucket.org/{}/{}/pull-requests/{id}",
                        self.workspace, self.repository
                    )}},
                    "updated_on": "2024-03-01T10:00:00.000000+00:00"
                })
            })
            .collect();
        self.mock
            .paginated(&format!("{}/pullrequests", self.base_path()), values, per_page)
            .await;
    }

    pub async fn comments(&self, pull_request_id: i64, comments: Vec<Value>) {
        self.mock
            .paginated(
                &format!("{}/pullrequests/{pull_request_id}/comments", self.base_path()),
                comments,
                DEFAULT_PAGE_LENGTH as usize,
            )
            .await;
    }
}

//! Test factories for Bitbucket records with sensible defaults.
//!
//! ```ignore
//! use crate::testing::factories::{comment, reply, mention, pull_request};
//!
//! let records = vec![
//!     comment(1, "u-1", "Ada", &mention("u-2", "Grace")),
//!     reply(2, 1, "u-2", "Grace", "on it"),
//! ];
//! let pr = pull_request(7, "u-1", "Ada");
//! ```

use crate::infra::bitbucket::models::{
    CommentContent, CommentRecord, Link, ParentRef, PullRequest, PullRequestLinks, User,
};

pub const PR_URL_PREFIX: &str = "https://bitbucket.org/acme/api/pull-requests";

/// Rendered HTML for a single mention of `user_id`.
pub fn mention(user_id: &str, display_name: &str) -> String {
    format!(r#"<span class="ap-mention" data-atlassian-id="{user_id}">@{display_name}</span>"#)
}

pub fn user(account_id: &str, display_name: &str) -> User {
    User {
        account_id: account_id.to_string(),
        display_name: display_name.to_string(),
    }
}

/// Top-level comment.
pub fn comment(id: i64, account_id: &str, display_name: &str, html: &str) -> CommentRecord {
    CommentRecord {
        id,
        parent: None,
        user: Some(user(account_id, display_name)),
        content: Some(CommentContent {
            html: Some(html.to_string()),
        }),
        deleted: false,
    }
}

/// Reply to `parent_id`.
pub fn reply(
    id: i64,
    parent_id: i64,
    account_id: &str,
    display_name: &str,
    html: &str,
) -> CommentRecord {
    CommentRecord {
        parent: Some(ParentRef { id: parent_id }),
        ..comment(id, account_id, display_name, html)
    }
}

pub fn pull_request_url(id: i64) -> String {
    format!("{PR_URL_PREFIX}/{id}")
}

pub fn pull_request(id: i64, author_id: &str, author_name: &str) -> PullRequest {
    PullRequest {
        id,
        title: format!("PR #{id}"),
        author: Some(user(author_id, author_name)),
        links: PullRequestLinks {
            html: Link {
                href: pull_request_url(id),
            },
        },
        updated_on: None,
    }
}

//! Bitbucket Cloud API client.
//!
//! Authenticates with a username and app password over HTTP basic auth.

mod client;
pub mod error;
#[cfg(test)]
pub mod mock;
pub mod models;
mod source;

pub use client::{BitbucketClient, Credentials, DEFAULT_BASE_URL, DEFAULT_PAGE_LENGTH};
pub use models::{CommentRecord, PullRequest};
pub use source::{PullRequestQuery, PullRequestSource};

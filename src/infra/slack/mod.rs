//! Slack Web API client for posting reports.

mod client;
mod error;

pub use client::{DEFAULT_BASE_URL, SlackClient};

use std::collections::{BTreeMap, BTreeSet};

use super::metrics::PrMetrics;

/// Totals gathered across every pull request visited in one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunAccumulator {
    user_display_names: BTreeMap<String, String>,
    unanswered_by_user: BTreeMap<String, Vec<String>>,
    participation_count: BTreeMap<String, usize>,
    pr_authors: BTreeSet<String>,
    all_commenters: BTreeSet<String>,
}

impl RunAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_pull_request_author(&mut self, user_id: &str, display_name: &str) {
        if user_id.is_empty() {
            return;
        }
        self.pr_authors.insert(user_id.to_string());
        self.set_display_name(user_id, display_name);
    }

    /// Folds one pull request's metrics into the run totals.
    ///
    /// Display names: last write wins. Unanswered locations: appended, never
    /// deduplicated. Participation: +1 per pull request.
    pub fn merge(&mut self, metrics: PrMetrics) {
        for (user_id, display_name) in metrics.user_display_names {
            self.set_display_name(&user_id, &display_name);
        }
        for (user_id, locations) in metrics.unanswered_by_user {
            self.unanswered_by_user
                .entry(user_id)
                .or_default()
                .extend(locations);
        }
        for user_id in metrics.participators {
            *self.participation_count.entry(user_id).or_insert(0) += 1;
        }
        self.all_commenters.extend(metrics.comment_makers);
    }

    /// Pull request authors who never commented on any visited pull request.
    pub fn non_commenting_authors(&self) -> impl Iterator<Item = &str> {
        self.pr_authors
            .difference(&self.all_commenters)
            .map(String::as_str)
    }

    /// Display name for `user_id`, falling back to the id itself.
    pub fn display_name<'a>(&'a self, user_id: &'a str) -> &'a str {
        self.user_display_names
            .get(user_id)
            .map(String::as_str)
            .filter(|name| !name.is_empty())
            .unwrap_or(user_id)
    }

    pub fn unanswered_by_user(&self) -> &BTreeMap<String, Vec<String>> {
        &self.unanswered_by_user
    }

    pub fn participation_count(&self) -> &BTreeMap<String, usize> {
        &self.participation_count
    }

    pub fn total_unanswered(&self) -> usize {
        self.unanswered_by_user.values().map(Vec::len).sum()
    }

    fn set_display_name(&mut self, user_id: &str, display_name: &str) {
        if display_name.is_empty() {
            return;
        }
        self.user_display_names
            .insert(user_id.to_string(), display_name.to_string());
    }
}

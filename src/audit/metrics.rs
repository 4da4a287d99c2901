use std::collections::{BTreeMap, BTreeSet, VecDeque};

use super::comment::CommentNode;
use super::thread::Thread;

/// Metrics gathered from one pull request's thread.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrMetrics {
    /// Mentioned user id -> locations of comments where the mention went unanswered.
    pub unanswered_by_user: BTreeMap<String, Vec<String>>,
    pub user_display_names: BTreeMap<String, String>,
    /// Authors whose comments drew replies from someone else.
    pub participators: BTreeSet<String>,
    pub comment_makers: BTreeSet<String>,
}

/// Walks `thread` breadth-first and classifies every mention and reply.
///
/// `location` identifies the pull request (its web URL); unanswered mentions
/// are reported as `{location}#comment-{id}`.
pub fn collect_metrics(thread: &Thread, location: &str) -> PrMetrics {
    let mut metrics = PrMetrics::default();
    if thread.is_empty() {
        return metrics;
    }

    let mut queue = VecDeque::from([thread.root()]);

    while let Some(node) = queue.pop_front() {
        let replies: Vec<&CommentNode> = thread.replies(node).collect();
        let repliers: BTreeSet<&str> = replies
            .iter()
            .filter(|reply| !reply.is_anonymous())
            .map(|reply| reply.creator_id())
            .collect();

        if !node.is_anonymous() {
            let creator_id = node.creator_id().to_string();
            metrics
                .user_display_names
                .insert(creator_id.clone(), node.creator_display_name().to_string());
            if drew_replies(node.creator_id(), &repliers) {
                metrics.participators.insert(creator_id.clone());
            }
            metrics.comment_makers.insert(creator_id);
        }

        for (user_id, display_name) in node.mentions() {
            if repliers.contains(user_id.as_str()) {
                continue;
            }
            metrics
                .unanswered_by_user
                .entry(user_id.clone())
                .or_default()
                .push(format!("{location}#comment-{}", node.id()));
            metrics
                .user_display_names
                .insert(user_id.clone(), display_name.clone());
        }

        queue.extend(replies);
    }

    metrics
}

/// Two or more distinct repliers always count; a single replier counts only
/// when it is not the author replying to themselves.
fn drew_replies(creator_id: &str, repliers: &BTreeSet<&str>) -> bool {
    match repliers.len() {
        0 => false,
        1 => !repliers.contains(creator_id),
        _ => true,
    }
}

//! Unanswered-mention and participation analysis over pull request threads.

mod accumulator;
mod comment;
mod mention;
mod metrics;
mod report;
mod thread;

pub use accumulator::RunAccumulator;
pub use comment::CommentId;
pub use metrics::{PrMetrics, collect_metrics};
pub use report::render_report;
pub use thread::Thread;

use thiserror::Error;

use crate::infra::bitbucket::{CommentRecord, PullRequest};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuditError {
    #[error("Broken thread reference: comment {comment_id} replies to unknown comment {parent_id}")]
    BrokenThreadReference {
        comment_id: CommentId,
        parent_id: CommentId,
    },

    #[error("Reply cycle: comment {comment_id} replies to {parent_id} but never reaches a top-level comment")]
    ReplyCycle {
        comment_id: CommentId,
        parent_id: CommentId,
    },
}

pub type Result<T> = std::result::Result<T, AuditError>;

/// Accumulates metrics over already-fetched pull requests and renders the
/// final report.
#[derive(Debug, Default)]
pub struct Audit {
    totals: RunAccumulator,
    pull_requests: usize,
}

impl Audit {
    pub fn new() -> Self {
        Self {
            totals: RunAccumulator::new(),
            pull_requests: 0,
        }
    }

    /// Analyzes one pull request and folds its metrics into the run totals.
    ///
    /// On error nothing from this pull request is recorded, so the caller can
    /// skip it and carry on with the rest.
    pub fn audit_pull_request(
        &mut self,
        pull_request: &PullRequest,
        comments: &[CommentRecord],
    ) -> Result<()> {
        let metrics = analyze(pull_request.web_url(), comments)?;
        tracing::debug!(
            pull_request = pull_request.id,
            comments = comments.len(),
            unanswered = metrics.unanswered_by_user.values().map(Vec::len).sum::<usize>(),
            participators = metrics.participators.len(),
            "audited pull request"
        );

        if let Some(author) = &pull_request.author {
            self.totals
                .record_pull_request_author(&author.account_id, &author.display_name);
        }
        self.totals.merge(metrics);
        self.pull_requests += 1;
        Ok(())
    }

    pub fn totals(&self) -> &RunAccumulator {
        &self.totals
    }

    /// Number of pull requests successfully audited.
    pub fn pull_requests(&self) -> usize {
        self.pull_requests
    }

    pub fn report(&self) -> String {
        render_report(&self.totals)
    }
}

/// Builds the thread for one pull request and collects its metrics.
pub fn analyze(location: &str, comments: &[CommentRecord]) -> Result<PrMetrics> {
    let thread = Thread::build(comments)?;
    tracing::trace!(location, comments = thread.len(), "built thread");
    Ok(collect_metrics(&thread, location))
}

/// True when a rendered report carries nothing worth sending.
pub fn is_blank_report(report: &str) -> bool {
    report.trim().is_empty()
}

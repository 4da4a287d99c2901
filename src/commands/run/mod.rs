//! One full audit pass: fetch, analyze, render, deliver.

mod sink;

pub use sink::{ReportSink, SlackSink, StdoutSink};

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use clap::Args;
use tracing::{debug, info, warn};

use crate::audit::{Audit, is_blank_report};
use crate::infra::bitbucket::{BitbucketClient, PullRequestQuery, PullRequestSource};
use crate::shared::config::{Config, load_config};
use crate::shared::env_var::EnvVars;

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    /// Print the report instead of posting it to Slack
    #[arg(long)]
    pub dry_run: bool,

    /// Workspace to audit (repeatable). Overrides config and BITBUCKET_WORKSPACES
    #[arg(short = 'w', long = "workspace")]
    pub workspaces: Vec<String>,

    /// Only audit pull requests updated in the last N days (0 disables the window)
    #[arg(long)]
    pub lookback_days: Option<u32>,
}

impl RunArgs {
    /// Applies command-line overrides, which take precedence over env and file.
    pub fn apply(&self, config: &mut Config) {
        if !self.workspaces.is_empty() {
            config.bitbucket.workspaces = self.workspaces.clone();
        }
        if let Some(days) = self.lookback_days {
            config.audit.lookback_days = days;
        }
    }
}

/// What a single run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditPlan {
    /// Empty means every workspace the user can access.
    pub workspaces: Vec<String>,
    pub query: PullRequestQuery,
}

impl AuditPlan {
    pub fn from_config(config: &Config, now: DateTime<Utc>) -> Self {
        let lookback_days = config.audit.lookback_days;
        let updated_since =
            (lookback_days > 0).then(|| now - Duration::days(i64::from(lookback_days)));

        Self {
            workspaces: config.bitbucket.workspaces.clone(),
            query: PullRequestQuery {
                state: config.bitbucket.pull_request_state.clone(),
                updated_since,
                max_pages: config.bitbucket.max_pull_request_pages,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    pub workspaces: usize,
    pub repositories: usize,
    pub pull_requests: usize,
    pub skipped_pull_requests: usize,
    pub unanswered_mentions: usize,
    pub delivered: bool,
}

/// Loads config and environment, applying overrides in precedence order:
/// command line, environment, config file, defaults.
pub fn load_settings(
    config_path: Option<&Path>,
    args: &RunArgs,
) -> anyhow::Result<(Config, EnvVars)> {
    let env = EnvVars::load();
    let mut config = load_config(config_path)?;
    config.apply_env(&env);
    args.apply(&mut config);
    Ok((config, env))
}

pub fn bitbucket_client(config: &Config, env: &EnvVars) -> anyhow::Result<BitbucketClient> {
    let credentials = env.bitbucket_credentials()?;
    BitbucketClient::new(
        &config.bitbucket.base_url,
        credentials,
        config.bitbucket.page_length,
    )
    .context("Failed to build Bitbucket client")
}

pub async fn run(args: &RunArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let (config, env) = load_settings(config_path, args)?;
    let source = bitbucket_client(&config, &env)?;
    let sink: Box<dyn ReportSink> = if args.dry_run {
        Box::new(StdoutSink)
    } else {
        Box::new(SlackSink::from_config(&config, &env)?)
    };

    let plan = AuditPlan::from_config(&config, Utc::now());
    execute(&source, sink.as_ref(), &plan).await?;
    Ok(())
}

/// Audits everything in `plan` and hands a non-blank report to `sink`.
pub async fn execute(
    source: &dyn PullRequestSource,
    sink: &dyn ReportSink,
    plan: &AuditPlan,
) -> anyhow::Result<RunStats> {
    info!(since = ?plan.query.updated_since, "starting audit run");
    let (report, mut stats) = collect_report(source, plan).await?;

    if is_blank_report(&report) {
        info!(?stats, "nothing to report");
        return Ok(stats);
    }

    sink.deliver(&report).await?;
    stats.delivered = true;
    info!(?stats, sink = sink.name(), "audit run finished");
    Ok(stats)
}

/// Walks workspaces, repositories and pull requests in order and renders
/// the report.
///
/// A pull request whose comments do not form a valid thread is logged and
/// skipped. Source errors abort the run.
pub async fn collect_report(
    source: &dyn PullRequestSource,
    plan: &AuditPlan,
) -> anyhow::Result<(String, RunStats)> {
    let mut stats = RunStats::default();
    let mut audit = Audit::new();

    let workspaces: Vec<String> = if plan.workspaces.is_empty() {
        source
            .workspaces()
            .await
            .context("Failed to list workspaces")?
            .into_iter()
            .map(|w| w.identifier().to_string())
            .collect()
    } else {
        plan.workspaces.clone()
    };

    for workspace in &workspaces {
        stats.workspaces += 1;
        let repositories = source
            .repositories(workspace)
            .await
            .with_context(|| format!("Failed to list repositories in {workspace}"))?;

        for repository in &repositories {
            stats.repositories += 1;
            let repo = repository.identifier();
            let pull_requests = source
                .pull_requests(workspace, repo, &plan.query)
                .await
                .with_context(|| format!("Failed to list pull requests in {workspace}/{repo}"))?;
            debug!(
                repository = repository.full_name.as_str(),
                pull_requests = pull_requests.len(),
                "listed pull requests"
            );

            for pull_request in &pull_requests {
                let comments = source
                    .pull_request_comments(workspace, repo, pull_request.id)
                    .await
                    .with_context(|| {
                        format!(
                            "Failed to fetch comments for {workspace}/{repo}#{}",
                            pull_request.id
                        )
                    })?;

                if let Err(e) = audit.audit_pull_request(pull_request, &comments) {
                    warn!(
                        workspace = workspace.as_str(),
                        repository = repo,
                        pull_request = pull_request.id,
                        title = pull_request.title.as_str(),
                        updated_on = ?pull_request.updated_on,
                        error = %e,
                        "skipping pull request"
                    );
                    stats.skipped_pull_requests += 1;
                }
            }
        }
    }

    stats.pull_requests = audit.pull_requests();
    stats.unanswered_mentions = audit.totals().total_unanswered();
    Ok((audit.report(), stats))
}

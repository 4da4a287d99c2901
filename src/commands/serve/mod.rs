//! Long-running mode: audit once a day at a fixed local time.

mod schedule;

pub use schedule::DailySchedule;

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{Local, NaiveDateTime, Utc};
use clap::Args;
use tracing::{error, info};

use super::run::{
    AuditPlan, ReportSink, RunArgs, SlackSink, StdoutSink, bitbucket_client, execute,
    load_settings,
};

#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ServeArgs {
    /// Daily run time in local "HH:MM". Overrides schedule.at and WHEN_TO_RUN
    #[arg(long)]
    pub at: Option<String>,

    /// Also write JSON logs to a daily rolling file in this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    #[command(flatten)]
    pub run: RunArgs,
}

pub async fn run(args: &ServeArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let (mut config, env) = load_settings(config_path, &args.run)?;
    if let Some(at) = &args.at {
        config.schedule.at = at.clone();
    }
    let schedule = DailySchedule::from_config(&config.schedule)?;

    let source = bitbucket_client(&config, &env)?;
    source
        .auth_test()
        .await
        .context("Could not authenticate with Bitbucket")?;

    let sink: Box<dyn ReportSink> = if args.run.dry_run {
        Box::new(StdoutSink)
    } else {
        let slack = SlackSink::from_config(&config, &env)?;
        slack.auth_test().await?;
        Box::new(slack)
    };
    info!(at = %schedule.at(), sink = sink.name(), "authenticated, serving");

    let mut next = schedule.next_run_after(local_now());
    loop {
        info!(next_run = %next, "waiting for next run");
        let wait = (next - local_now()).to_std().unwrap_or_default();

        tokio::select! {
            () = tokio::time::sleep(wait) => {}
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for shutdown signal")?;
                info!("shutting down");
                return Ok(());
            }
        }

        let plan = AuditPlan::from_config(&config, Utc::now());
        next = match execute(&source, sink.as_ref(), &plan).await {
            Ok(_) => schedule.next_run_after(local_now()),
            Err(e) => {
                error!(error = format!("{e:#}"), "run failed, retrying after cooldown");
                schedule.retry_after(local_now())
            }
        };
    }
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

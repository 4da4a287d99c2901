use std::path::{Path, PathBuf};

use chrono::NaiveTime;
use schemars::JsonSchema;
use serde::Deserialize;

use super::env_var::EnvVars;
use crate::infra::{bitbucket, slack};

const APP_DIR: &str = env!("CARGO_PKG_NAME");
const CONFIG_FILENAMES: [&str; 2] = ["config.yaml", "config.yml"];
const RUN_TIME_FORMAT: &str = "%H:%M";

/// Top-level configuration for mention-audit.
#[derive(Debug, Default, Deserialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Bitbucket API settings.
    #[serde(default)]
    pub bitbucket: BitbucketConfig,

    /// Audit window settings.
    #[serde(default)]
    pub audit: AuditConfig,

    /// Slack delivery settings.
    #[serde(default)]
    pub slack: SlackConfig,

    /// Daily schedule used by `serve`.
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Deserialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct BitbucketConfig {
    /// API base URL (default: "https://api.bitbucket.org").
    #[serde(default = "default_bitbucket_base_url")]
    #[schemars(default = "default_bitbucket_base_url")]
    pub base_url: String,

    /// Workspaces to audit. Empty means every workspace the user can access.
    #[serde(default)]
    pub workspaces: Vec<String>,

    /// Items requested per page (default: 50).
    #[serde(default = "default_page_length")]
    #[schemars(default = "default_page_length")]
    pub page_length: u32,

    /// Maximum pages of pull requests read per repository. Unset reads all
    /// pull requests inside the look-back window.
    #[serde(default)]
    pub max_pull_request_pages: Option<usize>,

    /// Pull request state filter (OPEN, MERGED, DECLINED, SUPERSEDED).
    /// Unset uses Bitbucket's default (OPEN).
    #[serde(default)]
    pub pull_request_state: Option<String>,
}

impl Default for BitbucketConfig {
    fn default() -> Self {
        Self {
            base_url: default_bitbucket_base_url(),
            workspaces: Vec::new(),
            page_length: default_page_length(),
            max_pull_request_pages: None,
            pull_request_state: None,
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AuditConfig {
    /// Only audit pull requests updated in the last N days (default: 30).
    /// 0 disables the window.
    #[serde(default = "default_lookback_days")]
    #[schemars(default = "default_lookback_days")]
    pub lookback_days: u32,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            lookback_days: default_lookback_days(),
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SlackConfig {
    /// Web API base URL (default: "https://slack.com/api").
    #[serde(default = "default_slack_base_url")]
    #[schemars(default = "default_slack_base_url")]
    pub base_url: String,

    /// Channel the report is posted to.
    #[serde(default)]
    pub channel: Option<String>,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            base_url: default_slack_base_url(),
            channel: None,
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    /// Local time of the daily run, "HH:MM" (default: "09:00").
    #[serde(default = "default_run_at")]
    #[schemars(default = "default_run_at")]
    pub at: String,

    /// Minutes to wait before retrying a failed run (default: 5).
    #[serde(default = "default_cooldown_minutes")]
    #[schemars(default = "default_cooldown_minutes")]
    pub cooldown_minutes: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            at: default_run_at(),
            cooldown_minutes: default_cooldown_minutes(),
        }
    }
}

impl ScheduleConfig {
    pub fn run_time(&self) -> Result<NaiveTime, ConfigError> {
        parse_run_time(&self.at)
    }
}

impl Config {
    /// Applies environment overrides on top of file values.
    pub fn apply_env(&mut self, env: &EnvVars) {
        if let Some(workspaces) = &env.bitbucket_workspaces {
            self.bitbucket.workspaces = workspaces.clone();
        }
        if let Some(channel) = &env.slack_channel {
            self.slack.channel = Some(channel.clone());
        }
        if let Some(at) = &env.when_to_run {
            self.schedule.at = at.clone();
        }
    }
}

pub fn parse_run_time(value: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(value.trim(), RUN_TIME_FORMAT).map_err(|e| {
        ConfigError::InvalidValue {
            key: "schedule.at",
            message: format!("{value:?} is not a HH:MM time ({e})"),
        }
    })
}

fn default_bitbucket_base_url() -> String {
    bitbucket::DEFAULT_BASE_URL.to_string()
}

fn default_page_length() -> u32 {
    bitbucket::DEFAULT_PAGE_LENGTH
}

fn default_lookback_days() -> u32 {
    30
}

fn default_slack_base_url() -> String {
    slack::DEFAULT_BASE_URL.to_string()
}

fn default_run_at() -> String {
    "09:00".to_string()
}

fn default_cooldown_minutes() -> u64 {
    5
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read config file (permission error, etc.)
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// YAML parse error
    #[error("Invalid config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Missing required environment variable {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

/// Returns the XDG config directory (~/.config or $XDG_CONFIG_HOME).
/// Empty values are treated as unset.
fn config_dir() -> Option<PathBuf> {
    let non_empty = |key: &str| std::env::var(key).ok().filter(|v| !v.is_empty());
    non_empty("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| non_empty("HOME").map(|home| PathBuf::from(home).join(".config")))
}

/// Loads configuration from `path` if given, otherwise from
/// ~/.config/mention-audit/config.ya?ml. A missing default file yields
/// `Config::default()`; a missing explicit file is an error.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = path {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        return parse_config(&content, path);
    }

    let Some(dir) = config_dir() else {
        return Ok(Config::default());
    };
    load_config_from_dir(&dir.join(APP_DIR))
}

/// Config file `load_config(None)` reads, if one exists.
pub fn find_config_file() -> Option<PathBuf> {
    let dir = config_dir()?.join(APP_DIR);
    CONFIG_FILENAMES
        .iter()
        .map(|filename| dir.join(filename))
        .find(|path| path.is_file())
}

/// Searches for config.yaml, then config.yml in `dir`.
pub fn load_config_from_dir(dir: &Path) -> anyhow::Result<Config> {
    for filename in CONFIG_FILENAMES {
        let path = dir.join(filename);
        match std::fs::read_to_string(&path) {
            Ok(content) => return parse_config(&content, &path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(ConfigError::ReadError { path, source: e }.into()),
        }
    }

    Ok(Config::default())
}

fn parse_config(content: &str, path: &Path) -> anyhow::Result<Config> {
    let config: Config = serde_yaml::from_str(content).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(config)
}

/// Generate JSON Schema for the Config struct.
pub fn generate_schema() -> schemars::Schema {
    schemars::schema_for!(Config)
}

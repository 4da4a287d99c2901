use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::commands::config::ConfigCommands;
use crate::commands::run::RunArgs;
use crate::commands::serve::ServeArgs;
use crate::shared::logging::LogFormat;

#[derive(Parser)]
#[command(
    name = "mention-audit",
    version,
    about = "Report unanswered mentions and review participation on Bitbucket pull requests",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Config file to use instead of ~/.config/mention-audit/config.yaml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Audit once and post the report
    Run(RunArgs),

    /// Audit every day at a fixed time
    Serve(ServeArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

use std::path::{Path, PathBuf};

use clap::Subcommand;

/// Configuration management commands.
#[derive(Subcommand, Clone, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Print JSON Schema for the configuration file
    Schema,

    /// Print the effective configuration file path
    Path,
}

impl ConfigCommands {
    pub fn run(&self, config_path: Option<&Path>) -> anyhow::Result<()> {
        match self {
            Self::Schema => {
                let schema = crate::shared::config::generate_schema();
                let json = serde_json::to_string_pretty(&schema)?;
                println!("{json}");
                Ok(())
            }
            Self::Path => {
                match config_file_in_use(config_path) {
                    Some(path) => println!("{}", path.display()),
                    None => println!("(no config file found, using defaults)"),
                }
                Ok(())
            }
        }
    }
}

/// The file `load_config` reads: `--config` when given, otherwise the first
/// default location that exists.
fn config_file_in_use(config_path: Option<&Path>) -> Option<PathBuf> {
    match config_path {
        Some(path) => Some(path.to_path_buf()),
        None => crate::shared::config::find_config_file(),
    }
}

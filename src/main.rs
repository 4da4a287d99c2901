mod audit;
mod cli;
mod commands;
mod infra;
mod shared;
#[cfg(test)]
mod testing;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env is fine; real environment variables still apply.
    dotenvy::dotenv().ok();

    let Cli {
        log_format,
        config,
        command,
    } = Cli::parse();

    let log_dir = match &command {
        Commands::Serve(args) => args.log_dir.as_deref(),
        _ => None,
    };
    let _guard = shared::logging::init(log_format, log_dir);
    let config_path = config.as_deref();

    match &command {
        Commands::Run(args) => commands::run::run(args, config_path).await?,
        Commands::Serve(args) => commands::serve::run(args, config_path).await?,
        Commands::Config(config_cmd) => config_cmd.run(config_path)?,
        Commands::Completions { shell } => {
            clap_complete::generate(
                *shell,
                &mut Cli::command(),
                "mention-audit",
                &mut std::io::stdout(),
            );
        }
    }

    Ok(())
}

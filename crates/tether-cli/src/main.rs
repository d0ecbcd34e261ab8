//! Tether CLI entrypoint.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod handlers;

use commands::{CacheCommands, Commands, ConfigCommands};
use config::CliConfig;

#[derive(Parser)]
#[command(name = "tether")]
#[command(author, version, about = "Offline-first edge server and worker host", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = CliConfig::load().unwrap_or_default();

    match cli.command {
        Commands::Serve { addr } => handlers::serve(&config, addr).await?,
        Commands::Install { origin } => handlers::install(&config, origin).await?,
        Commands::Fetch {
            path,
            method,
            navigate,
            offline,
        } => handlers::fetch(&config, &path, &method, navigate, offline).await?,
        Commands::Cache { command } => match command {
            CacheCommands::List => handlers::list_cache(&config).await?,
            CacheCommands::Clear { generation } => handlers::clear_cache(&config, generation).await?,
        },
        Commands::Config { command } => match command {
            ConfigCommands::Show => handlers::show_config(&config)?,
            ConfigCommands::Set { key, value } => handlers::set_config(&key, &value)?,
        },
    }

    Ok(())
}

//! CLI command definitions.

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the edge server
    Serve {
        /// Address to listen on
        #[arg(short, long)]
        addr: Option<String>,
    },

    /// Install the worker: precache the shell and activate
    Install {
        /// Origin to install from
        #[arg(long)]
        origin: Option<String>,
    },

    /// Issue a request through the worker
    Fetch {
        /// Path or absolute URL
        path: String,

        /// Request method
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,

        /// Treat the request as a full-page load
        #[arg(long)]
        navigate: bool,

        /// Simulate a lost connection
        #[arg(long)]
        offline: bool,
    },

    /// Inspect or clear the cache store
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum CacheCommands {
    /// List generations and their entries
    List,

    /// Delete cache generations
    Clear {
        /// Only this generation
        #[arg(short, long)]
        generation: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set configuration value
    Set {
        /// Key
        key: String,

        /// Value
        value: String,
    },
}

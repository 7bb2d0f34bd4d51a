//! # Arbor CLI Module
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server (optionally seeded)
//! - `status` - Show store statistics for a seed document
//! - `tree` - Print reconstructed snapshots of every root in a seed

mod commands;

use crate::config::ServerConfig;
use arbor_core::{ArborError, VersionSelector};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Arbor - versioned topic tree server
///
/// Topics form a forest; every edit appends an immutable version and any
/// subtree can be viewed as it stood at a given version.
#[derive(Parser, Debug)]
#[command(name = "arbor")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to (overrides config and ARBOR_HOST)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides config and ARBOR_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Seed document (JSON) imported before serving
        #[arg(short, long)]
        seed: Option<PathBuf>,
    },

    /// Show store statistics
    Status {
        /// Seed document (JSON) to load
        #[arg(short, long)]
        seed: Option<PathBuf>,
    },

    /// Print every root's tree as JSON
    Tree {
        /// Seed document (JSON) to load
        #[arg(short, long)]
        seed: PathBuf,

        /// Version selector: "latest" or a positive number
        #[arg(long, default_value = "latest")]
        version: VersionSelector,

        /// Attach active resources to each node
        #[arg(long)]
        include_resources: bool,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), ArborError> {
    let mut config = ServerConfig::load(cli.config.as_deref())?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port, seed }) => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if seed.is_some() {
                config.seed = seed;
            }
            cmd_server(&config).await
        }
        Some(Commands::Status { seed }) => {
            cmd_status(seed.as_deref().or(config.seed.as_deref()), json_mode)
        }
        Some(Commands::Tree {
            seed,
            version,
            include_resources,
        }) => cmd_tree(&seed, version, include_resources),
        None => {
            // No subcommand - show status by default
            cmd_status(config.seed.as_deref(), json_mode)
        }
    }
}

//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Eureka Moment proc-rate tracker.
///
/// Listens to the IINACT OverlayPlugin WebSocket feed and tallies Solid
/// Reason and Ageless Words casts against Eureka Moment procs.
#[derive(Debug, Parser)]
#[command(name = "eureka", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Track casts and procs live until quit.
    Watch {
        /// Override the configured WebSocket endpoint.
        #[arg(long)]
        url: Option<String>,

        /// Colour the proc rate green at 50% or more, red below.
        #[arg(long)]
        color: bool,
    },

    /// Print the effective configuration as JSON.
    Config,
}

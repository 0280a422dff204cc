//! CLI argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// rowdock - schema-validating batch ingestion and table snapshots
#[derive(Parser, Debug)]
#[command(name = "rowdock")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP ingestion service
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./rowdock.json")]
        config: PathBuf,

        /// Override the configured listen port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Export a table to a snapshot in object storage
    Export {
        /// Path to configuration file
        #[arg(long, default_value = "./rowdock.json")]
        config: PathBuf,

        /// Table to export
        #[arg(long)]
        table: String,
    },

    /// Restore a table from a snapshot
    Restore {
        /// Path to configuration file
        #[arg(long, default_value = "./rowdock.json")]
        config: PathBuf,

        /// Table to restore
        #[arg(long)]
        table: String,

        /// Object-store path of the snapshot
        #[arg(long)]
        snapshot_path: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

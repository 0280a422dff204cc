//! Command-line interface
//!
//! Commands:
//! - `rowdock serve --config <path> [--port <port>]`
//! - `rowdock export --config <path> --table <table>`
//! - `rowdock restore --config <path> --table <table> --snapshot-path <path>`

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::Config;
pub use errors::{CliError, CliResult};

/// Parse arguments and dispatch to the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();

    match cli.command {
        Command::Serve { config, port } => commands::serve(&config, port),
        Command::Export { config, table } => commands::export(&config, &table),
        Command::Restore {
            config,
            table,
            snapshot_path,
        } => commands::restore(&config, &table, &snapshot_path),
    }
}

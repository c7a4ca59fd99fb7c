//! CLI module for HBnB
//!
//! Provides command-line interface for:
//! - init: write a default config and data directory
//! - start: boot storage and serve the REST API
//! - create-admin: add an administrator to the durable store

mod args;
mod commands;
mod config;
mod errors;

pub use args::{Cli, Command};
pub use commands::{create_admin, init, run_command, seed_admin, start};
pub use config::{BootstrapAdmin, Config, JWT_SECRET_ENV};
pub use errors::{CliError, CliErrorCode, CliResult};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    run_command(Cli::parse_args().command)
}

//! CLI argument definitions using clap
//!
//! Commands:
//! - hbnb init --config <path>
//! - hbnb start --config <path>
//! - hbnb create-admin --config <path> --email <email> --password <password> ...

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// HBnB - accommodation listings API server
#[derive(Parser, Debug)]
#[command(name = "hbnb")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a default configuration file and create the data directory
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./hbnb.json")]
        config: PathBuf,
    },

    /// Start the API server
    Start {
        /// Path to configuration file
        #[arg(long, default_value = "./hbnb.json")]
        config: PathBuf,
    },

    /// Create an administrator account in the durable store
    CreateAdmin {
        /// Path to configuration file
        #[arg(long, default_value = "./hbnb.json")]
        config: PathBuf,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        #[arg(long, default_value = "Admin")]
        first_name: String,

        #[arg(long, default_value = "HBnB")]
        last_name: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

//! Command-line surface.

use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand};

use crate::config::FlagProvider;

#[derive(Debug, Parser)]
#[command(name = "viewr", version, about = "Manage the Viewr application")]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the Viewr application on the console
    Run(RunArgs),

    /// Manage the Viewr configuration
    #[command(group(ArgGroup::new("action").required(true).args(["init", "validate"])))]
    Config {
        /// Initialize the configuration file
        #[arg(short, long)]
        init: bool,

        /// Validate the configuration file
        #[arg(short, long)]
        validate: bool,

        /// Overwrite the configuration file
        #[arg(short, long, requires = "init")]
        overwrite: bool,
    },

    /// Manage the Viewr service
    #[command(subcommand)]
    Service(ServiceCommand),

    /// Entry point used by the installed service
    #[command(hide = true)]
    Serve,
}

/// Overrides accepted by `run`.
#[derive(Debug, Default, clap::Args)]
pub struct RunArgs {
    /// Log level: debug, info, warn, error
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Server port
    #[arg(short, long, allow_negative_numbers = true)]
    pub port: Option<i64>,

    /// Server address
    #[arg(short, long)]
    pub address: Option<String>,
}

impl FlagProvider for RunArgs {
    fn log_level(&self) -> Option<&str> {
        self.log_level.as_deref()
    }

    fn port(&self) -> Option<i64> {
        self.port
    }

    fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }
}

#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ServiceCommand {
    /// Install Viewr as a system service
    Install,
    /// Uninstall the Viewr service
    Uninstall,
    /// Start the Viewr service
    Start,
    /// Stop the Viewr service
    Stop,
    /// Restart the Viewr service
    Restart,
    /// Check the current status of the Viewr service
    Status,
}

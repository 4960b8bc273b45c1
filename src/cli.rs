//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "adless")]
#[command(author, version, about = "Local ad and tracker blocker using the hosts file")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path (default: $ADLESS_CONFIG_PATH or ~/.config/adless/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose mode (debug output)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Enable domain blocking (fetch lists and write the managed block)
    Enable,

    /// Disable domain blocking (remove the managed block, keep config)
    Disable,

    /// Re-fetch all lists and replace the managed block
    Update,

    /// Show whether blocking is enabled
    Status,

    /// Restore the hosts file from the backup taken before the last change
    Restore,

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version
    Version,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    /// Write the default configuration file if none exists
    Init,
    /// Print the effective configuration
    Show,
    /// Open the configuration file in $VISUAL / $EDITOR
    Edit,
    /// Print the configuration file location
    Path,
}

/// Log verbosity selected on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

impl Verbosity {
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        if verbose {
            Verbosity::Verbose
        } else if quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Normal
        }
    }

    pub fn level(self) -> Level {
        match self {
            Verbosity::Quiet => Level::ERROR,
            Verbosity::Normal => Level::INFO,
            Verbosity::Verbose => Level::DEBUG,
        }
    }
}

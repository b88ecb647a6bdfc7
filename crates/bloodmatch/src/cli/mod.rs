//! Command-line interface for bloodmatch.
//!
//! This module provides the CLI structure for the `bloodmatch` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    AddRequestArgs, ConfigCommand, DonorCommand, MatchCommand, OutputFormat, RequestCommand,
    StatusArg, StatusCommand, UrgencyArg,
};

/// bloodmatch - Find and rank blood donors for a request
///
/// Keeps a local register of donors and blood requests and ranks compatible
/// donors for a request by urgency and distance.
#[derive(Debug, Parser)]
#[command(name = "bloodmatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rank compatible donors for a blood request
    Match(MatchCommand),

    /// Manage donors
    #[command(subcommand)]
    Donor(DonorCommand),

    /// Manage blood requests
    #[command(subcommand)]
    Request(RequestCommand),

    /// Show database status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.quiet, self.verbose)
    }
}

//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::records::{BloodGroup, RequestStatus, Urgency};

/// Match command arguments.
#[derive(Debug, Args)]
pub struct MatchCommand {
    /// Blood request id
    #[arg(value_parser = clap::value_parser!(i64).range(1..))]
    pub id: i64,

    /// Fail instead of ranking as low urgency when the request's urgency is unrecognized
    #[arg(long)]
    pub strict: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Donor management commands.
#[derive(Debug, Subcommand)]
pub enum DonorCommand {
    /// Register a donor
    Add {
        /// Full name
        #[arg(long)]
        name: String,

        /// Blood group (A+, A-, B+, B-, AB+, AB-, O+, O-)
        #[arg(short, long, value_parser = parse_blood_group)]
        blood_group: BloodGroup,

        /// City
        #[arg(short, long)]
        location: String,

        /// Contact phone
        #[arg(short, long)]
        phone: String,

        /// Email address
        #[arg(short, long)]
        email: Option<String>,

        /// Date of birth
        #[arg(long)]
        dob: Option<String>,

        /// Gender
        #[arg(long)]
        gender: Option<String>,
    },

    /// Show a donor
    Show {
        /// Donor id
        id: i64,
    },
}

/// Blood request commands.
#[derive(Debug, Subcommand)]
pub enum RequestCommand {
    /// File a blood request
    Add(AddRequestArgs),

    /// List blood requests, newest first
    List {
        /// Request state to list
        #[arg(short, long, value_enum, default_value = "pending")]
        status: StatusArg,

        /// Only requests for this blood group
        #[arg(short, long, value_parser = parse_blood_group)]
        blood_group: Option<BloodGroup>,

        /// Only requests in this city
        #[arg(short, long)]
        location: Option<String>,

        /// Maximum number of results (defaults to the configured list limit)
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Change a request's state
    Status {
        /// Blood request id
        id: i64,

        /// New state
        #[arg(value_enum)]
        status: StatusArg,
    },
}

/// Arguments for filing a blood request.
#[derive(Debug, Args)]
pub struct AddRequestArgs {
    /// Id of the user filing the request
    #[arg(short, long)]
    pub requester: i64,

    /// Patient or contact name
    #[arg(long)]
    pub name: String,

    /// Required blood group
    #[arg(short, long, value_parser = parse_blood_group)]
    pub blood_group: BloodGroup,

    /// City
    #[arg(short, long)]
    pub location: String,

    /// Hospital or pickup address
    #[arg(short, long)]
    pub address: String,

    /// Contact phone
    #[arg(short, long)]
    pub phone: String,

    /// How urgently donors are needed
    #[arg(short, long, value_enum)]
    pub urgency: UrgencyArg,

    /// Free-text note
    #[arg(long)]
    pub note: Option<String>,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

fn parse_blood_group(s: &str) -> Result<BloodGroup, String> {
    s.parse().map_err(|e: crate::Error| e.to_string())
}

/// Urgency argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UrgencyArg {
    /// Can wait
    Low,
    /// Needed soon
    Medium,
    /// Needed now
    High,
}

impl From<UrgencyArg> for Urgency {
    fn from(arg: UrgencyArg) -> Self {
        match arg {
            UrgencyArg::Low => Self::Low,
            UrgencyArg::Medium => Self::Medium,
            UrgencyArg::High => Self::High,
        }
    }
}

/// Request state argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    /// Still looking for donors
    Pending,
    /// Donors found
    Fulfilled,
    /// Withdrawn
    Cancelled,
}

impl From<StatusArg> for RequestStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => Self::Pending,
            StatusArg::Fulfilled => Self::Fulfilled,
            StatusArg::Cancelled => Self::Cancelled,
        }
    }
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}

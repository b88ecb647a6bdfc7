//! Error types for bloodmatch.
//!
//! This module defines all error types used throughout the bloodmatch crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for bloodmatch operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A user with this email address is already registered.
    #[error("email address already in use: {0}")]
    DuplicateEmail(String),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Matching Errors ===
    /// The blood request id does not resolve to a stored request.
    #[error("blood request {id} not found")]
    RequestNotFound {
        /// The requested id.
        id: i64,
    },

    /// An urgency label is not one of Low, Medium or High.
    #[error("invalid urgency level '{value}'")]
    InvalidUrgency {
        /// The rejected label.
        value: String,
    },

    /// A blood group label is not one of the eight ABO/Rh groups.
    #[error("invalid blood group '{0}'")]
    InvalidBloodGroup(String),

    /// A request status label is not Pending, Fulfilled or Cancelled.
    #[error("invalid request status '{0}'")]
    InvalidRequestStatus(String),

    // === I/O Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// A specialized Result type for bloodmatch operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

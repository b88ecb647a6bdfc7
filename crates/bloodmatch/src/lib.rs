//! `bloodmatch` - Blood donor matching and ranking
//!
//! This library finds donors whose blood group can safely supply a blood
//! request, ranks them by urgency and location, and trims the ranking to a size
//! chosen by the request's urgency. Users and requests live in a local
//! `SQLite` store.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod matching;
pub mod records;
pub mod storage;

pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use matching::{match_donors, DonorDirectory, MatchOptions, MatchOutcome};
pub use records::{BloodGroup, BloodRequest, Donor, ScoredDonor, Urgency};
pub use storage::{Storage, StorageStats};

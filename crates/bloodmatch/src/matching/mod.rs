//! Donor matching and ranking.
//!
//! Given a stored blood request, the matcher:
//!
//! - **Filters** candidates to blood groups that can safely supply the
//!   requested group, excluding the requester.
//!
//! - **Scores** each candidate by request urgency plus a penalty for living in
//!   a different city, lower being better.
//!
//! - **Truncates** the stable, ascending ranking to a size chosen by urgency.
//!
//! # Example
//!
//! ```
//! use bloodmatch::matching::{match_donors, MatchOptions};
//! use bloodmatch::records::{NewBloodRequest, NewDonor};
//! use bloodmatch::Storage;
//!
//! let storage = Storage::open_in_memory().unwrap();
//! let requester = storage
//!     .insert_donor(&NewDonor { name: "Asha".into(), ..NewDonor::default() })
//!     .unwrap();
//! storage
//!     .insert_donor(&NewDonor {
//!         name: "Vikram".into(),
//!         blood_group: Some("O-".into()),
//!         location: Some("Chennai".into()),
//!         ..NewDonor::default()
//!     })
//!     .unwrap();
//! let request_id = storage
//!     .insert_request(&NewBloodRequest {
//!         requester_id: requester,
//!         name: "Asha".into(),
//!         blood_group: "A+".into(),
//!         location: "Chennai".into(),
//!         address: "General Hospital".into(),
//!         phone: "555-0100".into(),
//!         note: None,
//!         urgency_level: "High".into(),
//!     })
//!     .unwrap();
//!
//! let outcome = match_donors(&storage, request_id, MatchOptions::default()).unwrap();
//! assert_eq!(outcome.rule_fired, "High urgency: Top 10 donors");
//! assert_eq!(outcome.matches[0].score, 0);
//! ```

mod compatibility;
mod engine;
mod rules;

pub use compatibility::{can_donate, compatible_donor_groups, donors_for};
pub use engine::{
    match_donors, rank, score, urgency_weight, DonorDirectory, MatchOptions, MatchOutcome,
    LOCATION_PENALTY, UNRECOGNIZED_URGENCY_WEIGHT,
};
pub use rules::{select_rule, MatchRule, DEFAULT_RULE, NO_COMPATIBILITY_RULE, RULES};

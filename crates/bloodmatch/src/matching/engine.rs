//! Donor scoring, ranking and the match orchestration.

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::MatchingConfig;
use crate::error::{Error, Result};
use crate::records::{BloodGroup, BloodRequest, Donor, ScoredDonor, Urgency};

use super::compatibility::compatible_donor_groups;
use super::rules::{select_rule, NO_COMPATIBILITY_RULE};

/// Added when a donor is not in the request's city.
pub const LOCATION_PENALTY: u32 = 5;

/// Weight used for an urgency label that is not Low, Medium or High.
pub const UNRECOGNIZED_URGENCY_WEIGHT: u32 = 10;

/// Read access to stored requests and donor candidates.
///
/// The matcher only ever reads through this trait, so any store that can
/// answer these two queries can back it.
pub trait DonorDirectory {
    /// Look up a blood request by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn request_by_id(&self, id: i64) -> Result<Option<BloodRequest>>;

    /// All users whose blood group is in `groups`, except `exclude_user_id`,
    /// in insertion order.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails.
    fn donors_by_groups_excluding(
        &self,
        groups: &[BloodGroup],
        exclude_user_id: i64,
    ) -> Result<Vec<Donor>>;
}

/// Knobs for a single match run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    /// Reject requests whose urgency label is unrecognized instead of
    /// ranking them as low urgency.
    pub strict_urgency: bool,
}

impl From<&MatchingConfig> for MatchOptions {
    fn from(config: &MatchingConfig) -> Self {
        Self {
            strict_urgency: config.strict_urgency,
        }
    }
}

/// Result of matching one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOutcome {
    /// The request that was matched.
    pub request: BloodRequest,
    /// Name of the truncation rule applied.
    pub rule_fired: String,
    /// Ranked donors, best first.
    pub matches: Vec<ScoredDonor>,
}

/// Base weight for an urgency; more urgent is lower.
#[must_use]
pub fn urgency_weight(urgency: Option<Urgency>) -> u32 {
    match urgency {
        Some(Urgency::High) => 0,
        Some(Urgency::Medium) => 5,
        Some(Urgency::Low) => 10,
        None => UNRECOGNIZED_URGENCY_WEIGHT,
    }
}

/// Score a donor against a request. Lower is better.
#[must_use]
pub fn score(request: &BloodRequest, donor: &Donor) -> u32 {
    let same_city = donor
        .location
        .as_deref()
        .is_some_and(|location| location.to_lowercase() == request.location.to_lowercase());
    let penalty = if same_city { 0 } else { LOCATION_PENALTY };
    urgency_weight(request.urgency()) + penalty
}

/// Score every donor and sort ascending.
///
/// The sort is stable, so donors with equal scores keep their input order.
#[must_use]
pub fn rank(request: &BloodRequest, donors: Vec<Donor>) -> Vec<ScoredDonor> {
    let mut scored: Vec<ScoredDonor> = donors
        .into_iter()
        .map(|donor| ScoredDonor {
            score: score(request, &donor),
            donor,
        })
        .collect();
    scored.sort_by_key(|candidate| candidate.score);
    scored
}

/// Find, rank and truncate the donors for a stored blood request.
///
/// # Errors
///
/// Returns [`Error::RequestNotFound`] if `request_id` is unknown,
/// [`Error::InvalidUrgency`] when `options.strict_urgency` is set and the
/// request's urgency is unrecognized, or any error from the directory.
pub fn match_donors<D>(directory: &D, request_id: i64, options: MatchOptions) -> Result<MatchOutcome>
where
    D: DonorDirectory + ?Sized,
{
    let request = directory
        .request_by_id(request_id)?
        .ok_or(Error::RequestNotFound { id: request_id })?;

    if request.urgency().is_none() {
        if options.strict_urgency {
            return Err(Error::InvalidUrgency {
                value: request.urgency_level.clone(),
            });
        }
        warn!(
            request_id,
            urgency = %request.urgency_level,
            "Unrecognized urgency level, ranking as low urgency"
        );
    }

    let groups = compatible_donor_groups(&request.blood_group);
    if groups.is_empty() {
        debug!(
            request_id,
            blood_group = %request.blood_group,
            "No compatibility rule for blood group"
        );
        return Ok(MatchOutcome {
            request,
            rule_fired: NO_COMPATIBILITY_RULE.to_string(),
            matches: Vec::new(),
        });
    }

    let candidates = directory.donors_by_groups_excluding(groups, request.requester_id)?;
    let pool_size = candidates.len();
    let ranked = rank(&request, candidates);
    let rule = select_rule(&request);
    let matches = rule.apply(ranked);

    debug!(
        request_id,
        pool_size,
        returned = matches.len(),
        rule = rule.name,
        "Matched donors"
    );

    Ok(MatchOutcome {
        request,
        rule_fired: rule.name.to_string(),
        matches,
    })
}
